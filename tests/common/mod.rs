#![allow(dead_code)]

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::{Cursor, Write};
use tempfile::NamedTempFile;

use zipserve::{SeekReader, ZipArchive};

pub type MemoryArchive = ZipArchive<SeekReader<Cursor<Vec<u8>>>>;

/// One member as it should be written, including deliberately wrong fields.
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub name: Vec<u8>,
    pub method: u16,
    pub payload: Vec<u8>,
    pub crc32: u32,
    pub uncompressed_size: u32,
    /// Declared compressed size; defaults to the payload length.
    pub compressed_size: Option<u32>,
    pub local_extra: Vec<u8>,
    pub central_extra: Vec<u8>,
    pub comment: Vec<u8>,
}

/// Writes archives byte by byte so tests control every field.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<RawEntry>,
    comment: Vec<u8>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        self.push(RawEntry {
            name: name.as_bytes().to_vec(),
            method: 0,
            payload: data.to_vec(),
            crc32: crc32fast::hash(data),
            uncompressed_size: data.len() as u32,
            ..RawEntry::default()
        })
    }

    pub fn deflated(self, name: &str, data: &[u8]) -> Self {
        self.push(RawEntry {
            name: name.as_bytes().to_vec(),
            method: 8,
            payload: deflate(data),
            crc32: crc32fast::hash(data),
            uncompressed_size: data.len() as u32,
            ..RawEntry::default()
        })
    }

    pub fn push(mut self, entry: RawEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for entry in &self.entries {
            let offset = out.len() as u32;
            let compressed_size = entry
                .compressed_size
                .unwrap_or(entry.payload.len() as u32);

            out.extend_from_slice(b"PK\x03\x04");
            put_u16(&mut out, 20);
            put_u16(&mut out, 0);
            put_u16(&mut out, entry.method);
            put_u16(&mut out, 0x6000);
            put_u16(&mut out, 0x5821);
            put_u32(&mut out, entry.crc32);
            put_u32(&mut out, compressed_size);
            put_u32(&mut out, entry.uncompressed_size);
            put_u16(&mut out, entry.name.len() as u16);
            put_u16(&mut out, entry.local_extra.len() as u16);
            out.extend_from_slice(&entry.name);
            out.extend_from_slice(&entry.local_extra);
            out.extend_from_slice(&entry.payload);

            central.extend_from_slice(b"PK\x01\x02");
            put_u16(&mut central, 20);
            put_u16(&mut central, 20);
            put_u16(&mut central, 0);
            put_u16(&mut central, entry.method);
            put_u16(&mut central, 0x6000);
            put_u16(&mut central, 0x5821);
            put_u32(&mut central, entry.crc32);
            put_u32(&mut central, compressed_size);
            put_u32(&mut central, entry.uncompressed_size);
            put_u16(&mut central, entry.name.len() as u16);
            put_u16(&mut central, entry.central_extra.len() as u16);
            put_u16(&mut central, entry.comment.len() as u16);
            put_u16(&mut central, 0);
            put_u16(&mut central, 0);
            put_u32(&mut central, 0);
            put_u32(&mut central, offset);
            central.extend_from_slice(&entry.name);
            central.extend_from_slice(&entry.central_extra);
            central.extend_from_slice(&entry.comment);
        }

        let cd_offset = out.len() as u32;
        out.extend_from_slice(&central);

        out.extend_from_slice(b"PK\x05\x06");
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, self.entries.len() as u16);
        put_u16(&mut out, self.entries.len() as u16);
        put_u32(&mut out, central.len() as u32);
        put_u32(&mut out, cd_offset);
        put_u16(&mut out, self.comment.len() as u16);
        out.extend_from_slice(&self.comment);
        out
    }
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Offset of the trailer in a builder-made archive without comment.
pub fn eocd_offset(bytes: &[u8]) -> usize {
    bytes.len() - 22
}

pub fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

pub fn memory_archive(bytes: Vec<u8>) -> MemoryArchive {
    ZipArchive::new(SeekReader::new(Cursor::new(bytes)).unwrap()).unwrap()
}

/// Repetitive text that deflates well.
pub fn sample_text(len: usize, seed: usize) -> Vec<u8> {
    let line = format!("function handler{seed}(event) {{ return event.target.value; }}\n");
    line.bytes().cycle().take(len).collect()
}

/// Bytes with little redundancy.
pub fn sample_binary(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}
