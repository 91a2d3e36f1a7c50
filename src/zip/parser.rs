//! Central directory parsing.
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. Read the Central Directory in one positioned read
//! 3. Walk its records into a path → entry map
//!
//! A broken trailer or central directory location is fatal. A broken
//! individual record is not: an unreadable name or an out-of-range offset
//! skips that entry, and a bad signature or a record that runs off the end of
//! the directory stops the walk with whatever was indexed so far.

use byteorder::{LittleEndian, ReadBytesExt};
use memchr::memmem;
use std::collections::HashMap;
use std::io::Cursor;
use tracing::debug;

use crate::error::{Error, Result};
use crate::io::ReadAt;

use super::structures::*;

/// Immutable map from entry path to its central directory metadata.
///
/// Built once when an archive is opened and never mutated afterwards, so it
/// can be shared across threads without synchronization.
#[derive(Debug, Clone, Default)]
pub struct ArchiveIndex {
    entries: HashMap<String, ZipEntry>,
    comment: Vec<u8>,
}

/// Why a single central directory record was left out of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    NonUtf8Name,
    Zip64Fields,
    OffsetOutOfBounds,
}

impl ArchiveIndex {
    /// Locate the trailer and index every readable central directory record.
    pub fn build<R: ReadAt + ?Sized>(reader: &R) -> Result<Self> {
        let size = reader.size();
        let (eocd, eocd_offset, comment) = find_eocd(reader)?;

        if eocd.is_zip64() {
            return Err(Error::invalid("ZIP64 archives are not supported"));
        }

        let cd_offset = eocd.cd_offset as u64;
        if cd_offset > eocd_offset {
            return Err(Error::invalid(format!(
                "central directory offset {cd_offset} lies beyond the trailer at {eocd_offset}"
            )));
        }

        // The directory cannot overlap the trailer; anything declared past it
        // is simply not there.
        let available = eocd_offset - cd_offset;
        let cd_len = (eocd.cd_size as u64).min(available);
        if cd_len < eocd.cd_size as u64 {
            debug!(
                declared = eocd.cd_size,
                available = cd_len,
                "central directory truncated"
            );
        }

        let mut block = vec![0u8; cd_len as usize];
        reader.read_exact_at(cd_offset, &mut block)?;

        let entries = parse_central_directory(&block, size)?;
        debug!(
            entries = entries.len(),
            declared = eocd.total_entries,
            cd_offset,
            cd_size = cd_len,
            "indexed archive"
        );

        Ok(Self { entries, comment })
    }

    pub fn get(&self, path: &str) -> Option<&ZipEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in arbitrary order.
    pub fn entries(&self) -> impl Iterator<Item = &ZipEntry> {
        self.entries.values()
    }

    /// All indexed paths in lexicographic order.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Archive comment bytes from the trailer.
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }
}

/// Find and parse the End of Central Directory record.
///
/// Reads the largest window that could contain the trailer plus a maximal
/// comment and scans it backwards; the match closest to the end of the file
/// wins.
///
/// Returns the record, its absolute offset and the comment bytes.
fn find_eocd<R: ReadAt + ?Sized>(reader: &R) -> Result<(EndOfCentralDirectory, u64, Vec<u8>)> {
    let size = reader.size();
    if size < EndOfCentralDirectory::SIZE as u64 {
        return Err(Error::invalid(format!(
            "file is {size} bytes, smaller than an end of central directory record"
        )));
    }

    let search_size = size.min((EndOfCentralDirectory::MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE) as u64);
    let search_start = size - search_size;

    let mut buf = vec![0u8; search_size as usize];
    reader.read_exact_at(search_start, &mut buf)?;

    // Only positions with a whole fixed record after them are candidates.
    let limit = buf.len() - EndOfCentralDirectory::SIZE + EndOfCentralDirectory::SIGNATURE.len();
    let pos = memmem::rfind(&buf[..limit], EndOfCentralDirectory::SIGNATURE)
        .ok_or_else(|| Error::invalid("end of central directory not found"))?;

    let eocd = EndOfCentralDirectory::from_bytes(&buf[pos..])?;

    let comment_start = pos + EndOfCentralDirectory::SIZE;
    let comment_end = (comment_start + eocd.comment_len as usize).min(buf.len());
    let comment = buf[comment_start..comment_end].to_vec();

    Ok((eocd, search_start + pos as u64, comment))
}

/// Walk the central directory block record by record.
fn parse_central_directory(block: &[u8], archive_size: u64) -> Result<HashMap<String, ZipEntry>> {
    let mut entries = HashMap::new();
    let mut pos = 0usize;

    while pos < block.len() {
        let record = &block[pos..];
        if record.len() < CDFH_MIN_SIZE {
            debug!(offset = pos, "central directory ends inside a record header");
            break;
        }
        if &record[0..4] != CDFH_SIGNATURE {
            debug!(offset = pos, "central directory signature mismatch, stopping");
            break;
        }

        let header = parse_cdfh(&record[..CDFH_MIN_SIZE])?;
        let name_end = CDFH_MIN_SIZE + header.name_len;
        let record_len = name_end + header.extra_len + header.comment_len;
        if record_len > record.len() {
            debug!(offset = pos, "central directory record overruns block, stopping");
            break;
        }

        let raw_name = &record[CDFH_MIN_SIZE..name_end];
        pos += record_len;

        match header.into_entry(raw_name, archive_size) {
            Ok(entry) => {
                entries.insert(entry.name.clone(), entry);
            }
            Err(reason) => {
                debug!(
                    name = %String::from_utf8_lossy(raw_name),
                    ?reason,
                    "skipping central directory entry"
                );
            }
        }
    }

    Ok(entries)
}

/// Fixed-size part of a central directory record.
struct CentralRecord {
    compression_method: u16,
    last_mod_time: u16,
    last_mod_date: u16,
    crc32: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    name_len: usize,
    extra_len: usize,
    comment_len: usize,
    local_header_offset: u32,
}

impl CentralRecord {
    fn into_entry(self, raw_name: &[u8], archive_size: u64) -> std::result::Result<ZipEntry, SkipReason> {
        let name = std::str::from_utf8(raw_name)
            .map_err(|_| SkipReason::NonUtf8Name)?
            .to_string();

        if self.compressed_size == 0xFFFFFFFF
            || self.uncompressed_size == 0xFFFFFFFF
            || self.local_header_offset == 0xFFFFFFFF
        {
            return Err(SkipReason::Zip64Fields);
        }

        if self.local_header_offset as u64 + LFH_SIZE as u64 > archive_size {
            return Err(SkipReason::OffsetOutOfBounds);
        }

        Ok(ZipEntry {
            name,
            raw_name: raw_name.to_vec(),
            compression_method: CompressionMethod::from_u16(self.compression_method),
            compressed_size: self.compressed_size,
            uncompressed_size: self.uncompressed_size,
            crc32: self.crc32,
            local_header_offset: self.local_header_offset,
            last_mod_time: self.last_mod_time,
            last_mod_date: self.last_mod_date,
        })
    }
}

/// Parse the 46-byte fixed header; the signature has already been checked.
fn parse_cdfh(data: &[u8]) -> Result<CentralRecord> {
    let mut cursor = Cursor::new(&data[4..]);

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let _flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let compressed_size = cursor.read_u32::<LittleEndian>()?;
    let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
    let name_len = cursor.read_u16::<LittleEndian>()? as usize;
    let extra_len = cursor.read_u16::<LittleEndian>()? as usize;
    let comment_len = cursor.read_u16::<LittleEndian>()? as usize;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let local_header_offset = cursor.read_u32::<LittleEndian>()?;

    Ok(CentralRecord {
        compression_method,
        last_mod_time,
        last_mod_date,
        crc32,
        compressed_size,
        uncompressed_size,
        name_len,
        extra_len,
        comment_len,
        local_header_offset,
    })
}
