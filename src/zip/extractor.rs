use byteorder::{ByteOrder, LittleEndian};
use std::path::Path;
use tracing::trace;

use crate::error::{Error, Result};
use crate::io::{LocalFileReader, ReadAt};

use super::inflate::inflate;
use super::parser::ArchiveIndex;
use super::structures::{CompressionMethod, LFH_SIGNATURE, LFH_SIZE, ZipEntry};

/// Random-access extraction over one open archive.
///
/// Holds the reader and the index built from it. Every read is positioned,
/// so a single `ZipArchive` can be shared (e.g. in an `Arc`) by any number of
/// concurrent callers.
pub struct ZipArchive<R: ReadAt> {
    reader: R,
    index: ArchiveIndex,
    default_name: Option<String>,
    verify_checksums: bool,
}

impl ZipArchive<LocalFileReader> {
    /// Open a ZIP file from disk and index it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let reader = LocalFileReader::new(path.as_ref())?;
        Self::new(reader)
    }
}

impl<R: ReadAt> ZipArchive<R> {
    pub fn new(reader: R) -> Result<Self> {
        let index = ArchiveIndex::build(&reader)?;
        Ok(Self {
            reader,
            index,
            default_name: None,
            verify_checksums: true,
        })
    }

    /// Entry served when `extract` is given an empty path.
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = Some(name.into());
        self
    }

    /// Toggle CRC-32 and size checks on extracted data (on by default).
    pub fn with_checksum_verification(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    /// All entry paths in lexicographic order.
    pub fn list(&self) -> Vec<&str> {
        self.index.sorted_names()
    }

    /// Resolve a request path to its entry.
    pub fn entry(&self, path: &str) -> Option<&ZipEntry> {
        let name = self.normalize(path)?;
        self.index.get(name)
    }

    /// Extract the entry at `path`.
    ///
    /// A single leading `/` is stripped and an empty path maps to the default
    /// name. Returns `Ok(None)` when the archive has no such entry.
    pub fn extract(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match self.entry(path) {
            Some(entry) => self.extract_entry(entry).map(Some),
            None => {
                trace!(path, "entry not found");
                Ok(None)
            }
        }
    }

    /// Extract an entry obtained from this archive's index.
    pub fn extract_entry(&self, entry: &ZipEntry) -> Result<Vec<u8>> {
        let data_offset = self.data_offset(entry)?;

        // Checked before allocating: the declared size is untrusted.
        let available = self.reader.size().saturating_sub(data_offset);
        if entry.compressed_size as u64 > available {
            return Err(Error::ShortRead {
                offset: data_offset,
                expected: entry.compressed_size as usize,
                actual: available as usize,
            });
        }

        let mut compressed = vec![0u8; entry.compressed_size as usize];
        self.reader.read_exact_at(data_offset, &mut compressed)?;
        trace!(
            name = %entry.name,
            data_offset,
            compressed = entry.compressed_size,
            method = entry.compression_method.as_u16(),
            "read entry payload"
        );

        let data = match entry.compression_method {
            CompressionMethod::Stored => compressed,
            CompressionMethod::Deflate => inflate(&compressed, entry.uncompressed_size as usize)?,
            CompressionMethod::Unsupported(code) => {
                return Err(Error::UnsupportedCompressionMethod(code));
            }
        };

        if self.verify_checksums {
            verify(entry, &data)?;
        }

        Ok(data)
    }

    /// Get the actual data offset for a file entry.
    ///
    /// The local header's name and extra field lengths can differ from the
    /// central directory's, so the header itself is read to find the payload.
    pub fn data_offset(&self, entry: &ZipEntry) -> Result<u64> {
        let lfh_offset = entry.local_header_offset as u64;

        let mut lfh = [0u8; LFH_SIZE];
        self.reader.read_exact_at(lfh_offset, &mut lfh)?;

        if &lfh[0..4] != LFH_SIGNATURE {
            return Err(Error::invalid(format!(
                "bad local file header signature for {} at offset {lfh_offset}",
                entry.name
            )));
        }

        let file_name_length = LittleEndian::read_u16(&lfh[26..28]) as u64;
        let extra_field_length = LittleEndian::read_u16(&lfh[28..30]) as u64;

        Ok(lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length)
    }

    fn normalize<'a>(&'a self, path: &'a str) -> Option<&'a str> {
        let path = path.strip_prefix('/').unwrap_or(path);
        if path.is_empty() {
            self.default_name.as_deref()
        } else {
            Some(path)
        }
    }
}

fn verify(entry: &ZipEntry, data: &[u8]) -> Result<()> {
    if data.len() != entry.uncompressed_size as usize {
        return Err(Error::Decompression(format!(
            "{}: expected {} bytes, got {}",
            entry.name,
            entry.uncompressed_size,
            data.len()
        )));
    }

    let actual = crc32fast::hash(data);
    if actual != entry.crc32 {
        return Err(Error::ChecksumMismatch {
            path: entry.name.clone(),
            expected: entry.crc32,
            actual,
        });
    }

    Ok(())
}
