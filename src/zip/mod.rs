//! ZIP archive indexing and extraction.
//!
//! ## Architecture
//!
//! - [`structures`]: on-disk record layouts (EOCD, signatures, entries)
//! - [`parser`]: builds the [`ArchiveIndex`] from the central directory
//! - [`inflate`]: bounded raw-deflate decoding
//! - [`extractor`]: [`ZipArchive`], positioned reads and method dispatch
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The EOCD is read first, then the Central Directory, so opening an archive
//! touches only its tail. Entry data is read on demand.
//!
//! ## Limitations
//!
//! - STORED and DEFLATE only
//! - No ZIP64, encryption or multi-disk archives

mod extractor;
pub mod inflate;
mod parser;
mod structures;

pub use extractor::ZipArchive;
pub use parser::ArchiveIndex;
pub use structures::*;
