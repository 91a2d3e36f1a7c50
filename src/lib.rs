//! # zipserve
//!
//! Random-access ZIP reading for serving archive members on demand.
//!
//! Opening an archive reads only its tail: the end of central directory
//! record and the central directory, which become an immutable path → entry
//! index. Each extraction then reads one local header and one payload with
//! positioned reads and inflates it, so many requests can be served
//! concurrently from one open file.
//!
//! ## Features
//!
//! - STORED and DEFLATE entries, with CRC-32 verification
//! - Best-effort indexing: a damaged record skips or truncates, never aborts
//! - Lock-free concurrent extraction over a single file handle
//! - A [`Responder`] that turns resource requests into responses with
//!   content type and cross-origin headers
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use zipserve::ZipArchive;
//!
//! let archive = Arc::new(ZipArchive::open("site.zip")?.with_default_name("index.html"));
//!
//! for name in archive.list() {
//!     println!("{name}");
//! }
//!
//! match archive.extract("/app.js")? {
//!     Some(bytes) => println!("{} bytes", bytes.len()),
//!     None => println!("not found"),
//! }
//! # Ok::<(), zipserve::Error>(())
//! ```

pub mod cli;
pub mod config;
mod error;
pub mod io;
pub mod logging;
pub mod serve;
pub mod zip;

pub use cli::Cli;
pub use config::ServeConfig;
pub use error::{Error, Result};
pub use io::{LocalFileReader, ReadAt, SeekReader};
pub use serve::{MimeResolver, Responder, Response};
pub use zip::{ArchiveIndex, CompressionMethod, ZipArchive, ZipEntry};
