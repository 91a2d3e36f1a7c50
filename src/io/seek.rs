use std::io::{self, Read, Seek, SeekFrom};

use parking_lot::Mutex;

use super::ReadAt;

/// Adapts a cursor-based `Read + Seek` source to [`ReadAt`].
///
/// The lock covers exactly one seek+read pair, so interleaved callers can never
/// observe each other's position. It is released before the caller does
/// anything with the bytes.
pub struct SeekReader<R> {
    inner: Mutex<R>,
    size: u64,
}

impl<R: Read + Seek> SeekReader<R> {
    pub fn new(mut inner: R) -> io::Result<Self> {
        let size = inner.seek(SeekFrom::End(0))?;
        Ok(Self {
            inner: Mutex::new(inner),
            size,
        })
    }
}

impl<R: Read + Seek + Send> ReadAt for SeekReader<R> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut inner = self.inner.lock();
        inner.seek(SeekFrom::Start(offset))?;
        inner.read(buf)
    }

    fn size(&self) -> u64 {
        self.size
    }
}
