use std::fs::File;
use std::io;
use std::path::Path;

use super::ReadAt;

/// Local file reader with random access support.
///
/// On Unix and Windows each read carries its own offset, so one handle can be
/// shared by any number of threads without locking. Elsewhere the seek+read
/// pair is serialized by a mutex.
pub struct LocalFileReader {
    file: File,
    size: u64,
    #[cfg(not(any(unix, windows)))]
    cursor: parking_lot::Mutex<()>,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            file,
            size,
            #[cfg(not(any(unix, windows)))]
            cursor: parking_lot::Mutex::new(()),
        })
    }
}

impl ReadAt for LocalFileReader {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_at(buf, offset)
        }

        #[cfg(windows)]
        {
            // seek_read moves the handle's cursor as a side effect, but nothing
            // here depends on it: every call passes its own offset.
            use std::os::windows::fs::FileExt;
            self.file.seek_read(buf, offset)
        }

        #[cfg(not(any(unix, windows)))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let _guard = self.cursor.lock();
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            file.read(buf)
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_local_reader_positioned_reads() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"0123456789abcdef").unwrap();
        tmp.flush().unwrap();

        let reader = LocalFileReader::new(tmp.path()).unwrap();
        assert_eq!(reader.size(), 16);

        let mut buf = [0u8; 4];
        reader.read_exact_at(10, &mut buf).unwrap();
        assert_eq!(&buf, b"abcd");
        reader.read_exact_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"0123");
    }
}
