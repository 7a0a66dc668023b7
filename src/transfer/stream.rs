//! Byte copying between a data connection and a caller supplied sink or source

use std::io::{ErrorKind, Read, Result, Write};

use log::{debug, info};

use super::TransferProgress;

const COPY_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Copy everything from `reader` into `writer`, returning the byte count
pub(crate) fn copy_with_progress<R, W>(reader: &mut R, writer: &mut W, label: &str) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = [0u8; COPY_BUFFER_SIZE];
    let mut progress = TransferProgress::new();

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..n])?;
        if progress.record(n as u64) {
            debug!("{label}: {progress}");
        }
    }
    writer.flush()?;

    info!("{label} completed: {progress}");
    Ok(progress.bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ChunkedReader, FailingWriter};

    #[test]
    fn test_copies_all_chunks() {
        let mut reader = ChunkedReader::new(vec![b"hello ".to_vec(), b"world".to_vec()]);
        let mut sink = Vec::new();
        let copied = copy_with_progress(&mut reader, &mut sink, "test").unwrap();
        assert_eq!(copied, 11);
        assert_eq!(sink, b"hello world");
    }

    #[test]
    fn test_write_error_stops_copy() {
        let mut reader = ChunkedReader::new(vec![b"data".to_vec()]);
        let err = copy_with_progress(&mut reader, &mut FailingWriter, "test").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_read_error_stops_copy() {
        let mut reader = ChunkedReader::failing_after(vec![b"partial".to_vec()]);
        let mut sink = Vec::new();
        assert!(copy_with_progress(&mut reader, &mut sink, "test").is_err());
        assert_eq!(sink, b"partial");
    }
}
