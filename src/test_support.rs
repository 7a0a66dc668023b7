//! In-memory streams for exercising the engine without sockets

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::net::SocketAddrV4;
use std::rc::Rc;
use std::sync::Mutex;

use crate::connection::{DataConnector, FtpLogger, FtpStream};
use crate::error::FramingError;

/// Serves the given chunks one `read` at a time
pub(crate) struct ChunkedReader {
    chunks: VecDeque<Vec<u8>>,
    fail_at_end: bool,
    reads: usize,
}

impl ChunkedReader {
    pub(crate) fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
            fail_at_end: false,
            reads: 0,
        }
    }

    /// Like `new`, but reports a connection reset once the chunks run out
    pub(crate) fn failing_after(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            fail_at_end: true,
            ..Self::new(chunks)
        }
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        match self.chunks.pop_front() {
            Some(mut chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.chunks.push_front(chunk.split_off(n));
                }
                Ok(n)
            }
            None if self.fail_at_end => Err(io::Error::new(
                ErrorKind::ConnectionReset,
                "connection reset by peer",
            )),
            None => Ok(0),
        }
    }
}

/// A sink that rejects every write
pub(crate) struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// What a `MockStream` saw, readable after the stream was moved away
#[derive(Clone, Default)]
pub(crate) struct StreamLog {
    written: Rc<RefCell<Vec<u8>>>,
    closes: Rc<Cell<usize>>,
}

impl StreamLog {
    pub(crate) fn written_string(&self) -> String {
        String::from_utf8_lossy(&self.written.borrow()).into_owned()
    }

    /// Command lines written so far, without terminators
    pub(crate) fn commands(&self) -> Vec<String> {
        self.written_string()
            .split("\r\n")
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn close_count(&self) -> usize {
        self.closes.get()
    }
}

pub(crate) struct MockStream {
    reader: ChunkedReader,
    log: StreamLog,
    fail_writes: bool,
    fail_close: bool,
}

impl MockStream {
    /// A stream whose reads return `chunks` in order, then end of stream
    pub(crate) fn scripted(chunks: &[&str]) -> Self {
        Self::from_reader(ChunkedReader::new(
            chunks.iter().map(|c| c.as_bytes().to_vec()).collect(),
        ))
    }

    pub(crate) fn from_reader(reader: ChunkedReader) -> Self {
        Self {
            reader,
            log: StreamLog::default(),
            fail_writes: false,
            fail_close: false,
        }
    }

    pub(crate) fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub(crate) fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub(crate) fn log(&self) -> StreamLog {
        self.log.clone()
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(ErrorKind::BrokenPipe, "broken pipe"));
        }
        self.log.written.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FtpStream for MockStream {
    fn close(&mut self) -> io::Result<()> {
        self.log.closes.set(self.log.closes.get() + 1);
        if self.fail_close {
            Err(io::Error::other("close failed"))
        } else {
            Ok(())
        }
    }
}

/// Hands out prepared data streams and remembers where it was asked to dial
#[derive(Default)]
pub(crate) struct MockConnector {
    streams: VecDeque<MockStream>,
    dialed: Rc<RefCell<Vec<SocketAddrV4>>>,
}

impl MockConnector {
    pub(crate) fn new(streams: Vec<MockStream>) -> Self {
        Self {
            streams: streams.into(),
            dialed: Rc::default(),
        }
    }

    pub(crate) fn dialed(&self) -> Rc<RefCell<Vec<SocketAddrV4>>> {
        self.dialed.clone()
    }
}

impl DataConnector for MockConnector {
    type Stream = MockStream;

    fn connect(&mut self, addr: SocketAddrV4) -> io::Result<MockStream> {
        self.dialed.borrow_mut().push(addr);
        self.streams
            .pop_front()
            .ok_or_else(|| io::Error::new(ErrorKind::ConnectionRefused, "connection refused"))
    }
}

/// Records every logger callback as `(text, had_error)`
#[derive(Default)]
pub(crate) struct RecordingLogger {
    sent: Mutex<Vec<(String, bool)>>,
    received: Mutex<Vec<(String, bool)>>,
}

impl RecordingLogger {
    pub(crate) fn sent(&self) -> Vec<(String, bool)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn received(&self) -> Vec<(String, bool)> {
        self.received.lock().unwrap().clone()
    }
}

impl FtpLogger for RecordingLogger {
    fn sent_ftp(&self, msg: &[u8], err: Option<&io::Error>) {
        self.sent
            .lock()
            .unwrap()
            .push((String::from_utf8_lossy(msg).into_owned(), err.is_some()));
    }

    fn received_ftp(&self, response: &[u8], err: Option<&FramingError>) {
        self.received
            .lock()
            .unwrap()
            .push((String::from_utf8_lossy(response).into_owned(), err.is_some()));
    }
}
