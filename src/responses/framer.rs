//! Reply framing for the control connection

use std::io::{ErrorKind, Read};

use log::trace;

use super::{FtpResponse, ResponseCode};
use crate::error::FramingError;

const READ_CHUNK_SIZE: usize = 1024;
const CRLF: &[u8] = b"\r\n";

/// Largest reply the framer buffers before giving up
pub const DEFAULT_MAX_REPLY_LEN: usize = 16 * 1024 * 1024;

/// Determine whether `buf` starts with a complete reply.
///
/// Returns the length of that reply, `None` if more bytes are needed, or an
/// error if the first line cannot be a reply at all.
pub fn complete_response_len(buf: &[u8]) -> Result<Option<usize>, FramingError> {
    scan_response(buf, &mut ScanState::default())
}

/// How far into the pending bytes the current reply has been checked
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ScanState {
    /// Start of the first line not yet known to be complete; 0 until the
    /// first line has been validated
    line_start: usize,
    /// Offset up to which the current line holds no CR LF
    searched: usize,
}

impl ScanState {
    /// End of the current line, remembering how far the search got
    fn next_line_end(&mut self, buf: &[u8]) -> Option<usize> {
        let from = self.searched.max(self.line_start);
        let end = find_crlf(buf, from);
        if end.is_none() {
            // a trailing CR may still be followed by its LF
            self.searched = buf.len().saturating_sub(1).max(self.line_start);
        }
        end
    }

    fn advance_past(&mut self, line_end: usize) {
        self.line_start = line_end + CRLF.len();
        self.searched = self.line_start;
    }
}

fn scan_response(buf: &[u8], scan: &mut ScanState) -> Result<Option<usize>, FramingError> {
    if scan.line_start == 0 {
        let Some(first_end) = scan.next_line_end(buf) else {
            return Ok(None);
        };

        let first_line = &buf[..first_end];
        if first_line.len() < 4 {
            return Err(FramingError::Malformed(format!(
                "reply too short: {:?}",
                String::from_utf8_lossy(first_line)
            )));
        }
        if ResponseCode::from_bytes(first_line).is_none() {
            return Err(FramingError::Malformed(format!(
                "invalid reply code: {:?}",
                String::from_utf8_lossy(&first_line[..3])
            )));
        }

        match first_line[3] {
            b' ' => return Ok(Some(first_end + CRLF.len())),
            b'-' => scan.advance_past(first_end),
            other => {
                return Err(FramingError::Malformed(format!(
                    "unexpected separator {:?} after reply code",
                    char::from(other)
                )));
            }
        }
    }

    let end_prefix = [buf[0], buf[1], buf[2], b' '];
    while let Some(end) = scan.next_line_end(buf) {
        if buf[scan.line_start..end].starts_with(&end_prefix) {
            return Ok(Some(end + CRLF.len()));
        }
        scan.advance_past(end);
    }
    Ok(None)
}

fn find_crlf(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?
        .windows(CRLF.len())
        .position(|w| w == CRLF)
        .map(|pos| pos + from)
}

/// Accumulates control connection bytes into complete replies.
///
/// Bytes that arrive after the end of a reply are kept for the next call.
/// Each byte is scanned once per reply, however the reply is split across
/// reads.
#[derive(Debug)]
pub struct ResponseFramer {
    pending: Vec<u8>,
    scan: ScanState,
    max_reply_len: usize,
}

impl Default for ResponseFramer {
    fn default() -> Self {
        Self::with_max_reply_len(DEFAULT_MAX_REPLY_LEN)
    }
}

impl ResponseFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A framer that fails once an incomplete reply exceeds `max_reply_len` bytes
    pub fn with_max_reply_len(max_reply_len: usize) -> Self {
        Self {
            pending: Vec::new(),
            scan: ScanState::default(),
            max_reply_len,
        }
    }

    /// Bytes received but not yet returned as part of a reply
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    pub fn read_response<R: Read + ?Sized>(
        &mut self,
        reader: &mut R,
    ) -> Result<FtpResponse, FramingError> {
        let mut buffer = [0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(len) = scan_response(&self.pending, &mut self.scan)? {
                self.scan = ScanState::default();
                let raw: Vec<u8> = self.pending.drain(..len).collect();
                let code = ResponseCode::from_bytes(&raw).ok_or_else(|| {
                    FramingError::Malformed("reply code vanished".to_string())
                })?;
                return Ok(FtpResponse::new(code, raw));
            }

            if self.pending.len() > self.max_reply_len {
                return Err(FramingError::ReplyTooLong(self.max_reply_len));
            }

            match reader.read(&mut buffer) {
                Ok(0) => return Err(FramingError::ConnectionClosed),
                Ok(n) => {
                    trace!("Read {n} bytes from control connection");
                    self.pending.extend_from_slice(&buffer[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FramingError::ReadFailed(e)),
            }
        }
    }
}
