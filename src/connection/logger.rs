//! Raw control connection logging

use std::borrow::Cow;
use std::io;

use log::{Level, log};

use crate::error::FramingError;

pub const FTP_RAW_LOG_LEVEL: Level = Level::Debug;
pub const FTP_RAW_LOG_TARGET: &str = "ftp_engine::raw";

/// Observer of the exact bytes exchanged on the control connection
pub trait FtpLogger {
    /// Called after a command was written, with the write error if there was one.
    fn sent_ftp(&self, msg: &[u8], err: Option<&io::Error>);
    /// Called after a reply was read, with the framing error if there was one.
    fn received_ftp(&self, response: &[u8], err: Option<&FramingError>);
}

/// Forwards raw control traffic to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFtpLogger;

impl FtpLogger for LogFtpLogger {
    fn sent_ftp(&self, msg: &[u8], err: Option<&io::Error>) {
        let text = if msg.starts_with(b"PASS ") {
            Cow::Borrowed("PASS [hidden]")
        } else {
            String::from_utf8_lossy(msg)
        };
        match err {
            None => log!(target: FTP_RAW_LOG_TARGET, FTP_RAW_LOG_LEVEL, "> {}", text.trim_end()),
            Some(e) => log!(target: FTP_RAW_LOG_TARGET, Level::Warn, "> {} ({e})", text.trim_end()),
        }
    }

    fn received_ftp(&self, response: &[u8], err: Option<&FramingError>) {
        let text = String::from_utf8_lossy(response);
        match err {
            None => log!(target: FTP_RAW_LOG_TARGET, FTP_RAW_LOG_LEVEL, "< {}", text.trim_end()),
            Some(e) => log!(target: FTP_RAW_LOG_TARGET, Level::Warn, "< {} ({e})", text.trim_end()),
        }
    }
}
