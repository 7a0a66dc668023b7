//! FTP client protocol engine
//!
//! A blocking FTP client speaking the control protocol of RFC 959 over any
//! stream, with passive mode data transfers.
//!
//! ```no_run
//! use ftp_engine::Connection;
//!
//! let mut ftp = Connection::connect("ftp.example.com", 21)?;
//! ftp.login("anonymous", "guest")?;
//! let mut contents = Vec::new();
//! ftp.download("/pub/README", &mut contents)?;
//! ftp.quit()?;
//! # Ok::<(), ftp_engine::FtpClientError>(())
//! ```

pub mod client;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod responses;
pub mod transfer;

#[cfg(test)]
mod test_support;

pub use client::{Connection, SessionState, StatusType};
pub use config::ClientConfig;
pub use connection::{
    DataConnection, DataConnector, FtpLogger, FtpStream, LogFtpLogger, SharedLogger, TcpConnector,
};
pub use error::{FramingError, FtpClientError, Result};
pub use responses::{FtpResponse, ResponseCode};
pub use transfer::{TransferProgress, TransferType};
