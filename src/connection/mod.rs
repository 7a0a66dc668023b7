//! Connection management for the FTP engine
//!
//! Handles both control and data connections for FTP operations.

pub(crate) mod command;
pub mod data;
pub mod logger;
pub mod stream;

// Re-export main types
pub use command::SharedLogger;
pub use data::{DataConnection, DataConnector, TcpConnector};
pub use logger::{FtpLogger, LogFtpLogger};
pub use stream::FtpStream;
