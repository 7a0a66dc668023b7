use std::io;

use thiserror::Error;

/// Failure while reading a complete reply off the control connection
#[derive(Debug, Error)]
pub enum FramingError {
    #[error("read failed: {0}")]
    ReadFailed(io::Error),
    #[error("connection closed before a complete reply was received")]
    ConnectionClosed,
    #[error("malformed reply: {0}")]
    Malformed(String),
    #[error("reply exceeds {0} bytes")]
    ReplyTooLong(usize),
}

/// Main error type for the FTP engine
#[derive(Debug, Error)]
pub enum FtpClientError {
    // Connection Errors
    #[error("unable to connect to {addr}: {source}")]
    ConnectFailed { addr: String, source: io::Error },
    #[error("server greeting rejected: {0}")]
    GreetingRejected(String),
    #[error("unable to read server greeting: {0}")]
    GreetingFailed(#[source] FramingError),
    #[error("not connected")]
    NotConnected,

    // Control channel Errors
    #[error("unable to recv reply: {0}")]
    Framing(#[from] FramingError),
    #[error("unable to send command: {0}")]
    SendFailed(io::Error),

    // Protocol Errors
    #[error("FTP server responded to {command} with error: {message}")]
    Protocol { command: String, message: String },
    #[error("no passive address in reply: {0}")]
    AddressParse(String),

    // Transfer Errors
    #[error("unable to open data connection to {addr}: {source}")]
    DataConnectFailed { addr: String, source: io::Error },
    #[error("data transfer for {command} failed: {source}")]
    Transfer { command: String, source: io::Error },
    #[error("transfer for {command} ended with: {message}")]
    TransferRejected { command: String, message: String },

    // Configuration Errors
    #[error("invalid configuration: {0}")]
    Config(String),

    // IO Errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl FtpClientError {
    pub(crate) fn protocol(command: &str, response: &[u8]) -> Self {
        Self::Protocol {
            command: command.to_string(),
            message: String::from_utf8_lossy(response).trim_end().to_string(),
        }
    }

    /// Well-formed reply with an unexpected code, including bad PASV replies
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol { .. } | Self::AddressParse(_))
    }

    pub fn is_transfer_error(&self) -> bool {
        matches!(
            self,
            Self::DataConnectFailed { .. } | Self::Transfer { .. } | Self::TransferRejected { .. }
        )
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectFailed { .. }
                | Self::GreetingRejected(_)
                | Self::GreetingFailed(_)
                | Self::NotConnected
        )
    }
}

impl From<config::ConfigError> for FtpClientError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FtpClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_message() {
        let err = FtpClientError::protocol("CWD", b"550 No such directory\r\n");
        assert_eq!(
            err.to_string(),
            "FTP server responded to CWD with error: 550 No such directory"
        );
        assert!(err.is_protocol_error());
        assert!(!err.is_transfer_error());
    }

    #[test]
    fn test_address_parse_is_protocol_error() {
        let err = FtpClientError::AddressParse("227 nothing here".to_string());
        assert!(err.is_protocol_error());
    }

    #[test]
    fn test_classification() {
        assert!(FtpClientError::NotConnected.is_connection_error());
        let err = FtpClientError::Transfer {
            command: "RETR".to_string(),
            source: io::Error::other("boom"),
        };
        assert!(err.is_transfer_error());
        assert!(!err.is_connection_error());
    }
}
