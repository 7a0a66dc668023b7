//! Control connection for FTP commands and replies
//!
//! Every exchange with the server goes through [`ControlChannel::execute`] or
//! a `send`/`receive` pair; nothing else touches the socket.

use std::io;
use std::sync::Arc;

use log::debug;

use super::FtpStream;
use super::logger::FtpLogger;
use crate::commands::FtpCommand;
use crate::error::{FtpClientError, Result};
use crate::responses::{FtpResponse, ResponseCode, ResponseFramer};

/// Logger shared between connections
pub type SharedLogger = Arc<dyn FtpLogger + Send + Sync>;

/// Manages the FTP control connection
pub(crate) struct ControlChannel<S: FtpStream> {
    stream: S,
    framer: ResponseFramer,
    logger: Option<SharedLogger>,
}

impl<S: FtpStream> ControlChannel<S> {
    pub(crate) fn new(stream: S, logger: Option<SharedLogger>) -> Self {
        Self {
            stream,
            framer: ResponseFramer::new(),
            logger,
        }
    }

    /// Send an FTP command (adds CRLF automatically)
    pub(crate) fn send(&mut self, command: &FtpCommand) -> Result<()> {
        let line = format!("{}\r\n", command.to_ftp_string());
        debug!("Sending command: {command}");

        let stream = &mut self.stream;
        let result = stream
            .write_all(line.as_bytes())
            .and_then(|_| stream.flush());
        if let Some(logger) = &self.logger {
            logger.sent_ftp(line.as_bytes(), result.as_ref().err());
        }
        result.map_err(FtpClientError::SendFailed)
    }

    /// Read the next complete reply
    pub(crate) fn receive(&mut self) -> Result<FtpResponse> {
        let result = self.framer.read_response(&mut self.stream);
        if let Some(logger) = &self.logger {
            match &result {
                Ok(response) => logger.received_ftp(response.raw(), None),
                Err(e) => logger.received_ftp(self.framer.pending(), Some(e)),
            }
        }

        let response = result?;
        debug!("Received response: {response}");
        Ok(response)
    }

    pub(crate) fn send_and_receive(&mut self, command: &FtpCommand) -> Result<FtpResponse> {
        self.send(command)?;
        self.receive()
    }

    /// Send `command` and require the reply to carry `expected`
    pub(crate) fn execute(
        &mut self,
        expected: ResponseCode,
        command: &FtpCommand,
    ) -> Result<FtpResponse> {
        let response = self.send_and_receive(command)?;
        if response.code() == expected {
            Ok(response)
        } else {
            Err(FtpClientError::protocol(command.name(), response.raw()))
        }
    }

    pub(crate) fn close(&mut self) -> io::Result<()> {
        self.stream.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FramingError;
    use crate::test_support::{MockStream, RecordingLogger};

    #[test]
    fn test_send_joins_words_and_appends_crlf() {
        let stream = MockStream::scripted(&[]);
        let log = stream.log();
        let mut channel = ControlChannel::new(stream, None);
        channel.send(&FtpCommand::User("alice".into())).unwrap();
        assert_eq!(log.written_string(), "USER alice\r\n");
    }

    #[test]
    fn test_execute_expected_code() {
        let stream = MockStream::scripted(&["250 Directory changed\r\n"]);
        let mut channel = ControlChannel::new(stream, None);
        let reply = channel
            .execute(ResponseCode::FILE_ACTION_COMPLETED, &FtpCommand::Cwd("/pub".into()))
            .unwrap();
        assert_eq!(reply.message(), "Directory changed");
    }

    #[test]
    fn test_execute_unexpected_code() {
        let stream = MockStream::scripted(&["550 No such directory\r\n"]);
        let mut channel = ControlChannel::new(stream, None);
        let err = channel
            .execute(ResponseCode::FILE_ACTION_COMPLETED, &FtpCommand::Cwd("/nope".into()))
            .unwrap_err();
        match err {
            FtpClientError::Protocol { command, message } => {
                assert_eq!(command, "CWD");
                assert_eq!(message, "550 No such directory");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_send_failure_is_reported() {
        let stream = MockStream::scripted(&[]).with_failing_writes();
        let logger = Arc::new(RecordingLogger::default());
        let mut channel = ControlChannel::new(stream, Some(logger.clone()));
        let err = channel.send(&FtpCommand::Noop).unwrap_err();
        assert!(matches!(err, FtpClientError::SendFailed(_)));
        assert_eq!(logger.sent(), vec![("NOOP\r\n".to_string(), true)]);
    }

    #[test]
    fn test_logger_sees_exact_bytes() {
        let stream = MockStream::scripted(&["230 Logged in\r\n"]);
        let logger = Arc::new(RecordingLogger::default());
        let mut channel = ControlChannel::new(stream, Some(logger.clone()));
        channel
            .execute(ResponseCode::USER_LOGGED_IN, &FtpCommand::Pass("secret".into()))
            .unwrap();
        assert_eq!(logger.sent(), vec![("PASS secret\r\n".to_string(), false)]);
        assert_eq!(logger.received(), vec![("230 Logged in\r\n".to_string(), false)]);
    }

    #[test]
    fn test_logger_sees_framing_error() {
        let stream = MockStream::scripted(&["22"]);
        let logger = Arc::new(RecordingLogger::default());
        let mut channel = ControlChannel::new(stream, Some(logger.clone()));
        let err = channel.receive().unwrap_err();
        assert!(matches!(
            err,
            FtpClientError::Framing(FramingError::ConnectionClosed)
        ));
        assert_eq!(logger.received(), vec![("22".to_string(), true)]);
    }
}
