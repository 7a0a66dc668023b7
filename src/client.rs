use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use crate::commands::FtpCommand;
use crate::config::ClientConfig;
use crate::connection::command::ControlChannel;
use crate::connection::{DataConnection, DataConnector, FtpStream, SharedLogger, TcpConnector};
use crate::error::{FtpClientError, Result};
use crate::responses::{FtpResponse, ResponseCode, parse_name_list};
use crate::transfer::TransferType;
use crate::transfer::stream::copy_with_progress;

/// Session state of a control connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Authenticated,
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Connected => write!(f, "connected"),
            SessionState::Authenticated => write!(f, "authenticated"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// Classification of a `STAT` reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    GeneralStatus,
    FileStatus,
    DirectoryStatus,
}

impl StatusType {
    fn of_code(code: ResponseCode) -> Option<Self> {
        match code {
            ResponseCode::SYSTEM_STATUS => Some(StatusType::GeneralStatus),
            ResponseCode::DIRECTORY_STATUS => Some(StatusType::DirectoryStatus),
            ResponseCode::FILE_STATUS => Some(StatusType::FileStatus),
            _ => None,
        }
    }
}

impl std::fmt::Display for StatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusType::GeneralStatus => write!(f, "status"),
            StatusType::FileStatus => write!(f, "file status"),
            StatusType::DirectoryStatus => write!(f, "directory status"),
        }
    }
}

enum Direction<'a> {
    Download(&'a mut dyn Write),
    Upload(&'a mut dyn Read),
}

/// An FTP session over one control connection.
///
/// Each method runs its command/reply exchanges to completion before
/// returning, so a second command can never be issued while a reply is
/// outstanding. Data connections are opened in passive mode, one per
/// transfer.
pub struct Connection<S: FtpStream = TcpStream, C: DataConnector = TcpConnector> {
    control: ControlChannel<S>,
    connector: C,
    transfer_type: TransferType,
    state: SessionState,
}

impl Connection<TcpStream, TcpConnector> {
    /// Connect to `host:port`; the standard FTP port is 21
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        Self::connect_logging(host, port, None)
    }

    /// Connect to `host:port`, passing all control traffic to `logger`
    pub fn connect_logging(host: &str, port: u16, logger: Option<SharedLogger>) -> Result<Self> {
        let addr = format!("{host}:{port}");
        info!("Connecting to FTP server at {addr}");
        let stream = dial(&addr, None).map_err(|source| FtpClientError::ConnectFailed {
            addr: addr.clone(),
            source,
        })?;
        Self::connect_logging_on(stream, logger)
    }

    /// Connect using the server address and socket deadlines from `config`
    pub fn connect_with_config(config: &ClientConfig, logger: Option<SharedLogger>) -> Result<Self> {
        config.validate()?;
        let addr = format!("{}:{}", config.host(), config.port());
        info!("Connecting to FTP server at {addr}");

        let connect_failed = |source| FtpClientError::ConnectFailed {
            addr: addr.clone(),
            source,
        };
        let stream = dial(&addr, config.connect_timeout()).map_err(connect_failed)?;
        stream
            .set_read_timeout(config.io_timeout())
            .and_then(|_| stream.set_write_timeout(config.io_timeout()))
            .map_err(connect_failed)?;

        let connector =
            TcpConnector::new(config.connect_timeout(), config.io_timeout(), config.io_timeout());
        Self::connect_on_with(stream, connector, logger)
    }

    /// Use an already connected socket as the control connection.
    ///
    /// Timeouts set on `stream` are applied to data connections as well.
    pub fn connect_on(stream: TcpStream) -> Result<Self> {
        Self::connect_logging_on(stream, None)
    }

    /// Adopt `stream` as the control connection, passing all control traffic to `logger`
    pub fn connect_logging_on(stream: TcpStream, logger: Option<SharedLogger>) -> Result<Self> {
        let connector = TcpConnector::inherit_from(&stream)?;
        Self::connect_on_with(stream, connector, logger)
    }
}

fn dial(addr: &str, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let Some(timeout) = timeout else {
        return TcpStream::connect(addr);
    };

    let mut last_error = None;
    for target in addr.to_socket_addrs()? {
        match TcpStream::connect_timeout(&target, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!("Connect to {target} failed: {e}");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
    }))
}

impl<S: FtpStream, C: DataConnector> Connection<S, C> {
    /// Wrap an open control stream and wait for the server greeting
    pub fn connect_on_with(stream: S, connector: C, logger: Option<SharedLogger>) -> Result<Self> {
        let mut connection = Self {
            control: ControlChannel::new(stream, logger),
            connector,
            transfer_type: TransferType::default(),
            state: SessionState::Connected,
        };

        loop {
            let greeting = connection.control.receive().map_err(|e| match e {
                FtpClientError::Framing(source) => FtpClientError::GreetingFailed(source),
                other => other,
            })?;
            match greeting.code() {
                ResponseCode::SERVICE_READY_IN_MINUTES => {
                    debug!("Server not ready yet: {}", greeting.message());
                }
                ResponseCode::SERVICE_READY_FOR_NEW_USER => {
                    info!("Server greeting: {}", greeting.message());
                    return Ok(connection);
                }
                _ => {
                    error!("Server rejected the connection: {greeting}");
                    return Err(FtpClientError::GreetingRejected(greeting.to_string()));
                }
            }
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Transfer type last acknowledged by the server
    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == SessionState::Closed {
            Err(FtpClientError::NotConnected)
        } else {
            Ok(())
        }
    }

    fn execute(&mut self, expected: ResponseCode, command: FtpCommand) -> Result<FtpResponse> {
        self.ensure_open()?;
        self.control.execute(expected, &command)
    }

    fn send_and_receive(&mut self, command: FtpCommand) -> Result<FtpResponse> {
        self.ensure_open()?;
        self.control.send_and_receive(&command)
    }

    /// Close the underlying control connection.
    ///
    /// This does not send `QUIT`; call [`Connection::quit`] first. Calling it
    /// again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;
        info!("Closing control connection");
        self.control.close()?;
        Ok(())
    }

    /// Log in with `USER`, sending `PASS` only when the server asks for it
    pub fn login(&mut self, user: &str, password: &str) -> Result<()> {
        let response = self.send_and_receive(FtpCommand::User(user.to_string()))?;
        match response.code() {
            ResponseCode::USER_LOGGED_IN => {}
            ResponseCode::USER_NAME_OK_NEED_PASSWORD => {
                self.execute(
                    ResponseCode::USER_LOGGED_IN,
                    FtpCommand::Pass(password.to_string()),
                )?;
            }
            _ => return Err(FtpClientError::protocol("USER", response.raw())),
        }

        info!("Logged in as {user}");
        self.state = SessionState::Authenticated;
        Ok(())
    }

    /// Send `QUIT` and expect the server to close the session
    pub fn quit(&mut self) -> Result<()> {
        self.execute(ResponseCode::SERVICE_CLOSING_CONTROL_CONNECTION, FtpCommand::Quit)?;
        Ok(())
    }

    /// Change the working directory
    pub fn change_working_dir_to(&mut self, path: &str) -> Result<()> {
        self.execute(ResponseCode::FILE_ACTION_COMPLETED, FtpCommand::Cwd(path.to_string()))?;
        Ok(())
    }

    /// Create a directory, returning the pathname reported by the server
    pub fn make_directory(&mut self, path: &str) -> Result<String> {
        self.execute(ResponseCode::PATHNAME_CREATED, FtpCommand::Mkd(path.to_string()))?
            .quoted_path()
    }

    /// Remove an empty directory
    pub fn remove_directory(&mut self, path: &str) -> Result<()> {
        self.execute(ResponseCode::FILE_ACTION_COMPLETED, FtpCommand::Rmd(path.to_string()))?;
        Ok(())
    }

    /// Delete a file
    pub fn delete(&mut self, path: &str) -> Result<()> {
        self.execute(ResponseCode::FILE_ACTION_COMPLETED, FtpCommand::Dele(path.to_string()))?;
        Ok(())
    }

    /// Rename `from` to `to` with `RNFR`/`RNTO`
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.execute(ResponseCode::FILE_ACTION_PENDING, FtpCommand::Rnfr(from.to_string()))?;
        self.execute(ResponseCode::FILE_ACTION_COMPLETED, FtpCommand::Rnto(to.to_string()))?;
        Ok(())
    }

    /// The working directory reported by `PWD`
    pub fn print_working_directory(&mut self) -> Result<String> {
        self.execute(ResponseCode::PATHNAME_CREATED, FtpCommand::Pwd)?
            .quoted_path()
    }

    /// Send `NOOP`, e.g. to keep the control connection alive
    pub fn no_operation(&mut self) -> Result<()> {
        self.execute(ResponseCode::COMMAND_OK, FtpCommand::Noop)?;
        Ok(())
    }

    /// The system type reported by `SYST`
    pub fn system(&mut self) -> Result<String> {
        Ok(self
            .execute(ResponseCode::SYSTEM_NAME, FtpCommand::Syst)?
            .message())
    }

    /// General server status
    pub fn status(&mut self) -> Result<(StatusType, String)> {
        self.stat(None)
    }

    /// Status of a file or directory
    pub fn status_of(&mut self, path: &str) -> Result<(StatusType, String)> {
        self.stat(Some(path.to_string()))
    }

    fn stat(&mut self, path: Option<String>) -> Result<(StatusType, String)> {
        let response = self.send_and_receive(FtpCommand::Stat(path))?;
        match StatusType::of_code(response.code()) {
            Some(status_type) => Ok((status_type, response.message())),
            None => Err(FtpClientError::protocol("STAT", response.raw())),
        }
    }

    /// Size in bytes of `path`
    pub fn size(&mut self, path: &str) -> Result<u64> {
        self.execute(ResponseCode::FILE_STATUS, FtpCommand::Size(path.to_string()))?
            .file_size()
    }

    /// Last modification time of `path`
    pub fn modification_time(&mut self, path: &str) -> Result<DateTime<Utc>> {
        self.execute(ResponseCode::FILE_STATUS, FtpCommand::Mdtm(path.to_string()))?
            .modification_time()
    }

    /// Abort the transfer in progress, if any.
    ///
    /// A server may answer with `426` for the aborted transfer followed by
    /// `226` for the abort itself.
    pub fn abort(&mut self) -> Result<()> {
        let response = self.send_and_receive(FtpCommand::Abor)?;
        match response.code() {
            ResponseCode::NO_TRANSFER_IN_PROGRESS | ResponseCode::CLOSING_DATA_CONNECTION => Ok(()),
            ResponseCode::CONNECTION_CLOSED_TRANSFER_ABORTED => {
                let response = self.control.receive()?;
                if response.code() == ResponseCode::CLOSING_DATA_CONNECTION {
                    Ok(())
                } else {
                    Err(FtpClientError::protocol("ABOR", response.raw()))
                }
            }
            _ => Err(FtpClientError::protocol("ABOR", response.raw())),
        }
    }

    /// Switch the transfer type, skipping the `TYPE` command if it is already set
    pub fn set_transfer_type(&mut self, transfer_type: TransferType) -> Result<()> {
        if self.transfer_type == transfer_type {
            return Ok(());
        }
        self.execute(ResponseCode::COMMAND_OK, FtpCommand::Type(transfer_type))?;
        debug!("Transfer type set to {transfer_type}");
        self.transfer_type = transfer_type;
        Ok(())
    }

    fn enter_passive_mode(&mut self) -> Result<DataConnection<C::Stream>> {
        let response = self.execute(ResponseCode::ENTERING_PASSIVE_MODE, FtpCommand::Pasv)?;
        let addr = response.passive_address()?;
        let stream = self
            .connector
            .connect(addr)
            .map_err(|source| FtpClientError::DataConnectFailed {
                addr: addr.to_string(),
                source,
            })?;
        Ok(DataConnection::new(stream, addr))
    }

    /// Retrieve `path` into `dest` in binary mode, returning the byte count
    pub fn download<W: Write>(&mut self, path: &str, dest: &mut W) -> Result<u64> {
        self.transfer(
            FtpCommand::Retr(path.to_string()),
            TransferType::Binary,
            Direction::Download(dest),
        )
    }

    /// Store everything read from `source` as `path` in binary mode
    pub fn upload<R: Read>(&mut self, source: &mut R, path: &str) -> Result<u64> {
        self.transfer(
            FtpCommand::Stor(path.to_string()),
            TransferType::Binary,
            Direction::Upload(source),
        )
    }

    /// Append everything read from `source` to `path` in binary mode
    pub fn append<R: Read>(&mut self, source: &mut R, path: &str) -> Result<u64> {
        self.transfer(
            FtpCommand::Appe(path.to_string()),
            TransferType::Binary,
            Direction::Upload(source),
        )
    }

    /// Raw `LIST` output for `path`, or the working directory
    pub fn list(&mut self, path: Option<&str>) -> Result<String> {
        self.read_listing(FtpCommand::List(path.map(str::to_string)))
    }

    /// Names returned by `NLST` for `path`, or the working directory
    pub fn name_list(&mut self, path: Option<&str>) -> Result<Vec<String>> {
        let data = self.read_listing(FtpCommand::Nlst(path.map(str::to_string)))?;
        Ok(parse_name_list(&data))
    }

    fn read_listing(&mut self, command: FtpCommand) -> Result<String> {
        let mut data = Vec::new();
        self.transfer(command, TransferType::Ascii, Direction::Download(&mut data))?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Run one command over a fresh data connection
    fn transfer(
        &mut self,
        command: FtpCommand,
        transfer_type: TransferType,
        direction: Direction<'_>,
    ) -> Result<u64> {
        self.ensure_open()?;
        self.set_transfer_type(transfer_type)?;

        let mut data = self.enter_passive_mode()?;
        let name = command.name();

        let response = self.control.send_and_receive(&command)?;
        if !response.code().is_preliminary() {
            return Err(FtpClientError::protocol(name, response.raw()));
        }

        let label = command.to_string();
        let copied = match direction {
            Direction::Download(sink) => copy_with_progress(&mut data, sink, &label),
            Direction::Upload(source) => copy_with_progress(source, &mut data, &label),
        };
        let closed = data.close();

        let outcome = match (copied, closed) {
            (Ok(bytes), Ok(())) => Ok(bytes),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), closed) => {
                if let Err(close_error) = closed {
                    warn!("Failed to close data connection after {name} failed: {close_error}");
                }
                Err(e)
            }
        };
        let bytes = match outcome {
            Ok(bytes) => bytes,
            Err(source) => {
                error!("Data transfer for {name} failed: {source}");
                self.discard_transfer_reply(name);
                return Err(FtpClientError::Transfer {
                    command: name.to_string(),
                    source,
                });
            }
        };

        let response = self.control.receive()?;
        if !response.code().is_completion() {
            error!("{name} ended with {response}");
            return Err(FtpClientError::TransferRejected {
                command: name.to_string(),
                message: response.to_string(),
            });
        }
        Ok(bytes)
    }

    /// Read the reply ending a failed transfer so the next command lines up with its own reply
    fn discard_transfer_reply(&mut self, name: &str) {
        match self.control.receive() {
            Ok(response) => debug!("Discarded final {name} reply: {response}"),
            Err(e) => warn!("No final {name} reply after failed transfer: {e}"),
        }
    }
}

impl<S: FtpStream, C: DataConnector> Drop for Connection<S, C> {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            let _ = self.close();
        }
    }
}
