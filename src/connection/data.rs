//! Data connection management for passive mode transfers

use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, SocketAddrV4, TcpStream};
use std::time::Duration;

use log::{debug, info, warn};

use super::FtpStream;

/// Opens data connections to the address advertised by the server
pub trait DataConnector {
    type Stream: FtpStream;

    fn connect(&mut self, addr: SocketAddrV4) -> io::Result<Self::Stream>;
}

/// Dials data connections over TCP
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new(
        connect_timeout: Option<Duration>,
        read_timeout: Option<Duration>,
        write_timeout: Option<Duration>,
    ) -> Self {
        Self {
            connect_timeout,
            read_timeout,
            write_timeout,
        }
    }

    /// Use the same deadlines as an already configured control socket
    pub fn inherit_from(control: &TcpStream) -> io::Result<Self> {
        Ok(Self {
            connect_timeout: None,
            read_timeout: control.read_timeout()?,
            write_timeout: control.write_timeout()?,
        })
    }
}

impl DataConnector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&mut self, addr: SocketAddrV4) -> io::Result<TcpStream> {
        let target = SocketAddr::V4(addr);
        let stream = match self.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&target, timeout)?,
            None => TcpStream::connect(target)?,
        };
        stream.set_read_timeout(self.read_timeout)?;
        stream.set_write_timeout(self.write_timeout)?;
        Ok(stream)
    }
}

/// A data connection scoped to exactly one transfer.
///
/// The stream is closed by [`DataConnection::close`] or, failing that, when the
/// value is dropped; it is never closed twice.
pub struct DataConnection<D: FtpStream> {
    stream: Option<D>,
    peer: SocketAddrV4,
}

impl<D: FtpStream> DataConnection<D> {
    pub(crate) fn new(stream: D, peer: SocketAddrV4) -> Self {
        info!("Opened data connection to {peer}");
        Self {
            stream: Some(stream),
            peer,
        }
    }

    pub fn peer(&self) -> SocketAddrV4 {
        self.peer
    }

    fn stream_mut(&mut self) -> io::Result<&mut D> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(ErrorKind::NotConnected, "data connection closed"))
    }

    /// Close the data connection, reporting the close error
    pub fn close(mut self) -> io::Result<()> {
        match self.stream.take() {
            Some(mut stream) => {
                debug!("Closing data connection to {}", self.peer);
                stream.close()
            }
            None => Ok(()),
        }
    }
}

impl<D: FtpStream> Read for DataConnection<D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream_mut()?.read(buf)
    }
}

impl<D: FtpStream> Write for DataConnection<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream_mut()?.flush()
    }
}

impl<D: FtpStream> Drop for DataConnection<D> {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            debug!("Releasing data connection to {}", self.peer);
            if let Err(e) = stream.close() {
                warn!("Failed to close data connection to {}: {e}", self.peer);
            }
        }
    }
}
