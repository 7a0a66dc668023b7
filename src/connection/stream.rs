//! Transport abstraction shared by control and data connections

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};

/// A byte stream that can be closed explicitly.
///
/// Closing must release the transport; calling it more than once is allowed
/// to fail but must not panic.
pub trait FtpStream: Read + Write {
    fn close(&mut self) -> io::Result<()>;
}

impl FtpStream for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            // the peer already tore the connection down
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}
