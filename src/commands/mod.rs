//! FTP Commands module
//!
//! This module defines the commands the engine sends on the control connection.

pub mod command;

pub use command::FtpCommand;
