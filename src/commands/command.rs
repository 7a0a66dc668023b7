//! FTP Command definitions

use crate::transfer::TransferType;

/// Commands sent over the control connection
#[derive(Debug, Clone, PartialEq)]
pub enum FtpCommand {
    /// USER - Username for authentication
    User(String),

    /// PASS - Password for authentication
    Pass(String),

    /// QUIT - Quit connection
    Quit,

    /// CWD - Change working directory
    Cwd(String),

    /// PWD - Print working directory
    Pwd,

    /// MKD - Make directory
    Mkd(String),

    /// RMD - Remove directory
    Rmd(String),

    /// DELE - Delete file
    Dele(String),

    /// RNFR - Rename from
    Rnfr(String),

    /// RNTO - Rename to
    Rnto(String),

    /// NOOP - No operation
    Noop,

    /// SYST - System type
    Syst,

    /// STAT - Server status, or status of a path
    Stat(Option<String>),

    /// SIZE - File size
    Size(String),

    /// MDTM - File modification time
    Mdtm(String),

    /// TYPE - Transfer type
    Type(TransferType),

    /// PASV - Enter passive mode
    Pasv,

    /// RETR - Retrieve file
    Retr(String),

    /// STOR - Store file
    Stor(String),

    /// APPE - Append to file
    Appe(String),

    /// LIST - Directory listing
    List(Option<String>),

    /// NLST - Name listing
    Nlst(Option<String>),

    /// ABOR - Abort transfer
    Abor,
}

impl FtpCommand {
    /// Command verb as sent on the wire
    pub fn name(&self) -> &'static str {
        match self {
            FtpCommand::User(_) => "USER",
            FtpCommand::Pass(_) => "PASS",
            FtpCommand::Quit => "QUIT",
            FtpCommand::Cwd(_) => "CWD",
            FtpCommand::Pwd => "PWD",
            FtpCommand::Mkd(_) => "MKD",
            FtpCommand::Rmd(_) => "RMD",
            FtpCommand::Dele(_) => "DELE",
            FtpCommand::Rnfr(_) => "RNFR",
            FtpCommand::Rnto(_) => "RNTO",
            FtpCommand::Noop => "NOOP",
            FtpCommand::Syst => "SYST",
            FtpCommand::Stat(_) => "STAT",
            FtpCommand::Size(_) => "SIZE",
            FtpCommand::Mdtm(_) => "MDTM",
            FtpCommand::Type(_) => "TYPE",
            FtpCommand::Pasv => "PASV",
            FtpCommand::Retr(_) => "RETR",
            FtpCommand::Stor(_) => "STOR",
            FtpCommand::Appe(_) => "APPE",
            FtpCommand::List(_) => "LIST",
            FtpCommand::Nlst(_) => "NLST",
            FtpCommand::Abor => "ABOR",
        }
    }

    fn argument(&self) -> Option<&str> {
        match self {
            FtpCommand::User(arg)
            | FtpCommand::Pass(arg)
            | FtpCommand::Cwd(arg)
            | FtpCommand::Mkd(arg)
            | FtpCommand::Rmd(arg)
            | FtpCommand::Dele(arg)
            | FtpCommand::Rnfr(arg)
            | FtpCommand::Rnto(arg)
            | FtpCommand::Size(arg)
            | FtpCommand::Mdtm(arg)
            | FtpCommand::Retr(arg)
            | FtpCommand::Stor(arg)
            | FtpCommand::Appe(arg) => Some(arg),
            FtpCommand::Stat(arg) | FtpCommand::List(arg) | FtpCommand::Nlst(arg) => {
                arg.as_deref()
            }
            FtpCommand::Type(transfer_type) => Some(transfer_type.symbol()),
            FtpCommand::Quit
            | FtpCommand::Pwd
            | FtpCommand::Noop
            | FtpCommand::Syst
            | FtpCommand::Pasv
            | FtpCommand::Abor => None,
        }
    }

    /// Convert command to FTP protocol string, without the line terminator.
    ///
    /// An empty optional argument is left out rather than sent as a trailing space.
    pub fn to_ftp_string(&self) -> String {
        match self.argument() {
            Some(arg) if !arg.is_empty() => format!("{} {arg}", self.name()),
            _ => self.name().to_string(),
        }
    }
}

impl std::fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FtpCommand::Pass(_) => write!(f, "PASS [hidden]"),
            _ => f.write_str(&self.to_ftp_string()),
        }
    }
}
