//! FTP reply framing and parsing module

pub mod framer;
pub mod parser;
pub mod status_codes;

// Re-export main types
pub use framer::{ResponseFramer, complete_response_len};
pub use parser::{FtpResponse, parse_name_list};
pub use status_codes::{ReplyClass, ResponseCode};
