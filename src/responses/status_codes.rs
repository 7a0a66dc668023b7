//! FTP reply code definitions

use std::fmt;

/// Three-digit FTP reply code, compared by exact value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResponseCode([u8; 3]);

/// Reply class, given by the first digit of the code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    PreliminaryPositive,
    PositiveCompletion,
    PositiveIntermediate,
    TransientNegative,
    PermanentNegative,
    Unknown,
}

impl ResponseCode {
    // Transfer codes (1xx)
    pub const SERVICE_READY_IN_MINUTES: Self = Self(*b"120");
    pub const DATA_CONNECTION_ALREADY_OPEN: Self = Self(*b"125");
    pub const ABOUT_TO_OPEN_DATA_CONNECTION: Self = Self(*b"150");

    // Success codes (2xx)
    pub const COMMAND_OK: Self = Self(*b"200");
    pub const SYSTEM_STATUS: Self = Self(*b"211");
    pub const DIRECTORY_STATUS: Self = Self(*b"212");
    pub const FILE_STATUS: Self = Self(*b"213");
    pub const SYSTEM_NAME: Self = Self(*b"215");
    pub const SERVICE_READY_FOR_NEW_USER: Self = Self(*b"220");
    pub const SERVICE_CLOSING_CONTROL_CONNECTION: Self = Self(*b"221");
    pub const NO_TRANSFER_IN_PROGRESS: Self = Self(*b"225");
    pub const CLOSING_DATA_CONNECTION: Self = Self(*b"226");
    pub const ENTERING_PASSIVE_MODE: Self = Self(*b"227");
    pub const USER_LOGGED_IN: Self = Self(*b"230");
    pub const FILE_ACTION_COMPLETED: Self = Self(*b"250");
    pub const PATHNAME_CREATED: Self = Self(*b"257");

    // Intermediate codes (3xx)
    pub const USER_NAME_OK_NEED_PASSWORD: Self = Self(*b"331");
    pub const NEED_ACCOUNT: Self = Self(*b"332");
    pub const FILE_ACTION_PENDING: Self = Self(*b"350");

    // Error codes (4xx, 5xx)
    pub const CONNECTION_CLOSED_TRANSFER_ABORTED: Self = Self(*b"426");

    /// Build a code from the first three bytes of a reply, if they are digits
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [a, b, c, ..] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() => {
                Some(Self([*a, *b, *c]))
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        // only ever built from ASCII digits
        std::str::from_utf8(&self.0).unwrap_or("???")
    }

    pub fn as_u16(&self) -> u16 {
        self.0
            .iter()
            .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'))
    }

    pub fn class(&self) -> ReplyClass {
        match self.0[0] {
            b'1' => ReplyClass::PreliminaryPositive,
            b'2' => ReplyClass::PositiveCompletion,
            b'3' => ReplyClass::PositiveIntermediate,
            b'4' => ReplyClass::TransientNegative,
            b'5' => ReplyClass::PermanentNegative,
            _ => ReplyClass::Unknown,
        }
    }

    /// Check if code indicates a transfer is about to start
    pub fn is_preliminary(&self) -> bool {
        self.class() == ReplyClass::PreliminaryPositive
    }

    /// Check if code indicates success
    pub fn is_completion(&self) -> bool {
        self.class() == ReplyClass::PositiveCompletion
    }

    /// Check if code indicates error
    pub fn is_negative(&self) -> bool {
        matches!(
            self.class(),
            ReplyClass::TransientNegative | ReplyClass::PermanentNegative
        )
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for ResponseCode {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_slice() == other.as_bytes()
    }
}
