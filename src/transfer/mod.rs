//! Data transfer module

pub mod progress;
pub(crate) mod stream;

pub use progress::TransferProgress;

/// Representation type of the data connection, set with `TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferType {
    #[default]
    Ascii,
    Binary,
}

impl TransferType {
    /// The argument sent with `TYPE`: `A` for ASCII, `I` for image (binary) data
    pub fn symbol(&self) -> &'static str {
        match self {
            TransferType::Ascii => "A",
            TransferType::Binary => "I",
        }
    }
}

impl std::fmt::Display for TransferType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferType::Ascii => write!(f, "ASCII"),
            TransferType::Binary => write!(f, "binary"),
        }
    }
}
