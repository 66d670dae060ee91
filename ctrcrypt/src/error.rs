#[derive(thiserror::Error)]
pub enum Error {
    // dependency errors
    #[error("hex conversion: {0}")]
    Hex(#[from] hex::FromHexError),

    // std errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("utf8 conversion: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    // crate errors
    #[error("inputs are {0} and {1} bytes but must have the same length")]
    LengthMismatch(usize, usize),

    #[error("key is {0} bytes instead of 16")]
    KeyLength(usize),

    #[error("key slot {0:#04X} is missing its KeyX or KeyY")]
    SlotNotProvisioned(u8),

    #[error("found magic of {0:#x} instead of {:#x}", super::MAGIC)]
    Magic(u32),

    #[error("unsupported ncchinfo.bin version {0}")]
    Version(u32),

    #[error("header specifies more entries than the file contains")]
    Truncated,

    #[error("got {0:#x}, which is not a boolean flag")]
    Flag(u32),

    #[error("entry output name is all padding")]
    EmptyName,

    #[error("cipher failure: {0}")]
    Cipher(String),

    #[error("{0}")]
    Other(&'static str),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
