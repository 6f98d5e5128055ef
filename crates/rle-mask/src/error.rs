/// Why an encoded string could not be split into run pairs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    #[error("expected an even number of tokens, found {0}")]
    OddTokenCount(usize),

    #[error("token {index} ({token:?}) is not a non-negative integer")]
    InvalidToken { index: usize, token: String },
}

/// Errors returned while decoding an RLE mask.
///
/// All variants describe bad input. Decoding the same input again yields the
/// same error, and no partially decoded mask is ever returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("malformed encoding: {0}")]
    MalformedEncoding(#[from] Malformed),

    #[error("run (start {start}, length {length}) falls outside a mask of {size} pixels")]
    IndexOutOfRange { start: u64, length: u64, size: usize },

    #[error("invalid shape {h}x{w}: height and width must be positive")]
    InvalidShape { h: u32, w: u32 },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
