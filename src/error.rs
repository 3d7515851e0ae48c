use thiserror::Error;

#[derive(Error, Debug)]
pub enum StegError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Insufficient bits: requested {requested}, only {available} remaining")]
    InsufficientBits { requested: usize, available: usize },

    #[error("Value {value} does not fit in {width} bits")]
    Width { value: u64, width: usize },

    #[error("Integer width {0} exceeds 32 bits")]
    WidthTooLarge(usize),

    #[error("Bit length {0} is not a multiple of 8")]
    NotByteAligned(usize),

    #[error("Cannot pad {len} bits to {target} bits: buffer would shrink")]
    PadTarget { target: usize, len: usize },

    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    #[error("Invalid binary string: {0}")]
    InvalidBinary(String),

    #[error("Binary string length {len} exceeds padding length {pad}")]
    PaddingOverflow { len: usize, pad: usize },

    #[error("Range {offset}+{length} exceeds buffer of {len} bytes")]
    Range {
        offset: usize,
        length: usize,
        len: usize,
    },

    #[error("Payload of {payload} bytes exceeds image capacity of {capacity} bytes")]
    CapacityExceeded { payload: usize, capacity: usize },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Unsupported framing: {0}")]
    UnsupportedFraming(String),
}

pub type Result<T> = std::result::Result<T, StegError>;
