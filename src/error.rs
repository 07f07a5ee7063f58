use thiserror::Error;

/// A spacepackets [`Result`], conveniently wrapping the [`CodecError`].
pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error types which can occur while packing or unpacking any of the wire
/// formats in this crate.
pub enum CodecError {
    #[error("buffer too short, expected at least {expected} bytes, got {actual}")]
    BytesTooShort { expected: usize, actual: usize },

    #[error("invalid value {value} for field {field}")]
    InvalidFieldValue { field: &'static str, value: u64 },

    #[error("unsupported version, found {found}, expected {expected}")]
    UnsupportedVersion { found: u8, expected: u8 },

    #[cfg(feature = "crc")]
    #[cfg_attr(docsrs, doc(cfg(feature = "crc")))]
    #[error("CRC-16 mismatch, expected {expected:#06x}, computed {computed:#06x}")]
    InvalidCrc16 { expected: u16, computed: u16 },

    #[error("invalid TLV type {found:#04x}{}", expected.map(|e| format!(", expected {e:#04x}")).unwrap_or_default())]
    InvalidTlvType { found: u8, expected: Option<u8> },

    #[error("invalid CFDP directive code {value:#04x}")]
    InvalidDirectiveCode { value: u8 },

    #[error("invalid field length: {context}")]
    InvalidFieldLength { context: &'static str },

    #[error("invalid verification params: {reason}")]
    InvalidVerifParams { reason: &'static str },

    #[error("TM source data too short, expected at least {expected} bytes, got {actual}")]
    SrcDataTooShort { expected: usize, actual: usize },
}
