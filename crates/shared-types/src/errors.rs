//! # Error Types
//!
//! Errors raised while decoding records or parsing names.

use thiserror::Error;

/// Failure to decode a canonical record (`MalformedRecord` at the block layer).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before the record was complete.
    #[error("Unexpected end of input")]
    UnexpectedEof,

    /// A length prefix claims more elements than bytes remain.
    #[error("Length prefix {len} exceeds remaining input of {remaining} bytes")]
    LengthOverflow { len: usize, remaining: usize },

    /// Varint longer than five bytes or outside u32 range.
    #[error("Varint overflow")]
    VarintOverflow,

    /// Varint carries redundant continuation bytes.
    #[error("Non-canonical varint encoding")]
    NonCanonicalVarint,

    /// Option/bool/enum tag outside its domain.
    #[error("Invalid tag byte: {tag}")]
    InvalidTag { tag: u8 },

    /// String bytes are not UTF-8.
    #[error("Invalid UTF-8 in string")]
    InvalidUtf8,

    /// Record decoded but input was not fully consumed.
    #[error("Trailing bytes after record: {remaining}")]
    TrailingBytes { remaining: usize },

    /// Field bytes do not represent a valid value.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Failure to parse a 64-bit packed name.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum NameError {
    /// More than 13 characters.
    #[error("Name too long: {len} characters (max 13)")]
    TooLong { len: usize },

    /// Character outside `.12345a-z`.
    #[error("Invalid character {ch:?} at position {position}")]
    InvalidCharacter { ch: char, position: usize },

    /// The 13th character only has 4 bits and must be one of `.12345a-j`.
    #[error("Invalid 13th character {ch:?}")]
    InvalidThirteenthCharacter { ch: char },
}
