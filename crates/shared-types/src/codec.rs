//! # Canonical Codec
//!
//! Deterministic binary encoding used both as the wire/storage form and as
//! digest input. Every record lists its fields explicitly, in a fixed order;
//! nothing is derived from struct layout.
//!
//! ## Binary Format
//!
//! - Integers: little-endian, fixed width
//! - `bool`: single byte (0 = false, 1 = true)
//! - Sequence/byte/string lengths: unsigned LEB128 varint (u32 range, minimal form)
//! - `Option<T>`: 1-byte tag (0 = None, 1 = Some) followed by the value
//! - `[u8; N]`: raw bytes without length prefix

use crate::errors::CodecError;
use shared_crypto::{RecoverableSignature, Secp256k1PublicKey, Sha256Hasher};

/// Sink for encoded bytes.
///
/// Implemented by buffers and by the hasher so digests are computed without
/// materialising the encoding.
pub trait EncodeSink {
    /// Writes the given bytes to the sink.
    fn write(&mut self, bytes: &[u8]);
}

impl EncodeSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

impl EncodeSink for Sha256Hasher {
    fn write(&mut self, bytes: &[u8]) {
        self.update(bytes);
    }
}

/// Counts encoded bytes without storing them.
#[derive(Debug, Default)]
pub struct SizeCounter {
    len: usize,
}

impl SizeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl EncodeSink for SizeCounter {
    fn write(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
    }
}

/// Types with a canonical binary form.
pub trait Encode {
    /// Writes the canonical encoding to `out`.
    fn encode<S: EncodeSink>(&self, out: &mut S);

    /// Encodes into a buffer of exact capacity.
    fn to_bytes(&self) -> Vec<u8> {
        let mut counter = SizeCounter::new();
        self.encode(&mut counter);

        let mut out = Vec::with_capacity(counter.len());
        self.encode(&mut out);
        out
    }

    /// Size of the canonical encoding in bytes.
    fn encoded_len(&self) -> usize {
        let mut counter = SizeCounter::new();
        self.encode(&mut counter);
        counter.len()
    }
}

/// Types that can be read back from their canonical form.
pub trait Decode: Sized {
    /// Decodes a value and advances `input` past the consumed bytes.
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError>;

    /// Decodes a value that must span all of `data`.
    fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        let mut input = data;
        let value = Self::decode(&mut input)?;

        if !input.is_empty() {
            return Err(CodecError::TrailingBytes {
                remaining: input.len(),
            });
        }

        Ok(value)
    }
}

/// Reads exactly `n` bytes.
pub fn take<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8], CodecError> {
    if input.len() < n {
        return Err(CodecError::UnexpectedEof);
    }
    let (head, tail) = input.split_at(n);
    *input = tail;
    Ok(head)
}

fn take_array<const N: usize>(input: &mut &[u8]) -> Result<[u8; N], CodecError> {
    let mut out = [0u8; N];
    out.copy_from_slice(take(input, N)?);
    Ok(out)
}

/// Writes `value` as an unsigned LEB128 varint.
pub fn encode_varint<S: EncodeSink>(mut value: u32, out: &mut S) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.write(&[byte]);
        if value == 0 {
            break;
        }
    }
}

/// Reads a minimal-form unsigned LEB128 varint in u32 range.
pub fn decode_varint(input: &mut &[u8]) -> Result<u32, CodecError> {
    let mut value: u64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = take(input, 1)?[0];
        if shift > 0 && byte == 0 {
            return Err(CodecError::NonCanonicalVarint);
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift >= 35 {
            return Err(CodecError::VarintOverflow);
        }
    }

    u32::try_from(value).map_err(|_| CodecError::VarintOverflow)
}

fn encode_len<S: EncodeSink>(len: usize, out: &mut S) {
    // Lengths beyond u32 cannot be produced by any record this layer builds.
    encode_varint(len as u32, out);
}

/// Upper bound on memory reserved up front for a decoded sequence. Larger
/// sequences grow as their elements actually decode.
const MAX_PREALLOC_BYTES: usize = 64 * 1024;

/// Capacity to reserve for `len` claimed elements of `T`.
fn prealloc_capacity<T>(len: usize) -> usize {
    len.min(MAX_PREALLOC_BYTES / std::mem::size_of::<T>().max(1))
}

/// Reads a length prefix and rejects it if the input cannot possibly hold
/// that many elements of at least one byte each.
fn decode_len(input: &mut &[u8]) -> Result<usize, CodecError> {
    let len = decode_varint(input)? as usize;
    if len > input.len() {
        return Err(CodecError::LengthOverflow {
            len,
            remaining: input.len(),
        });
    }
    Ok(len)
}

macro_rules! impl_int_codec {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn encode<S: EncodeSink>(&self, out: &mut S) {
                    out.write(&self.to_le_bytes());
                }
            }

            impl Decode for $ty {
                fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
                    Ok(<$ty>::from_le_bytes(take_array(input)?))
                }
            }
        )*
    };
}

impl_int_codec!(u8, u16, u32, u64);

impl Encode for bool {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(&[u8::from(*self)]);
    }
}

impl Decode for bool {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        match take(input, 1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(CodecError::InvalidTag { tag }),
        }
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(self);
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        take_array(input)
    }
}

impl Encode for String {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_len(self.len(), out);
        out.write(self.as_bytes());
    }
}

impl Decode for String {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        let len = decode_len(input)?;
        let bytes = take(input, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        encode_len(self.len(), out);
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        let len = decode_len(input)?;
        let mut items = Vec::with_capacity(prealloc_capacity::<T>(len));
        for _ in 0..len {
            items.push(T::decode(input)?);
        }
        Ok(items)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        match self {
            None => out.write(&[0]),
            Some(value) => {
                out.write(&[1]);
                value.encode(out);
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        match take(input, 1)?[0] {
            0 => Ok(None),
            1 => Ok(Some(T::decode(input)?)),
            tag => Err(CodecError::InvalidTag { tag }),
        }
    }
}

impl Encode for Secp256k1PublicKey {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(self.as_bytes());
    }
}

impl Decode for Secp256k1PublicKey {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Secp256k1PublicKey::from_bytes(take_array(input)?)
            .map_err(|e| CodecError::InvalidValue(e.to_string()))
    }
}

impl Encode for RecoverableSignature {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(self.as_bytes());
    }
}

impl Decode for RecoverableSignature {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(RecoverableSignature::from_bytes(take_array(input)?))
    }
}
