//! # Digests and Block Ids
//!
//! `Digest` is a SHA-256 value. `BlockId` is a digest whose leading four bytes
//! have been overwritten with the block height (big-endian), so the height can
//! be read back from the id without any index.

use crate::codec::{Decode, Encode, EncodeSink};
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use shared_crypto::{sha256, Sha256Hasher};
use std::fmt;

/// 32-byte SHA-256 digest.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Digest(pub [u8; 32]);

/// Id of a transaction: digest of its unsigned body.
pub type TransactionId = Digest;

impl Digest {
    /// The all-zero digest (root of an empty merkle tree).
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// SHA-256 of raw bytes.
    pub fn hash(data: &[u8]) -> Self {
        Self(sha256(data))
    }

    /// SHA-256 of a record's canonical encoding, streamed into the hasher.
    pub fn of<T: Encode + ?Sized>(value: &T) -> Self {
        let mut hasher = Sha256Hasher::new();
        value.encode(&mut hasher);
        Self(hasher.finalize())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", hex::encode(self.0))
    }
}

impl Encode for Digest {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(&self.0);
    }
}

impl Decode for Digest {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self(<[u8; 32]>::decode(input)?))
    }
}

/// Block identifier with the block height embedded in its first four bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub [u8; 32]);

impl BlockId {
    /// Id of the (virtual) parent of the first block; embeds height 0.
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Builds an id from a content digest by overwriting its leading four
    /// bytes with `height` in big-endian order.
    pub fn make(height: u32, content: Digest) -> Self {
        let mut bytes = content.0;
        bytes[..4].copy_from_slice(&height.to_be_bytes());
        Self(bytes)
    }

    /// Height embedded in the id.
    pub fn num(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId(#{} {})", self.num(), hex::encode(&self.0[4..]))
    }
}

impl Encode for BlockId {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(&self.0);
    }
}

impl Decode for BlockId {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self(<[u8; 32]>::decode(input)?))
    }
}
