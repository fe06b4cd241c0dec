//! Block timestamps: 500 ms slots counted from 2000-01-01T00:00:00Z.

use crate::codec::{Decode, Encode, EncodeSink};
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};

/// Slot length in milliseconds.
pub const BLOCK_INTERVAL_MS: u64 = 500;

/// Unix time of slot zero, in milliseconds.
pub const BLOCK_TIMESTAMP_EPOCH_MS: u64 = 946_684_800_000;

/// Timestamp of a block, as a slot number.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockTimestamp {
    pub slot: u32,
}

impl BlockTimestamp {
    pub const fn new(slot: u32) -> Self {
        Self { slot }
    }

    /// Slot containing `unix_ms`. `None` before the epoch or past the last slot.
    pub fn from_unix_millis(unix_ms: u64) -> Option<Self> {
        let since_epoch = unix_ms.checked_sub(BLOCK_TIMESTAMP_EPOCH_MS)?;
        let slot = u32::try_from(since_epoch / BLOCK_INTERVAL_MS).ok()?;
        Some(Self { slot })
    }

    /// Start of the slot in unix milliseconds.
    pub fn to_unix_millis(&self) -> u64 {
        BLOCK_TIMESTAMP_EPOCH_MS + u64::from(self.slot) * BLOCK_INTERVAL_MS
    }

    pub fn next(&self) -> Self {
        Self {
            slot: self.slot.saturating_add(1),
        }
    }
}

impl Encode for BlockTimestamp {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.slot.encode(out);
    }
}

impl Decode for BlockTimestamp {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            slot: u32::decode(input)?,
        })
    }
}
