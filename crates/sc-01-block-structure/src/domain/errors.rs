//! Error types for block structuring and validation
//!
//! Every variant is a local, synchronous validation failure. Any of them on an
//! incoming block rejects the whole block.

use super::value_objects::{LockKind, RootKind, ShardLock};
use shared_crypto::CryptoError;
use shared_types::{BlockId, CodecError, Digest, PublicKey, TransactionId};
use thiserror::Error;

/// All errors that can occur while assembling or validating a block
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    /// Canonical decoding failed
    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] CodecError),

    /// A shard's read or write lock list is not strictly ascending
    #[error(
        "Unsorted {kind} lock set in region {region}, cycle {cycle_index}, shard {shard_index} at position {position}"
    )]
    UnsortedLockSet {
        region: u16,
        cycle_index: usize,
        shard_index: usize,
        kind: LockKind,
        position: usize,
    },

    /// Two shards of one cycle claim the same lock and at least one writes it
    #[error(
        "Lock conflict in region {region}, cycle {cycle_index}: shards {shard_a} and {shard_b} both claim {lock}"
    )]
    LockConflict {
        region: u16,
        cycle_index: usize,
        shard_a: usize,
        shard_b: usize,
        lock: ShardLock,
    },

    /// Plan structure does not match the block's transactions or limits
    #[error("Invalid plan: {reason}")]
    InvalidPlan { reason: String },

    /// Producer schedule change is not in canonical pairing
    #[error("Unsorted producer schedule change at entry {index}")]
    UnsortedSchedule { index: usize },

    /// Recovered signee differs from the expected producer key
    #[error("Signature mismatch: expected {expected}, recovered {actual}")]
    SignatureMismatch {
        expected: PublicKey,
        actual: PublicKey,
    },

    /// Recomputed root differs from the one the header commits to
    #[error("{root} root mismatch: header claims {expected}, recomputed {actual}")]
    RootMismatch {
        root: RootKind,
        expected: Digest,
        actual: Digest,
    },

    /// Block height inconsistent with the parent's embedded height
    #[error("Height mismatch: expected {expected}, got {actual}")]
    HeightMismatch { expected: u32, actual: u32 },

    /// Parent already sits at the highest representable height
    #[error("Height overflow: parent at height {parent} has no successor")]
    HeightOverflow { parent: u32 },

    /// Header's `previous` is not the known parent
    #[error("Unknown parent: expected {expected}, header references {actual}")]
    UnknownParent { expected: BlockId, actual: BlockId },

    /// Signing or key recovery failed
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Execution engine failed or returned traces that do not fit the plan
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

impl BlockError {
    pub(crate) fn invalid_plan(reason: impl Into<String>) -> Self {
        Self::InvalidPlan {
            reason: reason.into(),
        }
    }
}

/// Errors reported by or about the transaction execution engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Engine-side failure
    #[error("Executor failed: {0}")]
    Failed(String),

    /// Engine returned a different number of traces than receipts
    #[error("Shard produced {actual} traces for {expected} receipts")]
    TraceCountMismatch { expected: usize, actual: usize },

    /// Trace at `index` is for a different transaction than the receipt
    #[error("Trace {index} is for {actual}, receipt lists {expected}")]
    TraceOrderMismatch {
        index: usize,
        expected: TransactionId,
        actual: TransactionId,
    },
}

/// Errors from the WASM text/bytecode translator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid module: {0}")]
    InvalidModule(String),
}
