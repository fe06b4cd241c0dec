//! Value objects for block structuring

use super::errors::BlockError;
use crate::algorithms::merkle::merkle_root;
use serde::{Deserialize, Serialize};
use shared_types::{AccountName, BlockId, Digest, ScopeName};
use std::cmp::Ordering;
use std::fmt;

/// A claim on one (account, scope) pair of contract state.
///
/// Locks are ordered by account first, then scope, each compared as its
/// packed 64-bit name. Shard lock lists must be strictly ascending under
/// this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardLock {
    pub account: AccountName,
    pub scope: ScopeName,
}

impl ShardLock {
    pub fn new(account: AccountName, scope: ScopeName) -> Self {
        Self { account, scope }
    }
}

impl Ord for ShardLock {
    fn cmp(&self, other: &Self) -> Ordering {
        self.account
            .as_u64()
            .cmp(&other.account.as_u64())
            .then_with(|| self.scope.as_u64().cmp(&other.scope.as_u64()))
    }
}

impl PartialOrd for ShardLock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ShardLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account, self.scope)
    }
}

/// Whether a lock is claimed for reading or writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LockKind {
    Read,
    Write,
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Which commitment a `RootMismatch` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootKind {
    Transaction,
    Action,
    Block,
    BlockId,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transaction => "transaction",
            Self::Action => "action",
            Self::Block => "block",
            Self::BlockId => "block id",
        };
        f.write_str(name)
    }
}

/// One producer replacement: `outgoing` leaves the schedule, `incoming` joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProducerChange {
    pub outgoing: AccountName,
    pub incoming: AccountName,
}

impl ProducerChange {
    pub fn new(outgoing: AccountName, incoming: AccountName) -> Self {
        Self { outgoing, incoming }
    }
}

/// Ordered set of producer replacements carried in a block header.
///
/// Canonical form: outgoing names strictly ascending, and incoming names
/// strictly ascending in the same entry order. Two honest producers given the
/// same set of replacements therefore encode identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ProducerChange>", into = "Vec<ProducerChange>")]
pub struct ProducerScheduleChange {
    changes: Vec<ProducerChange>,
}

impl ProducerScheduleChange {
    /// Build a change list, rejecting any non-canonical pairing.
    pub fn new(changes: Vec<ProducerChange>) -> Result<Self, BlockError> {
        let change = Self { changes };
        change.validate()?;
        Ok(change)
    }

    /// Wrap entries without checking order. Used by the decoder; callers
    /// must run [`validate`](Self::validate) before trusting the value.
    pub(crate) fn from_unchecked(changes: Vec<ProducerChange>) -> Self {
        Self { changes }
    }

    /// Check canonical pairing; reports the first offending entry.
    pub fn validate(&self) -> Result<(), BlockError> {
        for (index, pair) in self.changes.windows(2).enumerate() {
            if pair[0].outgoing >= pair[1].outgoing || pair[0].incoming >= pair[1].incoming {
                return Err(BlockError::UnsortedSchedule { index: index + 1 });
            }
        }
        Ok(())
    }

    pub fn changes(&self) -> &[ProducerChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl TryFrom<Vec<ProducerChange>> for ProducerScheduleChange {
    type Error = BlockError;

    fn try_from(changes: Vec<ProducerChange>) -> Result<Self, Self::Error> {
        Self::new(changes)
    }
}

impl From<ProducerScheduleChange> for Vec<ProducerChange> {
    fn from(change: ProducerScheduleChange) -> Self {
        change.changes
    }
}

/// Leaves of the `block_mroot` commitment.
///
/// The block layer does not decide which prior blocks are committed to; the
/// caller supplies the leaves (for example, the ids of every ancestor in
/// height order) and both producer and validator must agree on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRootInputs {
    pub leaves: Vec<Digest>,
}

impl BlockRootInputs {
    pub fn new(leaves: Vec<Digest>) -> Self {
        Self { leaves }
    }

    /// Commit to a sequence of block ids.
    pub fn from_block_ids(ids: &[BlockId]) -> Self {
        Self {
            leaves: ids.iter().map(|id| Digest(id.0)).collect(),
        }
    }

    pub fn root(&self) -> Digest {
        merkle_root(&self.leaves)
    }
}
