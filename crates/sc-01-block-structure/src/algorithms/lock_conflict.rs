//! # Lock Conflict Detection
//!
//! Checks that the shards of one cycle may run in parallel: no lock may be
//! written by one shard and touched (read or written) by another.
//!
//! Every shard's read and write lists are already strictly ascending, so the
//! cycle's lists are merged with a min-heap of cursors, one per list. Equal
//! locks come out adjacent and each run of equal locks is checked once.
//!
//! Cost is O(n log k) for n claims over k lists, against O(n^2) for pairwise
//! comparison. The reported conflict is the smallest conflicting lock, with
//! the lowest pair of shard indices claiming it, so every node reports the
//! same error for the same block.

use crate::domain::entities::ShardSummary;
use crate::domain::errors::BlockError;
use crate::domain::invariants::check_shard_lock_sets;
use crate::domain::value_objects::{LockKind, ShardLock};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Position in one shard's read or write list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Cursor {
    lock: ShardLock,
    shard: usize,
    kind: LockKind,
    position: usize,
}

/// One claim on a lock, as seen during the merge.
#[derive(Debug, Clone, Copy)]
struct Claim {
    shard: usize,
    kind: LockKind,
}

/// Validate lock sortedness and cross-shard exclusivity for one cycle.
pub fn validate_cycle(
    region: u16,
    cycle_index: usize,
    shards: &[ShardSummary],
) -> Result<(), BlockError> {
    for (shard_index, shard) in shards.iter().enumerate() {
        check_shard_lock_sets(region, cycle_index, shard_index, shard)?;
    }

    if let Some((lock, shard_a, shard_b)) = find_conflict(shards) {
        return Err(BlockError::LockConflict {
            region,
            cycle_index,
            shard_a,
            shard_b,
            lock,
        });
    }

    Ok(())
}

/// Smallest conflicting lock and the shard pair claiming it.
///
/// Assumes every lock list is strictly ascending.
pub(crate) fn find_conflict(shards: &[ShardSummary]) -> Option<(ShardLock, usize, usize)> {
    fn list(shard: &ShardSummary, kind: LockKind) -> &[ShardLock] {
        match kind {
            LockKind::Read => &shard.read_locks,
            LockKind::Write => &shard.write_locks,
        }
    }

    let mut heap = BinaryHeap::new();
    for (shard_index, shard) in shards.iter().enumerate() {
        for kind in [LockKind::Read, LockKind::Write] {
            if let Some(&lock) = list(shard, kind).first() {
                heap.push(Reverse(Cursor {
                    lock,
                    shard: shard_index,
                    kind,
                    position: 0,
                }));
            }
        }
    }

    let mut run: Vec<Claim> = Vec::new();
    let mut run_lock: Option<ShardLock> = None;

    while let Some(Reverse(cursor)) = heap.pop() {
        if run_lock != Some(cursor.lock) {
            if let Some(lock) = run_lock {
                if let Some((a, b)) = conflicting_pair(&run) {
                    return Some((lock, a, b));
                }
            }
            run.clear();
            run_lock = Some(cursor.lock);
        }
        run.push(Claim {
            shard: cursor.shard,
            kind: cursor.kind,
        });

        let next = cursor.position + 1;
        if let Some(&lock) = list(&shards[cursor.shard], cursor.kind).get(next) {
            heap.push(Reverse(Cursor {
                lock,
                position: next,
                ..cursor
            }));
        }
    }

    let lock = run_lock?;
    conflicting_pair(&run).map(|(a, b)| (lock, a, b))
}

/// Lowest (writer, other shard) pair in a run of claims on one lock.
///
/// Claims arrive ordered by shard index. A shard reading and writing its own
/// lock is not a conflict.
fn conflicting_pair(run: &[Claim]) -> Option<(usize, usize)> {
    let writer = run.iter().find(|c| c.kind == LockKind::Write)?;
    let other = run.iter().find(|c| c.shard != writer.shard)?;
    Some((writer.shard.min(other.shard), writer.shard.max(other.shard)))
}
