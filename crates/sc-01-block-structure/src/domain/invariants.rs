//! Structural invariants checked on construction and after decoding

use super::entities::{RegionSummary, ShardSummary, SignedBlock};
use super::errors::BlockError;
use super::value_objects::{LockKind, ShardLock};

/// Position of the first entry not strictly greater than its predecessor.
pub fn first_unsorted_lock(locks: &[ShardLock]) -> Option<usize> {
    locks
        .windows(2)
        .position(|pair| pair[0] >= pair[1])
        .map(|i| i + 1)
}

/// Both lock lists of one shard are strictly ascending.
pub fn check_shard_lock_sets(
    region: u16,
    cycle_index: usize,
    shard_index: usize,
    shard: &ShardSummary,
) -> Result<(), BlockError> {
    for (kind, locks) in [
        (LockKind::Read, &shard.read_locks),
        (LockKind::Write, &shard.write_locks),
    ] {
        if let Some(position) = first_unsorted_lock(locks) {
            return Err(BlockError::UnsortedLockSet {
                region,
                cycle_index,
                shard_index,
                kind,
                position,
            });
        }
    }
    Ok(())
}

/// Every shard lock list in the plan is strictly ascending.
pub fn check_plan_lock_sets(regions: &[RegionSummary]) -> Result<(), BlockError> {
    for region in regions {
        for (cycle_index, cycle) in region.cycles_summary.iter().enumerate() {
            for (shard_index, shard) in cycle.iter().enumerate() {
                check_shard_lock_sets(region.region, cycle_index, shard_index, shard)?;
            }
        }
    }
    Ok(())
}

/// Invariants a decoded block must satisfy before any other processing.
pub fn check_decoded_block(block: &SignedBlock) -> Result<(), BlockError> {
    if let Some(change) = &block.header().new_producers {
        change.validate()?;
    }
    check_plan_lock_sets(&block.summary.regions)
}
