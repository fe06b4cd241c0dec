//! # Execution Plan Validation
//!
//! A plan (regions of cycles of shards) is safe to execute when:
//!
//! 1. It stays within the configured shape limits
//! 2. Every cycle passes lock validation (sorted sets, no cross-shard writes)
//! 3. Receipts and input transactions match one to one, and each body lives
//!    in the region it is scheduled in
//!
//! Checks run in that order and the first failure is returned. With
//! `parallel_validation` the cycles are checked on the rayon pool; the
//! reported error is still the first in plan order.

use super::lock_conflict::validate_cycle;
use crate::config::BlockStructureConfig;
use crate::domain::entities::{Cycle, RegionSummary};
use crate::domain::errors::BlockError;
use rayon::prelude::*;
use shared_types::{SignedTransaction, TransactionId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Validate a complete plan against the transactions it schedules.
pub fn validate_plan(
    regions: &[RegionSummary],
    input_transactions: &[SignedTransaction],
    config: &BlockStructureConfig,
) -> Result<(), BlockError> {
    check_limits(regions, config)?;
    check_cycles(regions, config.parallel_validation)?;
    check_coverage(regions, input_transactions)?;

    debug!(
        regions = regions.len(),
        transactions = input_transactions.len(),
        "Plan validated"
    );
    Ok(())
}

/// Shape limits and distinct region ids.
pub fn check_limits(
    regions: &[RegionSummary],
    config: &BlockStructureConfig,
) -> Result<(), BlockError> {
    if regions.len() > config.max_regions {
        return Err(BlockError::invalid_plan(format!(
            "{} regions exceed limit {}",
            regions.len(),
            config.max_regions
        )));
    }

    let mut seen = HashSet::with_capacity(regions.len());
    let mut receipts = 0usize;

    for region in regions {
        if !seen.insert(region.region) {
            return Err(BlockError::invalid_plan(format!(
                "region {} appears more than once",
                region.region
            )));
        }

        if region.cycles_summary.len() > config.max_cycles_per_region {
            return Err(BlockError::invalid_plan(format!(
                "region {} has {} cycles, limit {}",
                region.region,
                region.cycles_summary.len(),
                config.max_cycles_per_region
            )));
        }

        for (cycle_index, cycle) in region.cycles_summary.iter().enumerate() {
            if cycle.len() > config.max_shards_per_cycle {
                return Err(BlockError::invalid_plan(format!(
                    "region {} cycle {} has {} shards, limit {}",
                    region.region,
                    cycle_index,
                    cycle.len(),
                    config.max_shards_per_cycle
                )));
            }
            receipts += cycle.iter().map(|s| s.transactions.len()).sum::<usize>();
        }
    }

    if receipts > config.max_block_transactions {
        return Err(BlockError::invalid_plan(format!(
            "{} transactions exceed limit {}",
            receipts, config.max_block_transactions
        )));
    }

    Ok(())
}

/// Lock validation for every cycle in plan order.
pub fn check_cycles(regions: &[RegionSummary], parallel: bool) -> Result<(), BlockError> {
    let cycles: Vec<(u16, usize, &Cycle)> = regions
        .iter()
        .flat_map(|region| {
            region
                .cycles_summary
                .iter()
                .enumerate()
                .map(move |(cycle_index, cycle)| (region.region, cycle_index, cycle))
        })
        .collect();

    let check = |&(region, cycle_index, cycle): &(u16, usize, &Cycle)| {
        validate_cycle(region, cycle_index, cycle).err()
    };

    let first_error = if parallel {
        cycles.par_iter().find_map_first(check)
    } else {
        cycles.iter().find_map(check)
    };

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// One-to-one match between receipts and input transactions.
pub fn check_coverage(
    regions: &[RegionSummary],
    input_transactions: &[SignedTransaction],
) -> Result<(), BlockError> {
    let mut bodies: HashMap<TransactionId, &SignedTransaction> =
        HashMap::with_capacity(input_transactions.len());
    for trx in input_transactions {
        let id = trx.id();
        if bodies.insert(id, trx).is_some() {
            return Err(BlockError::invalid_plan(format!(
                "input transaction {id} included more than once"
            )));
        }
    }

    let mut scheduled = HashSet::with_capacity(input_transactions.len());
    for region in regions {
        for receipt in region.receipts() {
            let Some(trx) = bodies.get(&receipt.id) else {
                return Err(BlockError::invalid_plan(format!(
                    "receipt {} has no input transaction",
                    receipt.id
                )));
            };

            if !scheduled.insert(receipt.id) {
                return Err(BlockError::invalid_plan(format!(
                    "transaction {} scheduled more than once",
                    receipt.id
                )));
            }

            if trx.transaction.region != region.region {
                return Err(BlockError::invalid_plan(format!(
                    "transaction {} belongs to region {}, scheduled in region {}",
                    receipt.id, trx.transaction.region, region.region
                )));
            }
        }
    }

    if let Some(unscheduled) = input_transactions
        .iter()
        .map(SignedTransaction::id)
        .find(|id| !scheduled.contains(id))
    {
        return Err(BlockError::invalid_plan(format!(
            "input transaction {unscheduled} is not scheduled"
        )));
    }

    Ok(())
}
