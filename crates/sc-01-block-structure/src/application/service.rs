//! Block Structure Service
//!
//! Main service implementing BlockStructureApi.

use super::assembly::BlockAssembler;
use crate::algorithms::plan_validator::validate_plan;
use crate::config::BlockStructureConfig;
use crate::domain::entities::{
    action_merkle_root, BlockTrace, CycleTrace, RegionSummary, RegionTrace, ShardSummary,
    ShardTrace, SignedBlock,
};
use crate::domain::errors::{BlockError, ExecutionError};
use crate::domain::value_objects::{ProducerScheduleChange, RootKind};
use crate::ports::inbound::{
    BlockStructureApi, ProduceBlockRequest, ProducedBlock, ValidationContext,
};
use crate::ports::outbound::{ShardExecution, TransactionExecutor};
use async_trait::async_trait;
use chain_telemetry::{log_block_event, log_tx_event};
use futures::future::try_join_all;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{BlockId, SignedTransaction, TransactionId, TransactionTrace};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "block_structure";

/// Block Structure Service
///
/// Orchestrates the block pipeline:
/// 1. Validate the plan
/// 2. Execute cycles in order, the shards of each cycle concurrently
/// 3. Fold traces into the action root
/// 4. Commit roots and sign
pub struct BlockStructureService {
    config: BlockStructureConfig,
    executor: Arc<dyn TransactionExecutor>,
}

impl BlockStructureService {
    /// Create a new service with default config
    pub fn new(executor: Arc<dyn TransactionExecutor>) -> Self {
        Self::with_config(executor, BlockStructureConfig::default())
    }

    /// Create a new service with custom config
    pub fn with_config(executor: Arc<dyn TransactionExecutor>, config: BlockStructureConfig) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &BlockStructureConfig {
        &self.config
    }

    /// Run every shard of the plan through the executor.
    ///
    /// Cycles of a region run in order; each cycle completes before the next
    /// starts. Regions run one after another.
    async fn execute_plan(
        &self,
        regions: &[RegionSummary],
        input_transactions: &[SignedTransaction],
    ) -> Result<Vec<RegionTrace>, BlockError> {
        let bodies: HashMap<TransactionId, &SignedTransaction> = input_transactions
            .iter()
            .map(|trx| (trx.id(), trx))
            .collect();

        let mut region_traces = Vec::with_capacity(regions.len());
        for region in regions {
            let mut cycle_traces = Vec::with_capacity(region.cycles_summary.len());

            for (cycle_index, cycle) in region.cycles_summary.iter().enumerate() {
                let resolved = cycle
                    .iter()
                    .map(|shard| resolve_bodies(shard, &bodies))
                    .collect::<Result<Vec<_>, _>>()?;

                let shard_traces = try_join_all(cycle.iter().zip(&resolved).enumerate().map(
                    |(shard_index, (shard, transactions))| {
                        self.execute_shard(ShardExecution {
                            region: region.region,
                            cycle_index,
                            shard_index,
                            shard,
                            transactions,
                        })
                    },
                ))
                .await?;

                debug!(
                    region = region.region,
                    cycle_index,
                    shards = shard_traces.len(),
                    "Cycle executed"
                );
                cycle_traces.push(CycleTrace { shard_traces });
            }

            region_traces.push(RegionTrace { cycle_traces });
        }

        Ok(region_traces)
    }

    async fn execute_shard(&self, execution: ShardExecution<'_>) -> Result<ShardTrace, BlockError> {
        let traces = self.executor.execute_shard(execution).await?;
        check_traces(execution.shard, &traces)?;

        let mut shard_trace = ShardTrace::default();
        for trace in traces {
            log_tx_event!(
                debug,
                COMPONENT,
                "Transaction executed",
                trace.id,
                status = ?trace.status,
                actions = trace.action_traces.len()
            );
            shard_trace.append(trace);
        }
        shard_trace.calculate_root();

        Ok(shard_trace)
    }

    /// Must pass before any shard of a plan reaches the executor.
    fn check_plan(
        &self,
        new_producers: Option<&ProducerScheduleChange>,
        regions: &[RegionSummary],
        input_transactions: &[SignedTransaction],
    ) -> Result<(), BlockError> {
        if let Some(change) = new_producers {
            change.validate()?;
        }
        validate_plan(regions, input_transactions, &self.config)
    }

    fn check_block(&self, block: &SignedBlock, context: &ValidationContext) -> Result<BlockId, BlockError> {
        let signed_header = block.signed_header();
        let header = &signed_header.header;

        self.check_plan(
            header.new_producers.as_ref(),
            block.regions(),
            &block.input_transactions,
        )?;

        let transaction_mroot = block.calculate_transaction_merkle_root()?;
        if transaction_mroot != header.transaction_mroot {
            return Err(BlockError::RootMismatch {
                root: RootKind::Transaction,
                expected: header.transaction_mroot,
                actual: transaction_mroot,
            });
        }

        let block_mroot = context.block_roots.root();
        if block_mroot != header.block_mroot {
            return Err(BlockError::RootMismatch {
                root: RootKind::Block,
                expected: header.block_mroot,
                actual: block_mroot,
            });
        }

        if let Some(parent) = &context.parent {
            header.validate_parent(parent)?;
        }

        signed_header.validate_signee(&context.expected_signee)?;

        Ok(signed_header.id())
    }
}

/// Bodies for a shard's receipts, in receipt order.
fn resolve_bodies<'a>(
    shard: &ShardSummary,
    bodies: &HashMap<TransactionId, &'a SignedTransaction>,
) -> Result<Vec<&'a SignedTransaction>, BlockError> {
    shard
        .transactions
        .iter()
        .map(|receipt| {
            bodies.get(&receipt.id).copied().ok_or_else(|| {
                BlockError::invalid_plan(format!("receipt {} has no input transaction", receipt.id))
            })
        })
        .collect()
}

/// Traces must answer the shard's receipts one for one, in order.
fn check_traces(shard: &ShardSummary, traces: &[TransactionTrace]) -> Result<(), ExecutionError> {
    if traces.len() != shard.transactions.len() {
        return Err(ExecutionError::TraceCountMismatch {
            expected: shard.transactions.len(),
            actual: traces.len(),
        });
    }

    for (index, (receipt, trace)) in shard.transactions.iter().zip(traces).enumerate() {
        if receipt.id != trace.id {
            return Err(ExecutionError::TraceOrderMismatch {
                index,
                expected: receipt.id,
                actual: trace.id,
            });
        }
    }

    Ok(())
}

#[async_trait]
impl BlockStructureApi for BlockStructureService {
    async fn produce_block(
        &self,
        request: ProduceBlockRequest,
        key: &Secp256k1KeyPair,
    ) -> Result<ProducedBlock, BlockError> {
        let ProduceBlockRequest {
            previous,
            timestamp,
            producer,
            new_producers,
            regions,
            input_transactions,
            block_roots,
        } = request;

        // Nothing is executed or signed for a plan that fails validation
        if let Err(e) = self.check_plan(new_producers.as_ref(), &regions, &input_transactions) {
            warn!(producer = %producer, error = %e, "Refusing to produce block");
            return Err(e);
        }

        let region_traces = self.execute_plan(&regions, &input_transactions).await?;
        let action_mroot = action_merkle_root(&region_traces);

        let block = BlockAssembler::new(previous, timestamp, producer)
            .with_new_producers(new_producers)
            .with_regions(regions)
            .with_input_transactions(input_transactions)
            .with_block_roots(block_roots)
            .with_action_mroot(action_mroot)
            .with_config(self.config.clone())
            .assemble(key)?;

        log_block_event!(
            info,
            COMPONENT,
            "Block produced",
            block.block_num(),
            block.id(),
            transactions = block.input_transactions.len(),
            action_mroot = %action_mroot
        );

        Ok(ProducedBlock {
            block,
            region_traces,
        })
    }

    fn validate_block(
        &self,
        block: &SignedBlock,
        context: &ValidationContext,
    ) -> Result<BlockId, BlockError> {
        match self.check_block(block, context) {
            Ok(id) => {
                log_block_event!(info, COMPONENT, "Block validated", block.block_num(), id);
                Ok(id)
            }
            Err(e) => {
                warn!(
                    component = COMPONENT,
                    block_num = block.block_num(),
                    error = %e,
                    "Block rejected"
                );
                Err(e)
            }
        }
    }

    async fn apply_block<'a>(&self, block: &'a SignedBlock) -> Result<BlockTrace<'a>, BlockError> {
        // No shard reaches the executor unless its cycle is conflict free
        if let Err(e) = self.check_plan(
            block.header().new_producers.as_ref(),
            block.regions(),
            &block.input_transactions,
        ) {
            warn!(
                component = COMPONENT,
                block_num = block.block_num(),
                error = %e,
                "Refusing to apply block"
            );
            return Err(e);
        }

        let region_traces = self
            .execute_plan(block.regions(), &block.input_transactions)
            .await?;
        let trace = BlockTrace::with_traces(block, region_traces);

        let expected = block.header().action_mroot;
        let actual = trace.calculate_action_merkle_root();
        if actual != expected {
            warn!(
                component = COMPONENT,
                block_num = block.block_num(),
                %expected,
                %actual,
                "Action root mismatch"
            );
            return Err(BlockError::RootMismatch {
                root: RootKind::Action,
                expected,
                actual,
            });
        }

        log_block_event!(info, COMPONENT, "Block applied", block.block_num(), block.id());
        Ok(trace)
    }
}
