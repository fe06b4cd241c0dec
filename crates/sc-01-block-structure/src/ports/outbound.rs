//! Outbound Ports (Driven Ports / SPI)
//!
//! The block layer never executes contracts itself. It hands each shard's
//! transactions to a [`TransactionExecutor`] and folds the returned traces.

use crate::domain::entities::ShardSummary;
use crate::domain::errors::{ExecutionError, TranslationError};
use async_trait::async_trait;
use shared_types::{SignedTransaction, TransactionTrace};

/// One shard's work, with transaction bodies resolved in receipt order.
#[derive(Debug, Clone, Copy)]
pub struct ShardExecution<'a> {
    pub region: u16,
    pub cycle_index: usize,
    pub shard_index: usize,
    pub shard: &'a ShardSummary,
    /// Bodies aligned with `shard.transactions`
    pub transactions: &'a [&'a SignedTransaction],
}

/// Transaction execution engine
///
/// Shards of one cycle are executed concurrently; the engine may rely on the
/// shard's declared locks being disjoint from every other shard in flight.
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    /// Execute a shard and return one trace per receipt, in receipt order.
    async fn execute_shard(
        &self,
        execution: ShardExecution<'_>,
    ) -> Result<Vec<TransactionTrace>, ExecutionError>;
}

/// Converts contracts between WebAssembly text and binary form.
///
/// Used by contract tooling. Block validation never calls it.
pub trait WasmTranslator: Send + Sync {
    fn wast_to_wasm(&self, wast: &str) -> Result<Vec<u8>, TranslationError>;

    fn wasm_to_wast(&self, wasm: &[u8]) -> Result<String, TranslationError>;
}
