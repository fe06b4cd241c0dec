//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::{BlockTrace, RegionSummary, RegionTrace, SignedBlock};
use crate::domain::errors::BlockError;
use crate::domain::value_objects::{BlockRootInputs, ProducerScheduleChange};
use async_trait::async_trait;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{AccountName, BlockId, BlockTimestamp, PublicKey, SignedTransaction};

/// Everything a producer decides before execution.
#[derive(Debug, Clone, Default)]
pub struct ProduceBlockRequest {
    pub previous: BlockId,
    pub timestamp: BlockTimestamp,
    pub producer: AccountName,
    pub new_producers: Option<ProducerScheduleChange>,
    pub regions: Vec<RegionSummary>,
    pub input_transactions: Vec<SignedTransaction>,
    pub block_roots: BlockRootInputs,
}

/// A signed block together with the traces its execution produced.
#[derive(Debug, Clone)]
pub struct ProducedBlock {
    pub block: SignedBlock,
    pub region_traces: Vec<RegionTrace>,
}

impl ProducedBlock {
    pub fn trace(&self) -> BlockTrace<'_> {
        BlockTrace::with_traces(&self.block, self.region_traces.clone())
    }
}

/// What a validator knows independently of the block under test.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Key of the producer scheduled for this slot
    pub expected_signee: PublicKey,
    /// Local head; `None` skips the parent check (e.g. for genesis successors
    /// fetched out of band)
    pub parent: Option<BlockId>,
    pub block_roots: BlockRootInputs,
}

/// Primary block structure API
#[async_trait]
pub trait BlockStructureApi: Send + Sync {
    /// Validate, execute, commit and sign a new block.
    ///
    /// A plan that fails validation is never executed or signed.
    async fn produce_block(
        &self,
        request: ProduceBlockRequest,
        key: &Secp256k1KeyPair,
    ) -> Result<ProducedBlock, BlockError>;

    /// Fail-closed validation of a received block. Returns its id.
    ///
    /// Covers everything checkable without execution: schedule encoding,
    /// limits, lock sets, conflicts, transaction coverage, transaction and
    /// block roots, parent linkage and the producer signature.
    fn validate_block(
        &self,
        block: &SignedBlock,
        context: &ValidationContext,
    ) -> Result<BlockId, BlockError>;

    /// Execute a validated block and check its action root.
    async fn apply_block<'a>(&self, block: &'a SignedBlock) -> Result<BlockTrace<'a>, BlockError>;
}
