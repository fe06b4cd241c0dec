//! # Block Assembly
//!
//! Builds and signs a block from a plan that has already been executed.
//! The plan is validated before anything is signed, so an assembler never
//! emits a block its own validator would reject on structure.

use crate::algorithms::plan_validator::validate_plan;
use crate::config::BlockStructureConfig;
use crate::domain::entities::{
    BlockHeader, RegionSummary, SignedBlock, SignedBlockHeader, SignedBlockSummary,
};
use crate::domain::errors::BlockError;
use crate::domain::value_objects::{BlockRootInputs, ProducerScheduleChange};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{AccountName, BlockId, BlockTimestamp, Digest, SignedTransaction};

/// Builder for a signed block.
#[derive(Debug, Clone)]
pub struct BlockAssembler {
    previous: BlockId,
    timestamp: BlockTimestamp,
    producer: AccountName,
    new_producers: Option<ProducerScheduleChange>,
    regions: Vec<RegionSummary>,
    input_transactions: Vec<SignedTransaction>,
    block_roots: BlockRootInputs,
    action_mroot: Digest,
    config: BlockStructureConfig,
}

impl BlockAssembler {
    pub fn new(previous: BlockId, timestamp: BlockTimestamp, producer: AccountName) -> Self {
        Self {
            previous,
            timestamp,
            producer,
            new_producers: None,
            regions: Vec::new(),
            input_transactions: Vec::new(),
            block_roots: BlockRootInputs::default(),
            action_mroot: Digest::zero(),
            config: BlockStructureConfig::default(),
        }
    }

    pub fn with_new_producers(mut self, change: Option<ProducerScheduleChange>) -> Self {
        self.new_producers = change;
        self
    }

    pub fn with_regions(mut self, regions: Vec<RegionSummary>) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_input_transactions(mut self, transactions: Vec<SignedTransaction>) -> Self {
        self.input_transactions = transactions;
        self
    }

    /// Leaves committed to by `block_mroot`.
    pub fn with_block_roots(mut self, block_roots: BlockRootInputs) -> Self {
        self.block_roots = block_roots;
        self
    }

    /// Root over the action digests produced by executing the plan.
    pub fn with_action_mroot(mut self, action_mroot: Digest) -> Self {
        self.action_mroot = action_mroot;
        self
    }

    pub fn with_config(mut self, config: BlockStructureConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate, commit and sign.
    pub fn assemble(self, key: &Secp256k1KeyPair) -> Result<SignedBlock, BlockError> {
        if let Some(change) = &self.new_producers {
            change.validate()?;
        }
        validate_plan(&self.regions, &self.input_transactions, &self.config)?;

        let header = BlockHeader {
            previous: self.previous,
            timestamp: self.timestamp,
            transaction_mroot: Digest::zero(),
            action_mroot: self.action_mroot,
            block_mroot: self.block_roots.root(),
            producer: self.producer,
            new_producers: self.new_producers,
        };

        let mut block = SignedBlock {
            summary: SignedBlockSummary {
                signed_header: SignedBlockHeader::new(header),
                regions: self.regions,
            },
            input_transactions: self.input_transactions,
        };

        block.summary.signed_header.header.transaction_mroot =
            block.calculate_transaction_merkle_root()?;
        block.summary.signed_header.sign(key)?;

        Ok(block)
    }
}
