//! # Block Records
//!
//! Header, plan summary and trace types. A block's identity is fixed by its
//! signed header, which commits to the plan through `transaction_mroot` and to
//! execution results through `action_mroot`.
//!
//! All records encode their fields in declaration order with the canonical
//! codec from `shared-types`.

use super::errors::BlockError;
use super::invariants::check_decoded_block;
use super::value_objects::{ProducerChange, ProducerScheduleChange, RootKind, ShardLock};
use crate::algorithms::merkle::merkle_root;
use serde::{Deserialize, Serialize};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{
    AccountName, BlockId, BlockTimestamp, CodecError, Decode, Digest, Encode, EncodeSink,
    PublicKey, Signature, SignedTransaction, TransactionId, TransactionReceipt, TransactionTrace,
};
use std::collections::HashMap;

// =============================================================================
// HEADER
// =============================================================================

/// Unsigned block header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Id of the parent block
    pub previous: BlockId,
    pub timestamp: BlockTimestamp,
    /// Merkle root over included transaction ids in plan order
    pub transaction_mroot: Digest,
    /// Merkle root over emitted action digests in plan order
    pub action_mroot: Digest,
    /// Merkle root over caller-supplied [`BlockRootInputs`](super::value_objects::BlockRootInputs)
    pub block_mroot: Digest,
    pub producer: AccountName,
    pub new_producers: Option<ProducerScheduleChange>,
}

impl BlockHeader {
    /// Digest the producer signs: hash of the header encoding.
    pub fn digest(&self) -> Digest {
        Digest::of(self)
    }

    /// Height embedded in the leading four bytes of a block id.
    pub fn num_from_id(id: &BlockId) -> u32 {
        id.num()
    }

    /// One more than the parent's embedded height.
    pub fn block_num(&self) -> u32 {
        Self::num_from_id(&self.previous).wrapping_add(1)
    }

    /// Check this header extends `parent`.
    pub fn validate_parent(&self, parent: &BlockId) -> Result<(), BlockError> {
        if self.previous != *parent {
            return Err(BlockError::UnknownParent {
                expected: *parent,
                actual: self.previous,
            });
        }

        let parent_num = Self::num_from_id(parent);
        let expected = parent_num
            .checked_add(1)
            .ok_or(BlockError::HeightOverflow { parent: parent_num })?;
        if expected != self.block_num() {
            return Err(BlockError::HeightMismatch {
                expected,
                actual: self.block_num(),
            });
        }
        Ok(())
    }
}

/// Header plus the producer's recoverable signature over [`BlockHeader::digest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBlockHeader {
    pub header: BlockHeader,
    pub producer_signature: Signature,
}

impl SignedBlockHeader {
    /// Wrap an unsigned header with an empty signature.
    pub fn new(header: BlockHeader) -> Self {
        Self {
            header,
            producer_signature: Signature::default(),
        }
    }

    pub fn digest(&self) -> Digest {
        self.header.digest()
    }

    pub fn block_num(&self) -> u32 {
        self.header.block_num()
    }

    /// Block id: hash of the signed header with the height written over its
    /// leading four bytes.
    pub fn id(&self) -> BlockId {
        BlockId::make(self.block_num(), Digest::of(self))
    }

    pub fn sign(&mut self, key: &Secp256k1KeyPair) -> Result<(), BlockError> {
        self.producer_signature = key.sign_prehash(self.digest().as_bytes())?;
        Ok(())
    }

    /// Public key recovered from the signature.
    pub fn signee(&self) -> Result<PublicKey, BlockError> {
        Ok(self.producer_signature.recover(self.digest().as_bytes())?)
    }

    pub fn validate_signee(&self, expected: &PublicKey) -> Result<(), BlockError> {
        let actual = self.signee()?;
        if actual != *expected {
            return Err(BlockError::SignatureMismatch {
                expected: *expected,
                actual,
            });
        }
        Ok(())
    }

    /// Check an id received alongside this header.
    pub fn validate_id(&self, claimed: &BlockId) -> Result<(), BlockError> {
        if claimed.num() != self.block_num() {
            return Err(BlockError::HeightMismatch {
                expected: self.block_num(),
                actual: claimed.num(),
            });
        }

        let actual = self.id();
        if actual != *claimed {
            return Err(BlockError::RootMismatch {
                root: RootKind::BlockId,
                expected: Digest(claimed.0),
                actual: Digest(actual.0),
            });
        }
        Ok(())
    }

    /// Decode a header and check its producer schedule change.
    pub fn decode_checked(bytes: &[u8]) -> Result<Self, BlockError> {
        let header = Self::from_bytes(bytes)?;
        if let Some(change) = &header.header.new_producers {
            change.validate()?;
        }
        Ok(header)
    }
}

// =============================================================================
// PLAN SUMMARY
// =============================================================================

/// One shard of a cycle: its declared locks and the receipts it executes.
///
/// Both lock lists are strictly ascending. A shard may read and write the
/// same lock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardSummary {
    pub read_locks: Vec<ShardLock>,
    pub write_locks: Vec<ShardLock>,
    pub transactions: Vec<TransactionReceipt>,
}

impl ShardSummary {
    /// Build a shard from lock claims in any order. Duplicates collapse.
    pub fn from_unsorted(
        mut read_locks: Vec<ShardLock>,
        mut write_locks: Vec<ShardLock>,
        transactions: Vec<TransactionReceipt>,
    ) -> Self {
        read_locks.sort_unstable();
        read_locks.dedup();
        write_locks.sort_unstable();
        write_locks.dedup();

        Self {
            read_locks,
            write_locks,
            transactions,
        }
    }
}

/// Shards that run in parallel.
pub type Cycle = Vec<ShardSummary>;

/// Cycles of one region, run in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: u16,
    pub cycles_summary: Vec<Cycle>,
}

impl RegionSummary {
    pub fn receipts(&self) -> impl Iterator<Item = &TransactionReceipt> {
        self.cycles_summary
            .iter()
            .flatten()
            .flat_map(|shard| shard.transactions.iter())
    }
}

/// Signed header plus the execution plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBlockSummary {
    pub signed_header: SignedBlockHeader,
    pub regions: Vec<RegionSummary>,
}

impl SignedBlockSummary {
    /// Receipts in plan order: region, cycle, shard, receipt.
    pub fn receipts(&self) -> impl Iterator<Item = &TransactionReceipt> {
        self.regions.iter().flat_map(RegionSummary::receipts)
    }

    pub fn transaction_count(&self) -> usize {
        self.receipts().count()
    }

    /// Merkle root over receipt ids in plan order.
    pub fn calculate_transaction_mroot(&self) -> Digest {
        let ids: Vec<TransactionId> = self.receipts().map(|receipt| receipt.id).collect();
        merkle_root(&ids)
    }

    pub fn id(&self) -> BlockId {
        self.signed_header.id()
    }
}

/// Summary plus the bodies of every scheduled transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBlock {
    pub summary: SignedBlockSummary,
    pub input_transactions: Vec<SignedTransaction>,
}

impl SignedBlock {
    pub fn header(&self) -> &BlockHeader {
        &self.summary.signed_header.header
    }

    pub fn signed_header(&self) -> &SignedBlockHeader {
        &self.summary.signed_header
    }

    pub fn regions(&self) -> &[RegionSummary] {
        &self.summary.regions
    }

    pub fn id(&self) -> BlockId {
        self.summary.id()
    }

    pub fn block_num(&self) -> u32 {
        self.header().block_num()
    }

    /// Input transactions keyed by recomputed id.
    pub fn transactions_by_id(&self) -> HashMap<TransactionId, &SignedTransaction> {
        self.input_transactions
            .iter()
            .map(|trx| (trx.id(), trx))
            .collect()
    }

    /// Merkle root over the recomputed ids of the bodies each receipt names,
    /// in plan order.
    pub fn calculate_transaction_merkle_root(&self) -> Result<Digest, BlockError> {
        let bodies = self.transactions_by_id();
        let ids = self
            .summary
            .receipts()
            .map(|receipt| {
                bodies.get(&receipt.id).map(|trx| trx.id()).ok_or_else(|| {
                    BlockError::invalid_plan(format!(
                        "receipt {} has no input transaction",
                        receipt.id
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(merkle_root(&ids))
    }

    /// Decode a block and check the invariants any well-formed block holds.
    pub fn decode_checked(bytes: &[u8]) -> Result<Self, BlockError> {
        let block = Self::from_bytes(bytes)?;
        check_decoded_block(&block)?;
        Ok(block)
    }
}

// =============================================================================
// TRACES
// =============================================================================

/// Execution results of one shard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTrace {
    /// Merkle root over the digests of every action trace in the shard
    pub shard_root: Digest,
    pub transaction_traces: Vec<TransactionTrace>,
}

impl ShardTrace {
    pub fn append(&mut self, trace: TransactionTrace) {
        self.transaction_traces.push(trace);
    }

    /// Compute and store `shard_root`. Call once, after the last `append`.
    pub fn calculate_root(&mut self) -> Digest {
        let digests: Vec<Digest> = self
            .transaction_traces
            .iter()
            .flat_map(|trx| trx.action_traces.iter())
            .map(|action| action.digest())
            .collect();
        self.shard_root = merkle_root(&digests);
        self.shard_root
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTrace {
    pub shard_traces: Vec<ShardTrace>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTrace {
    pub cycle_traces: Vec<CycleTrace>,
}

/// Merkle root over stored shard roots, in region, cycle, shard order.
pub fn action_merkle_root(region_traces: &[RegionTrace]) -> Digest {
    let roots: Vec<Digest> = region_traces
        .iter()
        .flat_map(|region| region.cycle_traces.iter())
        .flat_map(|cycle| cycle.shard_traces.iter())
        .map(|shard| shard.shard_root)
        .collect();
    merkle_root(&roots)
}

/// Execution results of a whole block.
///
/// Borrows the block it was produced from and cannot outlive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTrace<'a> {
    pub block: &'a SignedBlock,
    pub region_traces: Vec<RegionTrace>,
}

impl<'a> BlockTrace<'a> {
    pub fn new(block: &'a SignedBlock) -> Self {
        Self {
            block,
            region_traces: Vec::new(),
        }
    }

    pub fn with_traces(block: &'a SignedBlock, region_traces: Vec<RegionTrace>) -> Self {
        Self {
            block,
            region_traces,
        }
    }

    pub fn calculate_action_merkle_root(&self) -> Digest {
        action_merkle_root(&self.region_traces)
    }

    /// Decode traces previously encoded for `block`.
    pub fn decode_for(block: &'a SignedBlock, bytes: &[u8]) -> Result<Self, BlockError> {
        let region_traces = Vec::<RegionTrace>::from_bytes(bytes)?;
        Ok(Self::with_traces(block, region_traces))
    }
}

// -----------------------------------------------------------------------------
// Canonical codec
// -----------------------------------------------------------------------------

impl Encode for ShardLock {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.account.encode(out);
        self.scope.encode(out);
    }
}

impl Decode for ShardLock {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            account: Decode::decode(input)?,
            scope: Decode::decode(input)?,
        })
    }
}

impl Encode for ProducerChange {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.outgoing.encode(out);
        self.incoming.encode(out);
    }
}

impl Decode for ProducerChange {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            outgoing: Decode::decode(input)?,
            incoming: Decode::decode(input)?,
        })
    }
}

impl Encode for ProducerScheduleChange {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        // Same layout as Vec<ProducerChange>
        let changes = self.changes();
        shared_types::codec::encode_varint(changes.len() as u32, out);
        for change in changes {
            change.encode(out);
        }
    }
}

impl Decode for ProducerScheduleChange {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self::from_unchecked(Decode::decode(input)?))
    }
}

impl Encode for BlockHeader {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.previous.encode(out);
        self.timestamp.encode(out);
        self.transaction_mroot.encode(out);
        self.action_mroot.encode(out);
        self.block_mroot.encode(out);
        self.producer.encode(out);
        self.new_producers.encode(out);
    }
}

impl Decode for BlockHeader {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            previous: Decode::decode(input)?,
            timestamp: Decode::decode(input)?,
            transaction_mroot: Decode::decode(input)?,
            action_mroot: Decode::decode(input)?,
            block_mroot: Decode::decode(input)?,
            producer: Decode::decode(input)?,
            new_producers: Decode::decode(input)?,
        })
    }
}

impl Encode for SignedBlockHeader {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.header.encode(out);
        self.producer_signature.encode(out);
    }
}

impl Decode for SignedBlockHeader {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            header: Decode::decode(input)?,
            producer_signature: Decode::decode(input)?,
        })
    }
}

impl Encode for ShardSummary {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.read_locks.encode(out);
        self.write_locks.encode(out);
        self.transactions.encode(out);
    }
}

impl Decode for ShardSummary {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            read_locks: Decode::decode(input)?,
            write_locks: Decode::decode(input)?,
            transactions: Decode::decode(input)?,
        })
    }
}

impl Encode for RegionSummary {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.region.encode(out);
        self.cycles_summary.encode(out);
    }
}

impl Decode for RegionSummary {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            region: Decode::decode(input)?,
            cycles_summary: Decode::decode(input)?,
        })
    }
}

impl Encode for SignedBlockSummary {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.signed_header.encode(out);
        self.regions.encode(out);
    }
}

impl Decode for SignedBlockSummary {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            signed_header: Decode::decode(input)?,
            regions: Decode::decode(input)?,
        })
    }
}

impl Encode for SignedBlock {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.summary.encode(out);
        self.input_transactions.encode(out);
    }
}

impl Decode for SignedBlock {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            summary: Decode::decode(input)?,
            input_transactions: Decode::decode(input)?,
        })
    }
}

impl Encode for ShardTrace {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.shard_root.encode(out);
        self.transaction_traces.encode(out);
    }
}

impl Decode for ShardTrace {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            shard_root: Decode::decode(input)?,
            transaction_traces: Decode::decode(input)?,
        })
    }
}

impl Encode for CycleTrace {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.shard_traces.encode(out);
    }
}

impl Decode for CycleTrace {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            shard_traces: Decode::decode(input)?,
        })
    }
}

impl Encode for RegionTrace {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.cycle_traces.encode(out);
    }
}

impl Decode for RegionTrace {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            cycle_traces: Decode::decode(input)?,
        })
    }
}

impl Encode for BlockTrace<'_> {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.region_traces.encode(out);
    }
}
