//! # Tampered Block Rejection
//!
//! Each test takes a block an honest producer signed, alters it the way a
//! faulty or malicious peer might, and checks the validator rejects the whole
//! block with the expected error.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::fixtures::{
        balance_lock, name, transfer, transfer_shard, ChainFixture, CurrencyLedger,
    };
    use sc_01_block_structure::{
        BlockAssembler, BlockError, BlockStructureApi, BlockStructureService, LockKind,
        ProduceBlockRequest, ProducerChange, ProducerScheduleChange, RegionSummary, RootKind,
        ShardSummary, SignedBlock, ValidationContext,
    };
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{BlockId, BlockTimestamp, CodecError, Digest, Encode, TransactionReceipt};

    fn service() -> BlockStructureService {
        BlockStructureService::new(Arc::new(CurrencyLedger::with_balances(&[
            ("alice", 100),
            ("bob", 100),
        ])))
    }

    fn context(chain: &ChainFixture) -> ValidationContext {
        ValidationContext {
            expected_signee: chain.key.public_key(),
            parent: Some(chain.head()),
            block_roots: chain.block_roots(),
        }
    }

    /// Honest block: two transfers in one shard, one in a parallel shard.
    async fn honest_block(chain: &ChainFixture) -> SignedBlock {
        let t1 = transfer("alice", "carol", 1, 0);
        let t2 = transfer("alice", "dave", 2, 0);
        let t3 = transfer("bob", "erin", 3, 0);

        let request = ProduceBlockRequest {
            previous: chain.head(),
            timestamp: BlockTimestamp::new(1),
            producer: chain.producer,
            regions: vec![RegionSummary {
                region: 0,
                cycles_summary: vec![vec![transfer_shard(&[&t1, &t2]), transfer_shard(&[&t3])]],
            }],
            input_transactions: vec![t1, t2, t3],
            block_roots: chain.block_roots(),
            ..Default::default()
        };

        service()
            .produce_block(request, &chain.key)
            .await
            .expect("honest block")
            .block
    }

    #[tokio::test]
    async fn test_honest_block_accepted() {
        let chain = ChainFixture::new();
        let block = honest_block(&chain).await;
        assert!(service().validate_block(&block, &context(&chain)).is_ok());
    }

    #[tokio::test]
    async fn test_reordered_receipts_rejected() {
        let chain = ChainFixture::new();
        let mut block = honest_block(&chain).await;
        block.summary.regions[0].cycles_summary[0][0]
            .transactions
            .swap(0, 1);

        assert!(matches!(
            service().validate_block(&block, &context(&chain)),
            Err(BlockError::RootMismatch { root: RootKind::Transaction, .. })
        ));
    }

    #[tokio::test]
    async fn test_resigned_by_other_key_rejected() {
        let chain = ChainFixture::new();
        let mut block = honest_block(&chain).await;
        let impostor = Secp256k1KeyPair::generate();
        block.summary.signed_header.sign(&impostor).unwrap();

        assert!(matches!(
            service().validate_block(&block, &context(&chain)),
            Err(BlockError::SignatureMismatch { actual, .. }) if actual == impostor.public_key()
        ));
    }

    #[tokio::test]
    async fn test_edited_header_breaks_signature() {
        let chain = ChainFixture::new();
        let mut block = honest_block(&chain).await;
        block.summary.signed_header.header.timestamp = BlockTimestamp::new(2);

        assert!(service().validate_block(&block, &context(&chain)).is_err());
    }

    #[tokio::test]
    async fn test_injected_conflicting_shard_rejected() {
        let chain = ChainFixture::new();
        let mut block = honest_block(&chain).await;
        block.summary.regions[0].cycles_summary[0].push(ShardSummary {
            read_locks: vec![balance_lock("bob")],
            ..Default::default()
        });

        assert_eq!(
            service().validate_block(&block, &context(&chain)),
            Err(BlockError::LockConflict {
                region: 0,
                cycle_index: 0,
                shard_a: 1,
                shard_b: 2,
                lock: balance_lock("bob"),
            })
        );
    }

    #[tokio::test]
    async fn test_conflicting_block_leaves_ledger_untouched() {
        let chain = ChainFixture::new();
        let mut block = honest_block(&chain).await;
        let extra = transfer("alice", "frank", 4, 0);
        block.summary.regions[0].cycles_summary[0].push(transfer_shard(&[&extra]));
        block.input_transactions.push(extra);

        let ledger = Arc::new(CurrencyLedger::with_balances(&[("alice", 100), ("bob", 100)]));
        let before = ledger.snapshot();
        let validator = BlockStructureService::new(ledger.clone());

        assert_eq!(
            validator.apply_block(&block).await.err(),
            Some(BlockError::LockConflict {
                region: 0,
                cycle_index: 0,
                shard_a: 0,
                shard_b: 2,
                lock: balance_lock("alice"),
            })
        );
        assert_eq!(ledger.snapshot(), before);
    }

    #[tokio::test]
    async fn test_unsorted_locks_rejected_on_decode() {
        let chain = ChainFixture::new();
        let mut block = honest_block(&chain).await;
        block.summary.regions[0].cycles_summary[0][0]
            .write_locks
            .reverse();

        assert!(matches!(
            SignedBlock::decode_checked(&block.to_bytes()),
            Err(BlockError::UnsortedLockSet { kind: LockKind::Write, shard_index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_unsorted_schedule_rejected_on_decode() {
        let chain = ChainFixture::new();
        let mut block = honest_block(&chain).await;
        block.summary.signed_header.header.new_producers = Some(
            ProducerScheduleChange::new(vec![
                ProducerChange::new(name("old1"), name("new1")),
                ProducerChange::new(name("old2"), name("new2")),
            ])
            .unwrap(),
        );

        // Swap the two incoming names in the encoded header
        let mut bytes = block.to_bytes();
        let first = name("new1").as_u64().to_le_bytes();
        let second = name("new2").as_u64().to_le_bytes();
        let at = |needle: &[u8; 8], hay: &[u8]| {
            hay.windows(8).position(|w| w == needle).expect("name in encoding")
        };
        let (i, j) = (at(&first, &bytes), at(&second, &bytes));
        bytes[i..i + 8].copy_from_slice(&second);
        bytes[j..j + 8].copy_from_slice(&first);

        assert_eq!(
            SignedBlock::decode_checked(&bytes),
            Err(BlockError::UnsortedSchedule { index: 1 })
        );
    }

    #[tokio::test]
    async fn test_truncated_bytes_rejected() {
        let chain = ChainFixture::new();
        let bytes = honest_block(&chain).await.to_bytes();

        assert!(matches!(
            SignedBlock::decode_checked(&bytes[..bytes.len() - 1]),
            Err(BlockError::MalformedRecord(CodecError::UnexpectedEof))
        ));
    }

    #[tokio::test]
    async fn test_smuggled_transaction_rejected() {
        let chain = ChainFixture::new();
        let mut block = honest_block(&chain).await;
        block.input_transactions.push(transfer("bob", "mallory", 50, 0));

        assert!(matches!(
            service().validate_block(&block, &context(&chain)),
            Err(BlockError::InvalidPlan { .. })
        ));
    }

    #[tokio::test]
    async fn test_dropped_body_rejected() {
        let chain = ChainFixture::new();
        let mut block = honest_block(&chain).await;
        block.input_transactions.pop();

        assert!(matches!(
            service().validate_block(&block, &context(&chain)),
            Err(BlockError::InvalidPlan { .. })
        ));
    }

    #[tokio::test]
    async fn test_claimed_id_with_wrong_height_rejected() {
        let chain = ChainFixture::new();
        let block = honest_block(&chain).await;
        let claimed = BlockId::make(7, Digest(block.id().0));

        assert_eq!(
            block.signed_header().validate_id(&claimed),
            Err(BlockError::HeightMismatch {
                expected: 1,
                actual: 7
            })
        );
        assert!(block.signed_header().validate_id(&block.id()).is_ok());
    }

    #[tokio::test]
    async fn test_block_on_unknown_parent_rejected() {
        let chain = ChainFixture::new();
        let block = honest_block(&chain).await;

        // Validator has moved on; the same block no longer extends its head
        let mut ctx = context(&chain);
        ctx.parent = Some(block.id());
        assert_eq!(
            service().validate_block(&block, &ctx),
            Err(BlockError::UnknownParent {
                expected: block.id(),
                actual: chain.head(),
            })
        );
    }

    #[tokio::test]
    async fn test_forged_action_root_caught_on_apply() {
        let chain = ChainFixture::new();
        let trx = transfer("alice", "bob", 5, 0);
        let regions = vec![RegionSummary {
            region: 0,
            cycles_summary: vec![vec![ShardSummary {
                write_locks: vec![balance_lock("alice"), balance_lock("bob")],
                transactions: vec![TransactionReceipt::executed(trx.id())],
                ..Default::default()
            }]],
        }];

        // Structurally sound and correctly signed, but commits to effects
        // that execution does not produce
        let block = BlockAssembler::new(chain.head(), BlockTimestamp::new(1), chain.producer)
            .with_regions(regions)
            .with_input_transactions(vec![trx])
            .with_action_mroot(Digest::hash(b"forged effects"))
            .assemble(&chain.key)
            .unwrap();

        let validator = service();
        assert!(validator.validate_block(&block, &context(&chain)).is_ok());
        assert!(matches!(
            validator.apply_block(&block).await,
            Err(BlockError::RootMismatch { root: RootKind::Action, .. })
        ));
    }
}
