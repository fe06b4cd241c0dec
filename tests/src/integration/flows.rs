//! # Block Lifecycle Flows
//!
//! A producer and an independent validator, each with its own ledger, agree
//! on blocks exchanged as canonical bytes:
//!
//! 1. **Produce**: plan → execute → roots → sign
//! 2. **Gossip**: encode, decode with structural checks
//! 3. **Validate**: plan, roots, parent, signature
//! 4. **Apply**: re-execute and match the action root

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::fixtures::{
        balance_lock, init_test_logging, name, transfer, transfer_shard, ChainFixture,
        CurrencyLedger,
    };
    use sc_01_block_structure::{
        merkle_root, BlockStructureApi, BlockStructureService, BlockTrace, MerkleProof,
        ProduceBlockRequest, ProducerChange, ProducerScheduleChange, RegionSummary, SignedBlock,
        ValidationContext,
    };
    use shared_types::{BlockTimestamp, Decode, Encode, SignedTransaction};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const GENESIS_BALANCES: &[(&str, u64)] = &[("alice", 100), ("bob", 100), ("carol", 100)];

    fn node() -> (Arc<CurrencyLedger>, BlockStructureService) {
        init_test_logging();
        let ledger = Arc::new(CurrencyLedger::with_balances(GENESIS_BALANCES));
        let service = BlockStructureService::new(ledger.clone());
        (ledger, service)
    }

    /// alice→dave and bob→erin in parallel, then carol→alice.
    fn two_cycle_plan(region: u16) -> (Vec<RegionSummary>, Vec<SignedTransaction>) {
        let t1 = transfer("alice", "dave", 10, region);
        let t2 = transfer("bob", "erin", 20, region);
        let t3 = transfer("carol", "alice", 30, region);

        let regions = vec![RegionSummary {
            region,
            cycles_summary: vec![
                vec![transfer_shard(&[&t1]), transfer_shard(&[&t2])],
                vec![transfer_shard(&[&t3])],
            ],
        }];
        (regions, vec![t1, t2, t3])
    }

    fn request(
        chain: &ChainFixture,
        slot: u32,
        regions: Vec<RegionSummary>,
        input_transactions: Vec<SignedTransaction>,
    ) -> ProduceBlockRequest {
        ProduceBlockRequest {
            previous: chain.head(),
            timestamp: BlockTimestamp::new(slot),
            producer: chain.producer,
            new_producers: None,
            regions,
            input_transactions,
            block_roots: chain.block_roots(),
        }
    }

    fn context(chain: &ChainFixture) -> ValidationContext {
        ValidationContext {
            expected_signee: chain.key.public_key(),
            parent: Some(chain.head()),
            block_roots: chain.block_roots(),
        }
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_produce_gossip_validate_apply() {
        let (producer_ledger, producer) = node();
        let (validator_ledger, validator) = node();
        let chain = ChainFixture::new();

        let (regions, trxs) = two_cycle_plan(0);
        let produced = producer
            .produce_block(request(&chain, 1, regions, trxs), &chain.key)
            .await
            .expect("producing a valid plan");

        // Gossip
        let bytes = produced.block.to_bytes();
        let received = SignedBlock::decode_checked(&bytes).expect("canonical bytes decode");
        assert_eq!(received, produced.block);

        let id = validator
            .validate_block(&received, &context(&chain))
            .expect("validator accepts");
        assert_eq!(id, produced.block.id());
        assert_eq!(id.num(), 1);

        let trace = validator.apply_block(&received).await.expect("apply");
        assert_eq!(trace.region_traces, produced.region_traces);

        assert_eq!(validator_ledger.snapshot(), producer_ledger.snapshot());
        assert_eq!(validator_ledger.balance("alice"), 120);
        assert_eq!(validator_ledger.balance("dave"), 10);
        assert_eq!(validator_ledger.balance("erin"), 20);
    }

    #[tokio::test]
    async fn test_chain_of_blocks_links_and_commits_ancestors() {
        let (_, producer) = node();
        let (_, validator) = node();
        let mut chain = ChainFixture::new();

        for height in 1..=3u32 {
            let trx = transfer("alice", "bob", u64::from(height), 0);
            let regions = vec![RegionSummary {
                region: 0,
                cycles_summary: vec![vec![transfer_shard(&[&trx])]],
            }];

            let ctx = context(&chain);
            let produced = producer
                .produce_block(request(&chain, height, regions, vec![trx]), &chain.key)
                .await
                .unwrap();
            let block = produced.block;

            assert_eq!(block.block_num(), height);
            assert_eq!(block.header().previous, chain.head());
            assert_eq!(block.header().block_mroot, merkle_root(&chain.block_roots().leaves));

            let id = validator.validate_block(&block, &ctx).unwrap();
            validator.apply_block(&block).await.unwrap();
            chain.push(id);
        }

        assert_eq!(chain.head().num(), 3);
    }

    #[tokio::test]
    async fn test_multi_region_block() {
        let (_, producer) = node();
        let (validator_ledger, validator) = node();
        let chain = ChainFixture::new();

        let (mut regions, mut trxs) = two_cycle_plan(0);
        let remote = transfer("bob", "frank", 5, 1);
        regions.push(RegionSummary {
            region: 1,
            cycles_summary: vec![vec![transfer_shard(&[&remote])]],
        });
        trxs.push(remote);

        let produced = producer
            .produce_block(request(&chain, 1, regions, trxs), &chain.key)
            .await
            .unwrap();

        validator.validate_block(&produced.block, &context(&chain)).unwrap();
        let trace = validator.apply_block(&produced.block).await.unwrap();

        assert_eq!(trace.region_traces.len(), 2);
        assert_eq!(validator_ledger.balance("frank"), 5);
        assert_eq!(validator_ledger.balance("bob"), 75);
    }

    #[tokio::test]
    async fn test_producer_schedule_change_survives_gossip() {
        let (_, producer) = node();
        let (_, validator) = node();
        let chain = ChainFixture::new();

        let change = ProducerScheduleChange::new(vec![
            ProducerChange::new(name("oldprod1"), name("newprod1")),
            ProducerChange::new(name("oldprod2"), name("newprod2")),
        ])
        .unwrap();

        let mut req = request(&chain, 1, vec![], vec![]);
        req.new_producers = Some(change.clone());
        let produced = producer.produce_block(req, &chain.key).await.unwrap();

        let received = SignedBlock::decode_checked(&produced.block.to_bytes()).unwrap();
        assert_eq!(received.header().new_producers.as_ref(), Some(&change));
        assert!(validator.validate_block(&received, &context(&chain)).is_ok());
    }

    #[tokio::test]
    async fn test_block_trace_round_trip() {
        let (_, producer) = node();
        let chain = ChainFixture::new();
        let (regions, trxs) = two_cycle_plan(0);

        let produced = producer
            .produce_block(request(&chain, 1, regions, trxs), &chain.key)
            .await
            .unwrap();
        let trace = produced.trace();

        let decoded = BlockTrace::decode_for(&produced.block, &trace.to_bytes()).unwrap();
        assert_eq!(decoded, trace);
        assert_eq!(
            decoded.calculate_action_merkle_root(),
            produced.block.header().action_mroot
        );
    }

    #[tokio::test]
    async fn test_single_effect_provable_against_action_root() {
        let (_, producer) = node();
        let chain = ChainFixture::new();
        let (regions, trxs) = two_cycle_plan(0);

        let produced = producer
            .produce_block(request(&chain, 1, regions, trxs), &chain.key)
            .await
            .unwrap();

        // Second cycle holds carol→alice; prove alice's notification
        let shard_roots: Vec<_> = produced
            .region_traces
            .iter()
            .flat_map(|r| r.cycle_traces.iter())
            .flat_map(|c| c.shard_traces.iter())
            .map(|s| s.shard_root)
            .collect();
        let shard = &produced.region_traces[0].cycle_traces[1].shard_traces[0];
        let effects: Vec<_> = shard.transaction_traces[0]
            .action_traces
            .iter()
            .map(|a| a.digest())
            .collect();
        assert_eq!(effects.len(), 3);

        let notification = shard.transaction_traces[0].action_traces[2].clone();
        assert_eq!(notification.receiver, name("alice"));

        let effect_proof = MerkleProof::generate(&effects, 2).unwrap();
        assert!(effect_proof.verify(&notification.digest(), &shard.shard_root));

        let shard_proof = MerkleProof::generate(&shard_roots, 2).unwrap();
        assert!(shard_proof.verify(&shard.shard_root, &produced.block.header().action_mroot));
    }

    #[tokio::test]
    async fn test_same_lock_across_cycles_is_allowed() {
        let (_, producer) = node();
        let chain = ChainFixture::new();

        let t1 = transfer("alice", "bob", 1, 0);
        let t2 = transfer("alice", "bob", 2, 0);
        let regions = vec![RegionSummary {
            region: 0,
            cycles_summary: vec![vec![transfer_shard(&[&t1])], vec![transfer_shard(&[&t2])]],
        }];
        assert_eq!(
            regions[0].cycles_summary[0][0].write_locks,
            vec![balance_lock("alice"), balance_lock("bob")]
        );

        let produced = producer
            .produce_block(request(&chain, 1, regions, vec![t1, t2]), &chain.key)
            .await;
        assert!(produced.is_ok());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let (regions, trxs) = two_cycle_plan(0);
        let block = SignedBlock {
            summary: sc_01_block_structure::SignedBlockSummary {
                regions,
                ..Default::default()
            },
            input_transactions: trxs,
        };

        let bytes = block.to_bytes();
        assert_eq!(bytes.len(), block.encoded_len());
        assert_eq!(SignedBlock::from_bytes(&bytes).unwrap().to_bytes(), bytes);
    }
}
