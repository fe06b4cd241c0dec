//! # SC-01 Block Structure Benchmarks
//!
//! Hot paths of block validation:
//! - Merkle roots over 16 to 4096 leaves
//! - Lock conflict detection for wide cycles
//! - Whole-plan validation, sequential against the rayon pool
//! - Canonical encode and checked decode of a full block
//! - Header id and signee recovery

use crate::fixtures::{transfer, transfer_shard};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use sc_01_block_structure::algorithms::plan_validator::check_cycles;
use sc_01_block_structure::{
    merkle_root, validate_cycle, BlockAssembler, RegionSummary, ShardLock, ShardSummary,
    SignedBlock,
};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{BlockId, BlockTimestamp, Digest, Encode, Name};

/// Shard `index` of a cycle: eight private write locks plus eight read locks
/// shared with every other shard.
fn wide_shard(index: u64) -> ShardSummary {
    let write = (0..8).map(|i| ShardLock::new(Name::from_u64(1_000 + index), Name::from_u64(i)));
    let read = (0..8).map(|i| ShardLock::new(Name::from_u64(1), Name::from_u64(i)));
    ShardSummary::from_unsorted(read.collect(), write.collect(), vec![])
}

fn wide_cycle(shards: u64) -> Vec<ShardSummary> {
    (0..shards).map(wide_shard).collect()
}

pub fn bench_merkle_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-01-merkle-root");

    for size in [16usize, 256, 4096] {
        let leaves: Vec<Digest> = (0..size)
            .map(|i| Digest::hash(&(i as u64).to_le_bytes()))
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("leaves", size), &leaves, |b, leaves| {
            b.iter(|| black_box(merkle_root(leaves)))
        });
    }

    group.finish();
}

pub fn bench_lock_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-01-lock-validation");

    for shards in [16u64, 64, 256] {
        let cycle = wide_cycle(shards);
        group.throughput(Throughput::Elements(shards * 16));
        group.bench_with_input(BenchmarkId::new("shards", shards), &cycle, |b, cycle| {
            b.iter(|| black_box(validate_cycle(0, 0, cycle).is_ok()))
        });
    }

    group.finish();
}

pub fn bench_plan_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-01-plan-validation");

    let regions: Vec<RegionSummary> = (0..4u16)
        .map(|region| RegionSummary {
            region,
            cycles_summary: (0..32).map(|_| wide_cycle(32)).collect(),
        })
        .collect();

    group.bench_function("sequential", |b| {
        b.iter(|| black_box(check_cycles(&regions, false).is_ok()))
    });
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(check_cycles(&regions, true).is_ok()))
    });

    group.finish();
}

fn full_block(transfers: usize) -> SignedBlock {
    let trxs: Vec<_> = (0..transfers)
        .map(|i| transfer("alice", "bob", i as u64 + 1, 0))
        .collect();
    // Every transfer touches alice: one shard per cycle
    let cycles = trxs.iter().map(|t| vec![transfer_shard(&[t])]).collect();
    let regions = vec![RegionSummary {
        region: 0,
        cycles_summary: cycles,
    }];

    BlockAssembler::new(BlockId::zero(), BlockTimestamp::new(1), Name::from_u64(42))
        .with_regions(regions)
        .with_input_transactions(trxs)
        .assemble(&Secp256k1KeyPair::generate())
        .expect("benchmark block assembles")
}

pub fn bench_block_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-01-block-codec");
    let block = full_block(64);
    let bytes = block.to_bytes();

    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("encode", |b| b.iter(|| black_box(block.to_bytes())));
    group.bench_function("decode_checked", |b| {
        b.iter(|| black_box(SignedBlock::decode_checked(&bytes).is_ok()))
    });

    group.finish();
}

pub fn bench_header_identity(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-01-header-identity");
    let block = full_block(1);
    let header = block.signed_header();

    group.bench_function("id", |b| b.iter(|| black_box(header.id())));
    group.bench_function("signee", |b| b.iter(|| black_box(header.signee().is_ok())));

    group.finish();
}
