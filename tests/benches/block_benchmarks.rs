//! # Shardchain Block Structure Benchmarks
//!
//! | Path | Expected cost |
//! |------|---------------|
//! | Merkle root | O(n) hashes |
//! | Cycle lock validation | O(n log k) for n claims over k lock lists |
//! | Plan validation | cycles checked on the rayon pool |
//! | Block decode | linear in encoded size |

use criterion::{criterion_group, criterion_main};
use sc_tests::benchmarks::sc_01_block_structure::{
    bench_block_codec, bench_header_identity, bench_lock_validation, bench_merkle_root,
    bench_plan_validation,
};

criterion_group!(
    benches,
    bench_merkle_root,
    bench_lock_validation,
    bench_plan_validation,
    bench_block_codec,
    bench_header_identity,
);

criterion_main!(benches);
