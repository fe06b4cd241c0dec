//! # Shardchain Benchmarks
//!
//! Benchmark bodies per subsystem, driven from `benches/`.

pub mod sc_01_block_structure;
