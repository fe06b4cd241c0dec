//! # Shardchain Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # In-memory currency ledger, transfer and chain helpers
//! ├── benchmarks/       # Criterion benchmark bodies per subsystem
//! │   └── sc_01_block_structure.rs
//! │
//! └── integration/      # Cross-node block flows
//!     ├── flows.rs      # produce → gossip → validate → apply
//!     └── tamper.rs     # altered blocks are rejected whole
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sc-tests
//!
//! # By category
//! cargo test -p sc-tests integration::flows
//! cargo test -p sc-tests integration::tamper
//!
//! # Benchmarks
//! cargo bench -p sc-tests
//! ```

pub mod benchmarks;
