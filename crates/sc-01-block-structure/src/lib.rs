//! # SC-01: Block Structure Subsystem
//!
//! Block records, identity and validation for a sharded chain. A block
//! carries an execution plan of regions, each a sequence of cycles, each a
//! set of shards that run in parallel under declared read/write locks.
//!
//! ## Architecture
//!
//! - **Domain**: Header, plan summary and trace records; lock and schedule
//!   value objects; structural invariants
//! - **Algorithms**: Merkle roots, lock conflict detection, plan validation
//! - **Ports**: Inbound (BlockStructureApi) and Outbound (TransactionExecutor,
//!   WasmTranslator)
//! - **Application**: Block assembly and service orchestration
//!
//! ## Commitments
//!
//! | Root | Leaves |
//! |------|--------|
//! | `transaction_mroot` | transaction ids, region → cycle → shard → receipt |
//! | `action_mroot` | per-shard roots over action digests, same order |
//! | `block_mroot` | caller-supplied `BlockRootInputs` |

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use algorithms::{merkle_root, validate_cycle, validate_plan, MerkleProof};
pub use application::{BlockAssembler, BlockStructureService};
pub use config::{BlockStructureConfig, ConfigError};
pub use domain::entities::*;
pub use domain::errors::{BlockError, ExecutionError, TranslationError};
pub use domain::value_objects::*;
pub use ports::inbound::{BlockStructureApi, ProduceBlockRequest, ProducedBlock, ValidationContext};
pub use ports::outbound::{ShardExecution, TransactionExecutor, WasmTranslator};
