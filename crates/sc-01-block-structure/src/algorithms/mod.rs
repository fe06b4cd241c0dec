//! Algorithms for Block Structure
//!
//! - Binary merkle root and inclusion proofs
//! - Sorted-merge lock conflict detection
//! - Execution plan validation

pub mod lock_conflict;
pub mod merkle;
pub mod plan_validator;

pub use lock_conflict::validate_cycle;
pub use merkle::{hash_pair, merkle_root, MerkleProof, SiblingSide};
pub use plan_validator::validate_plan;
