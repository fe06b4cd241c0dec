//! # Shared Types Crate
//!
//! Records and encoding shared by every Shardchain crate.
//!
//! ## Contents
//!
//! - **codec**: the canonical binary encoding (`Encode`/`Decode`), used as
//!   wire form and digest input
//! - **digest**: `Digest` (SHA-256) and `BlockId` (digest with embedded height)
//! - **name**: 64-bit packed account/scope/action names
//! - **timestamp**: 500 ms block slots
//! - **entities**: transactions, receipts and execution traces
//! - **payloads**: sample action payloads (native currency transfer)

pub mod codec;
pub mod digest;
pub mod entities;
pub mod errors;
pub mod name;
pub mod payloads;
pub mod timestamp;

pub use codec::{Decode, Encode, EncodeSink};
pub use digest::{BlockId, Digest, TransactionId};
pub use entities::*;
pub use errors::*;
pub use name::{AccountName, ActionName, Name, PermissionName, ScopeName};
pub use timestamp::BlockTimestamp;

pub use shared_crypto::{RecoverableSignature as Signature, Secp256k1PublicKey as PublicKey};
