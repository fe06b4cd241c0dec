//! # Shared Crypto - Block Signing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Header digests, transaction ids, merkle nodes |
//! | `ecdsa` | secp256k1 (recoverable) | Producer signatures, signee recovery |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S signatures, public key
//!   recovery from a 65-byte compact signature
//! - **SHA-256**: the only hash used for consensus-visible digests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{RecoverableSignature, Secp256k1KeyPair, Secp256k1PublicKey};
pub use errors::CryptoError;
pub use hashing::{sha256, sha256_many, Hash, Sha256Hasher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
