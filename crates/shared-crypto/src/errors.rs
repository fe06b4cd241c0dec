//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Bytes do not encode a point on secp256k1
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Secret scalar is zero or not below the curve order
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// r or s is not a valid scalar
    #[error("Invalid signature")]
    InvalidSignature,

    /// Recovery byte is outside 0..=3
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Public key recovery did not produce a curve point
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}
