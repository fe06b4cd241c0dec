//! # ECDSA Signatures (secp256k1, recoverable)
//!
//! Block producers sign the 32-byte header digest directly (prehash signing);
//! validators never need the producer's key up front because the signing key is
//! recovered from the signature and compared against the expected producer key.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization
//! - Secret key material is zeroized on drop
//!
//! ## Wire Layout
//!
//! - Public key: 33-byte SEC1 compressed point
//! - Signature: `recovery_id (1) || r (32) || s (32)`

use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::fmt;
use zeroize::Zeroize;

/// Length of a compressed public key.
pub const PUBLIC_KEY_LEN: usize = 33;

/// Length of a recoverable signature.
pub const SIGNATURE_LEN: usize = 65;

/// Compressed secp256k1 public key (33 bytes).
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Secp256k1PublicKey(#[serde_as(as = "Bytes")] [u8; PUBLIC_KEY_LEN]);

impl Secp256k1PublicKey {
    /// Create from compressed bytes (33 bytes, starting with 0x02 or 0x03).
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LEN]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Get raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(true);
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }
}

impl fmt::Debug for Secp256k1PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256k1PublicKey({})", hex::encode(self.0))
    }
}

impl fmt::Display for Secp256k1PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Recoverable ECDSA signature (65 bytes).
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecoverableSignature(#[serde_as(as = "Bytes")] [u8; SIGNATURE_LEN]);

impl RecoverableSignature {
    /// Create from raw bytes. Validity is checked on recovery.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// True for the all-zero placeholder carried by unsigned headers.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Recover the public key that produced this signature over `prehash`.
    pub fn recover(&self, prehash: &[u8; 32]) -> Result<Secp256k1PublicKey, CryptoError> {
        let recovery_id =
            RecoveryId::from_byte(self.0[0]).ok_or(CryptoError::InvalidRecoveryId(self.0[0]))?;
        let signature =
            Signature::from_slice(&self.0[1..]).map_err(|_| CryptoError::InvalidSignature)?;

        let key = VerifyingKey::recover_from_prehash(prehash, &signature, recovery_id)
            .map_err(|_| CryptoError::RecoveryFailed)?;

        Ok(Secp256k1PublicKey::from_verifying_key(&key))
    }
}

impl Default for RecoverableSignature {
    fn default() -> Self {
        Self([0u8; SIGNATURE_LEN])
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSignature({})", hex::encode(self.0))
    }
}

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes). The input copy is zeroized.
    pub fn from_bytes(mut bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_bytes((&bytes).into());
        bytes.zeroize();
        let signing_key = signing_key.map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Get public key (compressed, 33 bytes).
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest (deterministic RFC 6979).
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<RecoverableSignature, CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(prehash)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[0] = recovery_id.to_byte();
        bytes[1..].copy_from_slice(&signature.to_bytes());
        Ok(RecoverableSignature(bytes))
    }
}

impl fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
