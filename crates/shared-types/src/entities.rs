//! # Transaction Records
//!
//! Transactions, receipts and execution traces as they flow through the block
//! layer. The block layer never interprets action payloads; it only needs ids,
//! receipts and the digests of emitted actions.

use crate::codec::{take, Decode, Encode, EncodeSink};
use crate::digest::{Digest, TransactionId};
use crate::errors::CodecError;
use crate::name::{AccountName, ActionName, PermissionName};
use serde::{Deserialize, Serialize};
use shared_crypto::{CryptoError, RecoverableSignature, Secp256k1KeyPair, Secp256k1PublicKey};

/// An (actor, permission) pair authorizing an action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: AccountName,
    pub permission: PermissionName,
}

/// A call into a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Contract that handles the action
    pub account: AccountName,
    /// Handler name
    pub name: ActionName,
    pub authorization: Vec<PermissionLevel>,
    /// Opaque, canonically encoded payload
    pub data: Vec<u8>,
}

impl Action {
    /// Builds an action whose data is the canonical encoding of `payload`.
    pub fn new<T: Encode>(
        account: AccountName,
        name: ActionName,
        authorization: Vec<PermissionLevel>,
        payload: &T,
    ) -> Self {
        Self {
            account,
            name,
            authorization,
            data: payload.to_bytes(),
        }
    }

    /// Decodes the payload as `T`.
    pub fn data_as<T: Decode>(&self) -> Result<T, CodecError> {
        T::from_bytes(&self.data)
    }
}

/// Unsigned transaction body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unix seconds after which the transaction may not be included
    pub expiration: u32,
    /// Region the transaction is scheduled in
    pub region: u16,
    /// Low 16 bits of a recent block height (TaPoS)
    pub ref_block_num: u16,
    /// Bytes 8..12 of that block's id (TaPoS)
    pub ref_block_prefix: u32,
    pub actions: Vec<Action>,
}

impl Transaction {
    /// Id of the transaction: digest of the unsigned body.
    pub fn id(&self) -> TransactionId {
        Digest::of(self)
    }
}

/// Transaction body plus the signatures authorizing it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signatures: Vec<RecoverableSignature>,
}

impl SignedTransaction {
    pub fn new(transaction: Transaction) -> Self {
        Self {
            transaction,
            signatures: Vec::new(),
        }
    }

    /// Signatures do not contribute to the id.
    pub fn id(&self) -> TransactionId {
        self.transaction.id()
    }

    /// Appends a signature over the transaction id.
    pub fn sign(&mut self, key: &Secp256k1KeyPair) -> Result<(), CryptoError> {
        let signature = key.sign_prehash(self.id().as_bytes())?;
        self.signatures.push(signature);
        Ok(())
    }

    /// Keys recovered from every attached signature, in signature order.
    pub fn signing_keys(&self) -> Result<Vec<Secp256k1PublicKey>, CryptoError> {
        let id = self.id();
        self.signatures
            .iter()
            .map(|signature| signature.recover(id.as_bytes()))
            .collect()
    }
}

/// Outcome recorded for a transaction in a shard summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Applied successfully
    #[default]
    Executed,
    /// Objective failure, state reverted, sender charged
    SoftFail,
    /// Objective failure, no state change
    HardFail,
    /// Scheduled for later execution
    Delayed,
}

impl TransactionStatus {
    fn tag(self) -> u8 {
        match self {
            Self::Executed => 0,
            Self::SoftFail => 1,
            Self::HardFail => 2,
            Self::Delayed => 3,
        }
    }
}

/// Receipt of a transaction inside a shard.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub status: TransactionStatus,
    pub id: TransactionId,
}

impl TransactionReceipt {
    pub fn executed(id: TransactionId) -> Self {
        Self {
            status: TransactionStatus::Executed,
            id,
        }
    }
}

/// Post-execution record of one delivered action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTrace {
    /// Account whose handler ran
    pub receiver: AccountName,
    pub act: Action,
    /// Handler console output; not consensus data
    pub console: String,
}

impl ActionTrace {
    /// Effect id: digest over (receiver, act). Console output is excluded.
    pub fn digest(&self) -> Digest {
        let mut hasher = shared_crypto::Sha256Hasher::new();
        self.receiver.encode(&mut hasher);
        self.act.encode(&mut hasher);
        Digest(hasher.finalize())
    }
}

/// Post-execution record of one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTrace {
    pub id: TransactionId,
    pub status: TransactionStatus,
    pub action_traces: Vec<ActionTrace>,
}

// -----------------------------------------------------------------------------
// Canonical codec
// -----------------------------------------------------------------------------

impl Encode for PermissionLevel {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.actor.encode(out);
        self.permission.encode(out);
    }
}

impl Decode for PermissionLevel {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            actor: Decode::decode(input)?,
            permission: Decode::decode(input)?,
        })
    }
}

impl Encode for Action {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.account.encode(out);
        self.name.encode(out);
        self.authorization.encode(out);
        self.data.encode(out);
    }
}

impl Decode for Action {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            account: Decode::decode(input)?,
            name: Decode::decode(input)?,
            authorization: Decode::decode(input)?,
            data: Decode::decode(input)?,
        })
    }
}

impl Encode for Transaction {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.expiration.encode(out);
        self.region.encode(out);
        self.ref_block_num.encode(out);
        self.ref_block_prefix.encode(out);
        self.actions.encode(out);
    }
}

impl Decode for Transaction {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            expiration: Decode::decode(input)?,
            region: Decode::decode(input)?,
            ref_block_num: Decode::decode(input)?,
            ref_block_prefix: Decode::decode(input)?,
            actions: Decode::decode(input)?,
        })
    }
}

impl Encode for SignedTransaction {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.transaction.encode(out);
        self.signatures.encode(out);
    }
}

impl Decode for SignedTransaction {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            transaction: Decode::decode(input)?,
            signatures: Decode::decode(input)?,
        })
    }
}

impl Encode for TransactionStatus {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(&[self.tag()]);
    }
}

impl Decode for TransactionStatus {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        match take(input, 1)?[0] {
            0 => Ok(Self::Executed),
            1 => Ok(Self::SoftFail),
            2 => Ok(Self::HardFail),
            3 => Ok(Self::Delayed),
            tag => Err(CodecError::InvalidTag { tag }),
        }
    }
}

impl Encode for TransactionReceipt {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.status.encode(out);
        self.id.encode(out);
    }
}

impl Decode for TransactionReceipt {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            status: Decode::decode(input)?,
            id: Decode::decode(input)?,
        })
    }
}

impl Encode for ActionTrace {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.receiver.encode(out);
        self.act.encode(out);
        self.console.encode(out);
    }
}

impl Decode for ActionTrace {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            receiver: Decode::decode(input)?,
            act: Decode::decode(input)?,
            console: Decode::decode(input)?,
        })
    }
}

impl Encode for TransactionTrace {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.id.encode(out);
        self.status.encode(out);
        self.action_traces.encode(out);
    }
}

impl Decode for TransactionTrace {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            id: Decode::decode(input)?,
            status: Decode::decode(input)?,
            action_traces: Decode::decode(input)?,
        })
    }
}
