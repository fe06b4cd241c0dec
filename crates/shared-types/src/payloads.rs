//! Sample action payloads.
//!
//! The block layer treats action data as opaque bytes. The native currency
//! `transfer` is provided for tooling, fixtures and benchmarks.

use crate::codec::{Decode, Encode, EncodeSink};
use crate::entities::{Action, PermissionLevel};
use crate::errors::CodecError;
use crate::name::{AccountName, ActionName, Name, PermissionName};
use serde::{Deserialize, Serialize};

/// Contract account of the native currency.
pub const CURRENCY_CONTRACT: AccountName = Name::from_static("currency");
/// Action name of a transfer.
pub const TRANSFER_ACTION: ActionName = Name::from_static("transfer");
/// Permission used to authorize transfers.
pub const ACTIVE_PERMISSION: PermissionName = Name::from_static("active");

/// Native currency transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: AccountName,
    pub to: AccountName,
    pub quantity: u64,
    pub memo: String,
}

impl Transfer {
    /// Wraps the transfer into an action authorized by `from@active`.
    pub fn into_action(self) -> Action {
        let authorization = vec![PermissionLevel {
            actor: self.from,
            permission: ACTIVE_PERMISSION,
        }];
        Action::new(CURRENCY_CONTRACT, TRANSFER_ACTION, authorization, &self)
    }
}

impl Encode for Transfer {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.from.encode(out);
        self.to.encode(out);
        self.quantity.encode(out);
        self.memo.encode(out);
    }
}

impl Decode for Transfer {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            from: Decode::decode(input)?,
            to: Decode::decode(input)?,
            quantity: Decode::decode(input)?,
            memo: Decode::decode(input)?,
        })
    }
}
