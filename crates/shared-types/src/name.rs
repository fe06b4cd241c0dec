//! # Packed Names
//!
//! Accounts, scopes, actions and permissions are 64-bit packed base-32 names.
//! The first 12 characters take 5 bits each (most significant first), an
//! optional 13th character takes the low 4 bits. Because the alphabet is
//! listed in ascending order, comparing the packed integers compares the
//! names lexicographically, which is what lock ordering relies on.

use crate::codec::{Decode, Encode, EncodeSink};
use crate::errors::{CodecError, NameError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";
const MAX_LEN: usize = 13;

/// 64-bit packed name.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(u64);

/// Name of an account (contract or user).
pub type AccountName = Name;
/// Name of a storage scope within an account.
pub type ScopeName = Name;
/// Name of an action handler.
pub type ActionName = Name;
/// Name of a permission level.
pub type PermissionName = Name;

const fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u64 + 6),
        b'1'..=b'5' => Some((c - b'1') as u64 + 1),
        b'.' => Some(0),
        _ => None,
    }
}

const fn parse_name(s: &[u8]) -> Result<u64, NameError> {
    if s.len() > MAX_LEN {
        return Err(NameError::TooLong { len: s.len() });
    }

    let mut value: u64 = 0;
    let mut i = 0;
    while i < s.len() {
        let symbol = match char_to_symbol(s[i]) {
            Some(symbol) => symbol,
            None => {
                return Err(NameError::InvalidCharacter {
                    ch: s[i] as char,
                    position: i,
                })
            }
        };

        if i < 12 {
            value |= (symbol & 0x1f) << (64 - 5 * (i + 1));
        } else {
            if symbol > 0x0f {
                return Err(NameError::InvalidThirteenthCharacter { ch: s[i] as char });
            }
            value |= symbol;
        }
        i += 1;
    }

    Ok(value)
}

impl Name {
    /// Wraps an already-packed value.
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Packed integer form.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Compile-time name literal. Invalid literals fail const evaluation.
    pub const fn from_static(s: &'static str) -> Self {
        match parse_name(s.as_bytes()) {
            Ok(value) => Self(value),
            Err(_) => panic!("invalid name literal"),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(s.as_bytes()).map(Self)
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.to_string()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chars = [b'.'; MAX_LEN];
        let mut tmp = self.0;

        for i in 0..MAX_LEN {
            let (mask, shift) = if i == 0 { (0x0f, 4) } else { (0x1f, 5) };
            chars[MAX_LEN - 1 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= shift;
        }

        let end = chars
            .iter()
            .rposition(|c| *c != b'.')
            .map_or(0, |pos| pos + 1);

        // Every byte comes from CHARMAP, which is ASCII.
        for c in &chars[..end] {
            fmt::Write::write_char(f, char::from(*c))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({self})")
    }
}

impl Encode for Name {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.0.encode(out);
    }
}

impl Decode for Name {
    fn decode(input: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self(u64::decode(input)?))
    }
}
