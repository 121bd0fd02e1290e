//! # Account Identifiers
//!
//! Every party the ledger knows about -- holders, venues, the tax wallet,
//! the ledger and vesting-engine components themselves -- is addressed by
//! an opaque 32-byte [`AccountId`].
//!
//! Component accounts are deterministic BLAKE3 hashes of a canonical label,
//! so the same ledger always lands on the same component identifier with
//! no registry and no coordination. User accounts arrive from outside as
//! hex strings (or are generated fresh with [`AccountId::random`]).
//!
//! `AccountId` serializes as a hex string rather than a byte array so it
//! can be used directly as a JSON map key in persisted ledger state.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque 32-byte account identifier.
///
/// The all-zero identifier is reserved as "unset" and is rejected wherever
/// a concrete counterparty is required (tax wallet, venue classification).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId([u8; 32]);

impl AccountId {
    /// The reserved null identifier. Never a valid counterparty.
    pub const ZERO: AccountId = AccountId([0u8; 32]);

    /// Creates an `AccountId` from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte identifier.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns `true` for the reserved null identifier.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Returns the hex-encoded identifier.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded identifier. Requires exactly 64 hex digits.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Derives a deterministic `AccountId` from a canonical label.
    ///
    /// The hash input is `domain || 0x00 || label` so that component
    /// accounts ("ledger:NLT") can never collide with plain labels even
    /// when one string is a prefix of the other.
    pub fn derive(domain: &str, label: &str) -> Self {
        let mut preimage = Vec::with_capacity(domain.len() + label.len() + 1);
        preimage.extend_from_slice(domain.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(label.as_bytes());
        Self(*blake3::hash(&preimage).as_bytes())
    }

    /// Generates a fresh random identifier.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for AccountId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Hex-string serde so account ids work as JSON object keys.
impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AccountId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
