//! Vault identifiers.

use crate::config::VaultIdConfig;
use crate::{BookMasterError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Two-digit, zero-padded vault identifier in `00..=98`.
///
/// The id is the join key between the shared catalog and every device's
/// location table, so it never changes for the lifetime of a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VaultId(u8);

impl VaultId {
    /// Create an id from its numeric value.
    pub fn new(value: u8) -> Result<Self> {
        if value < VaultIdConfig::CAPACITY {
            Ok(Self(value))
        } else {
            Err(BookMasterError::InvalidVaultId(value.to_string()))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// All ids in allocation order.
    pub fn all() -> impl Iterator<Item = VaultId> {
        (0..VaultIdConfig::CAPACITY).map(VaultId)
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = VaultIdConfig::WIDTH)
    }
}

impl FromStr for VaultId {
    type Err = BookMasterError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || BookMasterError::InvalidVaultId(s.to_string());
        if s.len() != VaultIdConfig::WIDTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: u8 = s.parse().map_err(|_| invalid())?;
        Self::new(value).map_err(|_| invalid())
    }
}

impl Serialize for VaultId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VaultId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
