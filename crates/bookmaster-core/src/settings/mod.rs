//! Two-tier settings: a shared document synced across devices and one
//! document per device.
//!
//! This module provides:
//! - The persisted document types (`SharedSettings`, `DeviceSetting`)
//! - The `SettingsStore` contract the registry persists through
//! - A JSON file store and an in-memory store
//! - Atomic JSON file operations

mod atomic;
mod device;
mod memory;
mod shared;
mod store;

pub use atomic::{atomic_read_json, atomic_write_json};
pub use device::{normalize_location, DeviceSetting};
pub use memory::MemorySettingsStore;
pub use shared::{
    AnnotationTemplates, BaiduTranslateSettings, GptSettings, LlmSettings,
    PdfAnnotationTemplates, SharedSettings, TranslateSettings,
};
pub use store::{JsonSettingsStore, SettingsStore};

use crate::registry::VaultId;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use tracing::warn;

/// Which of the two settings documents an operation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsTier {
    /// Synced across devices.
    Shared,
    /// Local to the current device.
    Device,
}

impl fmt::Display for SettingsTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsTier::Shared => write!(f, "shared"),
            SettingsTier::Device => write!(f, "device"),
        }
    }
}

/// Deserialize a vault-keyed map, dropping keys that are not valid vault ids.
///
/// A hand-edited or foreign key must not make the whole document unreadable.
fn deserialize_vault_map<'de, D>(deserializer: D) -> Result<IndexMap<VaultId, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = IndexMap::<String, String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match key.parse::<VaultId>() {
            Ok(id) => Some((id, value)),
            Err(_) => {
                warn!("Ignoring settings entry with invalid vault id {:?}", key);
                None
            }
        })
        .collect())
}
