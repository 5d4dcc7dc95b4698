//! Per-device settings document.

use crate::config::SettingsConfig;
use crate::registry::VaultId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings local to one device, keyed by that device's identity.
///
/// `book_vault_paths` only holds vaults that are configured on this device.
/// An unconfigured vault is simply absent; the legacy `"@"` placeholder is
/// dropped while loading and never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSetting {
    pub device_id: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(default, deserialize_with = "deserialize_vault_paths")]
    pub book_vault_paths: IndexMap<VaultId, String>,
    #[serde(default)]
    pub book_viewer_worker_path: String,
}

impl DeviceSetting {
    /// A fresh document for a device seen for the first time.
    pub fn new(device_id: impl Into<String>, device_name: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            device_name: device_name.into(),
            book_vault_paths: IndexMap::new(),
            book_viewer_worker_path: SettingsConfig::DEFAULT_VIEWER_WORKER_PATH.to_string(),
        }
    }

    /// This device's location for a vault, if configured.
    pub fn location(&self, id: VaultId) -> Option<&Path> {
        self.book_vault_paths.get(&id).map(Path::new)
    }

    /// Set or clear this device's location for a vault.
    ///
    /// Returns `true` if the table changed.
    pub fn set_location(&mut self, id: VaultId, path: Option<String>) -> bool {
        match path {
            Some(path) => self.book_vault_paths.insert(id, path.clone()) != Some(path),
            None => self.book_vault_paths.shift_remove(&id).is_some(),
        }
    }
}

/// Normalize a user- or document-supplied path to "configured" or "absent".
///
/// Whitespace only matters for recognising the unset forms; a configured
/// path is kept exactly as given.
pub fn normalize_location(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == crate::config::VaultIdConfig::LEGACY_UNSET_SENTINEL {
        None
    } else {
        Some(raw.to_string())
    }
}

fn deserialize_vault_paths<'de, D>(deserializer: D) -> Result<IndexMap<VaultId, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let paths = super::deserialize_vault_map(deserializer)?;
    Ok(paths
        .into_iter()
        .filter_map(|(id, raw)| normalize_location(&raw).map(|path| (id, path)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> VaultId {
        s.parse().unwrap()
    }

    #[test]
    fn test_legacy_placeholder_is_absent() {
        let raw = r#"{
            "deviceId": "dev-a",
            "deviceName": "Laptop",
            "bookVaultPaths": {"00": "/A/books", "01": "@", "02": ""},
            "bookViewerWorkerPath": ""
        }"#;
        let device: DeviceSetting = serde_json::from_str(raw).unwrap();

        assert_eq!(device.location(id("00")), Some(Path::new("/A/books")));
        assert_eq!(device.location(id("01")), None);
        assert_eq!(device.location(id("02")), None);
        assert_eq!(device.book_vault_paths.len(), 1);

        let out = serde_json::to_string(&device).unwrap();
        assert!(!out.contains("\"@\""));
    }

    #[test]
    fn test_set_location_reports_changes() {
        let mut device = DeviceSetting::new("dev-a", "Laptop");

        assert!(device.set_location(id("00"), Some("/books".into())));
        assert!(!device.set_location(id("00"), Some("/books".into())));
        assert!(device.set_location(id("00"), Some("/other".into())));
        assert!(device.set_location(id("00"), None));
        assert!(!device.set_location(id("00"), None));
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("@"), None);
        assert_eq!(normalize_location(" @ "), None);
        assert_eq!(normalize_location("  "), None);
        assert_eq!(normalize_location(" /books "), Some(" /books ".to_string()));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let device: DeviceSetting = serde_json::from_str(r#"{"deviceId": "dev-b"}"#).unwrap();
        assert_eq!(device.device_id, "dev-b");
        assert!(device.book_vault_paths.is_empty());
    }
}
