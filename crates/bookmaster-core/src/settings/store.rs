//! Settings persistence contract and the JSON file implementation.

use super::atomic::{atomic_read_json, atomic_write_json};
use super::{DeviceSetting, SharedSettings};
use crate::config::SettingsConfig;
use crate::identity::default_device_name;
use crate::{BookMasterError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

/// Persistence for the two settings tiers.
///
/// The registry makes no assumption of atomicity across the two save calls.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the shared document, or defaults if none has been saved yet.
    async fn load_shared(&self) -> Result<SharedSettings>;

    async fn save_shared(&self, settings: &SharedSettings) -> Result<()>;

    /// Load a device's document, creating it if this device is new.
    async fn load_device(&self, device_id: &str) -> Result<DeviceSetting>;

    async fn save_device(&self, device: &DeviceSetting) -> Result<()>;
}

/// File-backed settings store.
///
/// Layout under `root`:
/// - `data.json`: shared document (the part a sync client replicates)
/// - `devices/<device-id>.json`: one document per device
pub struct JsonSettingsStore {
    root: PathBuf,
    keep_backup: bool,
}

impl JsonSettingsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            keep_backup: SettingsConfig::KEEP_BACKUP,
        }
    }

    pub fn shared_path(&self) -> PathBuf {
        self.root.join(SettingsConfig::SHARED_FILENAME)
    }

    pub fn device_path(&self, device_id: &str) -> Result<PathBuf> {
        validate_device_id(device_id)?;
        Ok(self
            .root
            .join(SettingsConfig::DEVICES_DIR_NAME)
            .join(format!("{device_id}.json")))
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn load_shared(&self) -> Result<SharedSettings> {
        let path = self.shared_path();
        let loaded = blocking(move || atomic_read_json::<SharedSettings>(&path)).await?;
        Ok(loaded.unwrap_or_else(|| {
            debug!("No shared settings yet, using defaults");
            SharedSettings::default()
        }))
    }

    async fn save_shared(&self, settings: &SharedSettings) -> Result<()> {
        let path = self.shared_path();
        let settings = settings.clone();
        let keep_backup = self.keep_backup;
        blocking(move || atomic_write_json(&path, &settings, keep_backup)).await
    }

    async fn load_device(&self, device_id: &str) -> Result<DeviceSetting> {
        let path = self.device_path(device_id)?;
        let loaded = blocking(move || atomic_read_json::<DeviceSetting>(&path)).await?;

        match loaded {
            Some(device) if device.device_id == device_id => Ok(device),
            Some(device) => Err(BookMasterError::Config {
                message: format!(
                    "Device document for {} claims device id {}",
                    device_id, device.device_id
                ),
            }),
            None => {
                info!("First run on device {}, creating device settings", device_id);
                let device = DeviceSetting::new(device_id, default_device_name());
                self.save_device(&device).await?;
                Ok(device)
            }
        }
    }

    async fn save_device(&self, device: &DeviceSetting) -> Result<()> {
        let path = self.device_path(&device.device_id)?;
        let device = device.clone();
        let keep_backup = self.keep_backup;
        blocking(move || atomic_write_json(&path, &device, keep_backup)).await
    }
}

/// Device ids become file names, so only a conservative alphabet is allowed.
fn validate_device_id(device_id: &str) -> Result<()> {
    let valid = !device_id.is_empty()
        && device_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(BookMasterError::Validation {
            field: "device_id".to_string(),
            message: format!("{device_id:?} is not a valid device id"),
        })
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BookMasterError::Other(format!("Settings I/O task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::VaultId;
    use tempfile::TempDir;

    fn id(s: &str) -> VaultId {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_load_shared_defaults_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::new(temp_dir.path());

        let shared = store.load_shared().await.unwrap();
        assert_eq!(shared, SharedSettings::default());
        assert!(!store.shared_path().exists());
    }

    #[tokio::test]
    async fn test_shared_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::new(temp_dir.path());

        let mut shared = SharedSettings::default();
        shared.book_vault_names.insert(id("00"), "Fiction".into());
        store.save_shared(&shared).await.unwrap();

        let loaded = store.load_shared().await.unwrap();
        assert_eq!(loaded.vault_name(id("00")), Some("Fiction"));
    }

    #[tokio::test]
    async fn test_load_device_creates_fresh_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::new(temp_dir.path());

        let device = store.load_device("dev-a").await.unwrap();
        assert_eq!(device.device_id, "dev-a");
        assert!(!device.device_name.is_empty());
        assert!(device.book_vault_paths.is_empty());
        assert!(store.device_path("dev-a").unwrap().exists());
    }

    #[tokio::test]
    async fn test_devices_are_stored_separately() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::new(temp_dir.path());

        let mut a = DeviceSetting::new("dev-a", "Laptop");
        a.set_location(id("00"), Some("/A/books".into()));
        store.save_device(&a).await.unwrap();

        let b = store.load_device("dev-b").await.unwrap();
        assert!(b.location(id("00")).is_none());

        let a_again = store.load_device("dev-a").await.unwrap();
        assert_eq!(a_again, a);
        assert!(store.device_path("dev-a").unwrap().exists());
    }

    #[tokio::test]
    async fn test_device_document_with_foreign_id_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::new(temp_dir.path());

        let path = store.device_path("dev-a").unwrap();
        atomic_write_json(&path, &DeviceSetting::new("dev-z", "Other"), false).unwrap();

        let err = store.load_device("dev-a").await.unwrap_err();
        assert!(matches!(err, BookMasterError::Config { .. }));
    }

    #[test]
    fn test_device_path_rejects_traversal() {
        let store = JsonSettingsStore::new("/settings");
        assert!(store.device_path("../escape").is_err());
        assert!(store.device_path("").is_err());
        assert!(store.device_path("4f0c-aa_01").is_ok());
    }
}
