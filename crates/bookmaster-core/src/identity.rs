//! Device identity.
//!
//! Each installation gets an opaque id that selects its per-device settings
//! document. The id is generated once and stored outside the synced settings
//! root; regenerating it would orphan every vault location this device owns.

use crate::config::SettingsConfig;
use crate::settings::{atomic_read_json, atomic_write_json};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Supplies the current device's identity.
pub trait DeviceIdentityProvider: Send + Sync {
    /// Stable for the lifetime of the process.
    fn current_device_id(&self) -> &str;
}

/// A fixed identity, for tests and for hosts that manage identity themselves.
#[derive(Debug, Clone)]
pub struct StaticDeviceIdentity(String);

impl StaticDeviceIdentity {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self(device_id.into())
    }
}

impl DeviceIdentityProvider for StaticDeviceIdentity {
    fn current_device_id(&self) -> &str {
        &self.0
    }
}

/// On-disk record of this installation's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceIdentityRecord {
    device_id: String,
    created_at: DateTime<Utc>,
}

/// Identity persisted in a local file, created on first use.
#[derive(Debug, Clone)]
pub struct FileDeviceIdentity {
    device_id: String,
}

impl FileDeviceIdentity {
    /// Load the identity at `path`, generating and saving a new one if the
    /// file does not exist.
    ///
    /// A file that exists but cannot be parsed is an error rather than a
    /// reason to mint a new id.
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(record) = atomic_read_json::<DeviceIdentityRecord>(&path)? {
            return Ok(Self {
                device_id: record.device_id,
            });
        }

        let record = DeviceIdentityRecord {
            device_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        };
        atomic_write_json(&path, &record, false)?;
        info!(
            "Generated device identity {} at {}",
            record.device_id,
            path.display()
        );

        Ok(Self {
            device_id: record.device_id,
        })
    }

    /// Load the identity from the platform config directory.
    pub fn load_default() -> Result<Self> {
        Self::load_or_create(crate::platform::default_device_identity_path()?)
    }
}

impl DeviceIdentityProvider for FileDeviceIdentity {
    fn current_device_id(&self) -> &str {
        &self.device_id
    }
}

/// Name shown for a device until the user renames it.
pub fn default_device_name() -> String {
    sysinfo::System::host_name()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| SettingsConfig::DEFAULT_DEVICE_NAME.to_string())
}
