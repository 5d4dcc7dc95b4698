//! Centralized configuration for BookMaster.
//!
//! Constants for file layout, vault id allocation and defaults shown to the
//! user when a vault or device is first created.

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    /// Directory name under the platform config dir.
    pub const APP_CONFIG_DIR_NAME: &'static str = "bookmaster";
}

/// On-disk layout of the two settings tiers.
pub struct SettingsConfig;

impl SettingsConfig {
    /// Shared (synced) document, relative to the settings root.
    pub const SHARED_FILENAME: &'static str = "data.json";
    /// Directory holding one document per device.
    pub const DEVICES_DIR_NAME: &'static str = "devices";
    /// Local, never-synced file holding this installation's identity.
    pub const DEVICE_IDENTITY_FILENAME: &'static str = "device.json";
    /// Keep a `.bak` copy of the previous document on every save.
    pub const KEEP_BACKUP: bool = true;
    pub const DEFAULT_DEVICE_NAME: &'static str = "Unknown device";
    pub const DEFAULT_VIEWER_WORKER_PATH: &'static str = "";
}

/// Vault id space.
pub struct VaultIdConfig;

impl VaultIdConfig {
    /// Ids run `00..=98`.
    pub const CAPACITY: u8 = 99;
    pub const WIDTH: usize = 2;
    /// Path value older clients store for "not configured on this device".
    pub const LEGACY_UNSET_SENTINEL: &'static str = "@";
    pub const DEFAULT_NAME_PREFIX: &'static str = "BookVault-";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_fits_width() {
        let widest = (VaultIdConfig::CAPACITY - 1).to_string();
        assert_eq!(widest.len(), VaultIdConfig::WIDTH);
    }
}
