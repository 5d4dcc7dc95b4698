//! Platform-specific path utilities.

use crate::config::{AppConfig, SettingsConfig};
use crate::error::{BookMasterError, Result};
use std::path::PathBuf;

/// Get the BookMaster configuration directory.
///
/// # Platform Behavior
/// - **Linux**: `~/.config/bookmaster` (XDG_CONFIG_HOME)
/// - **Windows**: `%APPDATA%\bookmaster`
/// - **macOS**: `~/Library/Application Support/bookmaster`
pub fn bookmaster_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| BookMasterError::Config {
        message: "Could not determine platform config directory".to_string(),
    })?;
    Ok(config_dir.join(AppConfig::APP_CONFIG_DIR_NAME))
}

/// Default root for the settings documents when the host does not supply one.
///
/// In a real deployment the shared document sits inside the synced notes
/// folder; this fallback is only suitable for a single device.
pub fn default_settings_root() -> Result<PathBuf> {
    Ok(bookmaster_config_dir()?.join("settings"))
}

/// Path of the local device identity file.
///
/// Lives directly under the config dir, outside any synced settings root.
pub fn default_device_identity_path() -> Result<PathBuf> {
    Ok(bookmaster_config_dir()?.join(SettingsConfig::DEVICE_IDENTITY_FILENAME))
}
