//! Platform abstraction layer.
//!
//! All platform-specific directory lookups live here rather than being
//! scattered through the settings code.

pub mod paths;

pub use paths::{bookmaster_config_dir, default_device_identity_path, default_settings_root};
