//! BookMaster Core - book-vault registry for a multi-device reading library.
//!
//! A *vault* is a named folder of books. The same logical vault is usually
//! mounted at a different path on every device (a cloud folder on a laptop
//! and a tablet, say). This crate keeps vault identity and names in a shared
//! settings document that the host syncs, and each device's paths in that
//! device's own document.
//!
//! # Example
//!
//! ```rust,ignore
//! use bookmaster_core::{BookVaultRegistry, FileDeviceIdentity, JsonSettingsStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> bookmaster_core::Result<()> {
//!     let identity = FileDeviceIdentity::load_default()?;
//!     let store = Arc::new(JsonSettingsStore::new("/path/to/notes/.bookmaster"));
//!     let mut registry = BookVaultRegistry::open(store, &identity).await?;
//!
//!     let id = registry.add_vault("Fiction", "/home/me/Books/Fiction").await?;
//!     println!("{} -> {}", id, registry.resolve_path(id)?.display());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod identity;
pub mod platform;
pub mod registry;
pub mod settings;

// Re-export commonly used types
pub use error::{BookMasterError, Result};
pub use identity::{DeviceIdentityProvider, FileDeviceIdentity, StaticDeviceIdentity};
pub use registry::{
    default_vault_name, vault_name_from_path, BookVaultRegistry, FolderPicker, PickOutcome,
    VaultId, VaultListing,
};
pub use settings::{
    DeviceSetting, JsonSettingsStore, MemorySettingsStore, SettingsStore, SettingsTier,
    SharedSettings,
};
