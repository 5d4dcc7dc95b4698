//! Vault CRUD over the shared catalog and the current device's location table.

use super::picker::{FolderPicker, PickOutcome};
use super::VaultId;
use crate::config::VaultIdConfig;
use crate::identity::DeviceIdentityProvider;
use crate::settings::{
    normalize_location, DeviceSetting, SettingsStore, SettingsTier, SharedSettings,
};
use crate::{BookMasterError, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One row of [`BookVaultRegistry::list_vaults`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultListing {
    pub id: VaultId,
    pub name: String,
    /// `None` when the vault is not configured on this device.
    pub path: Option<PathBuf>,
}

/// Registry of book vaults for the current device.
///
/// Holds the last successfully persisted copy of both settings tiers. Each
/// mutation stages a modified copy, saves it, and only then replaces the
/// in-memory tier, so a failed save leaves that tier untouched. The two tiers
/// are saved one after the other (shared first) with no cross-tier atomicity:
/// if the device save fails after the shared save succeeded, the vault exists
/// but is unconfigured here, and re-issuing `modify_vault` for the same id
/// completes the change.
///
/// Operations take `&mut self`; the host serializes them.
pub struct BookVaultRegistry {
    store: Arc<dyn SettingsStore>,
    shared: SharedSettings,
    device: DeviceSetting,
}

impl BookVaultRegistry {
    /// Load both tiers for the device named by `identity`.
    pub async fn open(
        store: Arc<dyn SettingsStore>,
        identity: &dyn DeviceIdentityProvider,
    ) -> Result<Self> {
        let device_id = identity.current_device_id();
        let shared = store.load_shared().await?;
        let device = store.load_device(device_id).await?;

        info!(
            "Opened book vault registry on device {} ({} vaults, {} configured here)",
            device_id,
            shared.vault_count(),
            device.book_vault_paths.len()
        );

        Ok(Self {
            store,
            shared,
            device,
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device.device_id
    }

    pub fn shared(&self) -> &SharedSettings {
        &self.shared
    }

    pub fn device(&self) -> &DeviceSetting {
        &self.device
    }

    /// Re-read both tiers, picking up shared changes made by other devices.
    pub async fn reload(&mut self) -> Result<()> {
        let shared = self.store.load_shared().await?;
        let device = self.store.load_device(&self.device.device_id).await?;
        debug!(
            "Reloaded settings: {} vaults (was {})",
            shared.vault_count(),
            self.shared.vault_count()
        );
        self.shared = shared;
        self.device = device;
        Ok(())
    }

    // ========================================
    // Vault CRUD
    // ========================================

    /// Smallest id in `00..=98` not present in the shared catalog.
    pub fn allocate_vault_id(&self) -> Result<VaultId> {
        VaultId::all()
            .find(|id| !self.shared.contains_vault(*id))
            .ok_or(BookMasterError::NoIdsAvailable {
                capacity: usize::from(VaultIdConfig::CAPACITY),
            })
    }

    /// Create a vault named `name` located at `path` on this device.
    ///
    /// A `path` of `""` or `"@"` creates the vault without a location here.
    pub async fn add_vault(&mut self, name: &str, path: &str) -> Result<VaultId> {
        let name = validate_name(name)?;
        let id = self.allocate_vault_id()?;

        let mut shared = self.shared.clone();
        shared.book_vault_names.insert(id, name.clone());
        self.commit_shared(shared).await?;

        let mut device = self.device.clone();
        if device.set_location(id, normalize_location(path)) {
            self.commit_device(device).await.inspect_err(|_| {
                warn!(
                    "Vault {} was added to the shared catalog but its location on device {} was not saved",
                    id, self.device.device_id
                );
            })?;
        }

        info!("Added vault {} ({})", id, name);
        Ok(id)
    }

    /// Rename a vault and set its location on this device.
    ///
    /// The id must already exist; this never allocates. Each tier is only
    /// saved if it actually changes.
    pub async fn modify_vault(&mut self, id: VaultId, name: &str, path: &str) -> Result<()> {
        if !self.shared.contains_vault(id) {
            return Err(BookMasterError::VaultNotFound { id: id.to_string() });
        }
        let name = validate_name(name)?;

        let mut touched = false;

        if self.shared.vault_name(id) != Some(name.as_str()) {
            let mut shared = self.shared.clone();
            shared.book_vault_names.insert(id, name.clone());
            self.commit_shared(shared).await?;
            touched = true;
        }

        let mut device = self.device.clone();
        if device.set_location(id, normalize_location(path)) {
            self.commit_device(device).await?;
            touched = true;
        }

        if touched {
            info!("Modified vault {} ({})", id, name);
        } else {
            debug!("Modify of vault {} changed nothing", id);
        }
        Ok(())
    }

    /// Remove a vault from the shared catalog and this device's table.
    ///
    /// Removing an unknown id is a no-op: another device may already have
    /// removed it. Other devices' locations are left for them to prune.
    pub async fn remove_vault(&mut self, id: VaultId) -> Result<()> {
        let mut shared = self.shared.clone();
        if shared.book_vault_names.shift_remove(&id).is_some() {
            self.commit_shared(shared).await?;
        }

        let mut device = self.device.clone();
        if device.set_location(id, None) {
            self.commit_device(device).await?;
        }

        info!("Removed vault {}", id);
        Ok(())
    }

    /// This device's path for a vault.
    pub fn resolve_path(&self, id: VaultId) -> Result<PathBuf> {
        if !self.shared.contains_vault(id) {
            return Err(BookMasterError::VaultNotFound { id: id.to_string() });
        }
        self.device
            .location(id)
            .map(PathBuf::from)
            .ok_or_else(|| BookMasterError::NotConfiguredOnDevice { id: id.to_string() })
    }

    /// Every vault in the shared catalog, in stored order, joined with this
    /// device's locations.
    ///
    /// Locations with no catalog entry are not reported.
    pub fn list_vaults(&self) -> Vec<VaultListing> {
        self.shared
            .book_vault_names
            .iter()
            .map(|(id, name)| VaultListing {
                id: *id,
                name: name.clone(),
                path: self.device.location(*id).map(PathBuf::from),
            })
            .collect()
    }

    /// Let the user pick a folder for a vault.
    ///
    /// On a completed pick the vault is renamed after the folder and pointed
    /// at it. An abandoned pick, or a failing picker, touches nothing.
    pub async fn relocate_with_picker(
        &mut self,
        id: VaultId,
        picker: &dyn FolderPicker,
    ) -> Result<PickOutcome> {
        if !self.shared.contains_vault(id) {
            return Err(BookMasterError::VaultNotFound { id: id.to_string() });
        }

        let Some(picked) = picker.pick_folder().await? else {
            debug!("Folder pick for vault {} was cancelled", id);
            return Ok(PickOutcome::Cancelled);
        };

        let path = picked
            .to_str()
            .ok_or_else(|| BookMasterError::Validation {
                field: "path".to_string(),
                message: format!("{} is not valid UTF-8", picked.display()),
            })?
            .to_string();
        let name = vault_name_from_path(&path)
            .or_else(|| self.shared.vault_name(id).map(str::to_string))
            .unwrap_or_else(|| default_vault_name(id));

        self.modify_vault(id, &name, &path).await?;
        Ok(PickOutcome::Applied { name, path: picked })
    }

    /// Drop this device's locations whose vault no longer exists.
    ///
    /// Returns how many were removed.
    pub async fn prune_orphaned_locations(&mut self) -> Result<usize> {
        let mut device = self.device.clone();
        let before = device.book_vault_paths.len();
        device
            .book_vault_paths
            .retain(|id, _| self.shared.contains_vault(*id));
        let removed = before - device.book_vault_paths.len();

        if removed > 0 {
            self.commit_device(device).await?;
            info!("Pruned {} orphaned vault locations", removed);
        }
        Ok(removed)
    }

    // ========================================
    // Device preferences
    // ========================================

    pub async fn rename_device(&mut self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        if self.device.device_name == name {
            return Ok(());
        }
        let mut device = self.device.clone();
        device.device_name = name;
        self.commit_device(device).await
    }

    pub async fn set_viewer_worker_path(&mut self, path: &str) -> Result<()> {
        let path = path.trim();
        if self.device.book_viewer_worker_path == path {
            return Ok(());
        }
        let mut device = self.device.clone();
        device.book_viewer_worker_path = path.to_string();
        self.commit_device(device).await
    }

    // ========================================
    // Persistence
    // ========================================

    async fn commit_shared(&mut self, staged: SharedSettings) -> Result<()> {
        self.store
            .save_shared(&staged)
            .await
            .map_err(|e| BookMasterError::persistence(SettingsTier::Shared, e))?;
        self.shared = staged;
        Ok(())
    }

    async fn commit_device(&mut self, staged: DeviceSetting) -> Result<()> {
        self.store
            .save_device(&staged)
            .await
            .map_err(|e| BookMasterError::persistence(SettingsTier::Device, e))?;
        self.device = staged;
        Ok(())
    }
}

/// Name proposed for a freshly allocated vault.
pub fn default_vault_name(id: VaultId) -> String {
    format!("{}{}", VaultIdConfig::DEFAULT_NAME_PREFIX, id)
}

/// Last component of a folder path, accepting both `/` and `\` separators.
pub fn vault_name_from_path(path: &str) -> Option<String> {
    const SEPARATORS: &[char] = &['/', '\\'];
    path.trim_end_matches(SEPARATORS)
        .rsplit(SEPARATORS)
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.ends_with(':'))
        .map(str::to_string)
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BookMasterError::Validation {
            field: "name".to_string(),
            message: "Name must not be empty".to_string(),
        });
    }
    Ok(name.to_string())
}
