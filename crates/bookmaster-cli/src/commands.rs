//! Subcommand definitions and their handlers.

use anyhow::{Context, Result};
use bookmaster_core::{default_vault_name, BookVaultRegistry, VaultId, VaultListing};
use clap::Subcommand;
use std::fmt::Write;
use tracing::info;

const UNSET_MARKER: &str = "<not configured on this device>";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all vaults with their location on this device
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a vault; prints the allocated id
    Add {
        /// Display name (defaults to BookVault-<id>)
        #[arg(long)]
        name: Option<String>,

        /// Folder holding the vault's books on this device
        path: String,
    },

    /// Rename a vault and/or change its folder on this device
    Modify {
        id: VaultId,

        #[arg(long)]
        name: Option<String>,

        /// New folder on this device ("@" clears it)
        #[arg(long)]
        path: Option<String>,
    },

    /// Remove a vault from the catalog and from this device
    Remove { id: VaultId },

    /// Print a vault's folder on this device
    Resolve { id: VaultId },

    /// Drop locations on this device whose vault no longer exists
    Prune,

    /// Show or change this device's settings
    Device {
        /// New device name
        #[arg(long)]
        name: Option<String>,

        /// Path to the document viewer worker script
        #[arg(long)]
        worker_path: Option<String>,
    },
}

/// Run one command and return what it prints on stdout.
pub async fn execute(registry: &mut BookVaultRegistry, command: Command) -> Result<String> {
    match command {
        Command::List { json } => {
            let vaults = registry.list_vaults();
            if json {
                Ok(serde_json::to_string_pretty(&vaults)?)
            } else {
                Ok(format_table(&vaults))
            }
        }

        Command::Add { name, path } => {
            let name = match name {
                Some(name) => name,
                None => default_vault_name(registry.allocate_vault_id()?),
            };
            let id = registry.add_vault(&name, &path).await?;
            Ok(id.to_string())
        }

        Command::Modify { id, name, path } => {
            let current_name = registry
                .shared()
                .vault_name(id)
                .with_context(|| format!("Vault {id} does not exist"))?
                .to_string();

            let name = name.unwrap_or(current_name);
            let path = path.unwrap_or_else(|| {
                registry
                    .device()
                    .book_vault_paths
                    .get(&id)
                    .cloned()
                    .unwrap_or_default()
            });
            registry.modify_vault(id, &name, &path).await?;
            Ok(String::new())
        }

        Command::Remove { id } => {
            registry.remove_vault(id).await?;
            Ok(String::new())
        }

        Command::Resolve { id } => {
            let path = registry.resolve_path(id)?;
            Ok(path.display().to_string())
        }

        Command::Prune => {
            let removed = registry.prune_orphaned_locations().await?;
            info!("Pruned {} locations", removed);
            Ok(format!("Removed {removed} orphaned locations"))
        }

        Command::Device { name, worker_path } => {
            if let Some(name) = name {
                registry.rename_device(&name).await?;
            }
            if let Some(worker_path) = worker_path {
                registry.set_viewer_worker_path(&worker_path).await?;
            }
            let device = registry.device();
            Ok(format!(
                "id: {}\nname: {}\nviewer worker: {}",
                device.device_id, device.device_name, device.book_viewer_worker_path
            ))
        }
    }
}

fn format_table(vaults: &[VaultListing]) -> String {
    let width = vaults.iter().map(|v| v.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for vault in vaults {
        let location = vault
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| UNSET_MARKER.to_string());
        let _ = writeln!(out, "{}  {:width$}  {}", vault.id, vault.name, location);
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmaster_core::{MemorySettingsStore, SettingsStore, StaticDeviceIdentity};
    use std::sync::Arc;

    async fn registry() -> BookVaultRegistry {
        let store: Arc<dyn SettingsStore> = Arc::new(MemorySettingsStore::new());
        BookVaultRegistry::open(store, &StaticDeviceIdentity::new("dev-a"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_without_name_uses_default() {
        let mut registry = registry().await;

        let out = execute(
            &mut registry,
            Command::Add {
                name: None,
                path: "/books".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(out, "00");
        assert_eq!(registry.list_vaults()[0].name, "BookVault-00");
    }

    #[tokio::test]
    async fn test_modify_keeps_unspecified_fields() {
        let mut registry = registry().await;
        let id = registry.add_vault("Fiction", "/books").await.unwrap();

        execute(
            &mut registry,
            Command::Modify {
                id,
                name: Some("Novels".into()),
                path: None,
            },
        )
        .await
        .unwrap();

        let vault = &registry.list_vaults()[0];
        assert_eq!(vault.name, "Novels");
        assert_eq!(vault.path.as_deref(), Some(std::path::Path::new("/books")));
    }

    #[tokio::test]
    async fn test_rename_keeps_stored_path_verbatim() {
        let mut registry = registry().await;
        let id = registry.add_vault("Fiction", "/books/My Library ").await.unwrap();

        execute(
            &mut registry,
            Command::Modify {
                id,
                name: Some("Novels".into()),
                path: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(
            registry.device().book_vault_paths.get(&id).map(String::as_str),
            Some("/books/My Library ")
        );
    }

    #[tokio::test]
    async fn test_modify_unknown_vault_fails() {
        let mut registry = registry().await;
        let result = execute(
            &mut registry,
            Command::Modify {
                id: "05".parse().unwrap(),
                name: None,
                path: None,
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_table_marks_unset_vaults() {
        let vaults = vec![
            VaultListing {
                id: "00".parse().unwrap(),
                name: "Fiction".into(),
                path: Some("/A/books".into()),
            },
            VaultListing {
                id: "01".parse().unwrap(),
                name: "Papers".into(),
                path: None,
            },
        ];

        let table = format_table(&vaults);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "00  Fiction  /A/books");
        assert_eq!(lines[1], format!("01  Papers   {UNSET_MARKER}"));
        assert!(!table.contains('@'));
    }
}
