//! Book-vault registry.
//!
//! A vault is a named collection of book files. Its identity and display name
//! live in the shared settings document; where its files sit on disk is a
//! per-device fact kept in each device's own document. The registry is the
//! only writer of either table and joins them at read time.

pub mod book_vault_registry;
mod picker;
mod vault_id;

pub use book_vault_registry::{
    default_vault_name, vault_name_from_path, BookVaultRegistry, VaultListing,
};
pub use picker::{FolderPicker, PickOutcome};
pub use vault_id::VaultId;
