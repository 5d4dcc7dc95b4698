//! Interactive folder selection.

use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// A host-provided folder chooser.
///
/// `Ok(None)` means the user abandoned the pick.
#[async_trait]
pub trait FolderPicker: Send + Sync {
    async fn pick_folder(&self) -> Result<Option<PathBuf>>;
}

/// Result of [`BookVaultRegistry::relocate_with_picker`](super::BookVaultRegistry::relocate_with_picker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// The user picked a folder and the vault now points at it.
    Applied { name: String, path: PathBuf },
    /// The pick was abandoned; nothing was changed.
    Cancelled,
}
