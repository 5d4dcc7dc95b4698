//! Error types for BookMaster.
//!
//! Every registry operation returns one of these variants instead of
//! panicking, so host UIs can decide between a blocking notice, a prompt to
//! configure a path, or a quiet retry.

use crate::settings::SettingsTier;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the BookMaster library.
#[derive(Debug, Error)]
pub enum BookMasterError {
    // Registry errors
    #[error("No vault ids available: all {capacity} ids are in use")]
    NoIdsAvailable { capacity: usize },

    #[error("Vault not found: {id}")]
    VaultNotFound { id: String },

    #[error("Vault {id} has no location configured on this device")]
    NotConfiguredOnDevice { id: String },

    #[error("Invalid vault id: {0:?}")]
    InvalidVaultId(String),

    // Persistence errors
    #[error("Failed to save {tier} settings: {message}")]
    Persistence {
        tier: SettingsTier,
        message: String,
        #[source]
        source: Option<Box<BookMasterError>>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for BookMaster operations.
pub type Result<T> = std::result::Result<T, BookMasterError>;

impl From<std::io::Error> for BookMasterError {
    fn from(err: std::io::Error) -> Self {
        BookMasterError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for BookMasterError {
    fn from(err: serde_json::Error) -> Self {
        BookMasterError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl BookMasterError {
    /// Wrap a store failure with the tier that failed to save.
    pub fn persistence(tier: SettingsTier, err: BookMasterError) -> Self {
        BookMasterError::Persistence {
            tier,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// The tier whose save failed, if this is a persistence error.
    pub fn failed_tier(&self) -> Option<SettingsTier> {
        match self {
            BookMasterError::Persistence { tier, .. } => Some(*tier),
            _ => None,
        }
    }

    /// Check if re-issuing the same operation may succeed.
    ///
    /// Registry writes are keyed by vault id, so a retry after an I/O failure
    /// overwrites rather than duplicates.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BookMasterError::Persistence { .. } | BookMasterError::Io { .. }
        )
    }

    /// Check if this error describes something the user can act on, as
    /// opposed to a caller bug.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            BookMasterError::NoIdsAvailable { .. }
                | BookMasterError::NotConfiguredOnDevice { .. }
                | BookMasterError::Validation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BookMasterError::VaultNotFound { id: "07".into() };
        assert_eq!(err.to_string(), "Vault not found: 07");

        let err = BookMasterError::NoIdsAvailable { capacity: 99 };
        assert_eq!(
            err.to_string(),
            "No vault ids available: all 99 ids are in use"
        );
    }

    #[test]
    fn test_persistence_error_keeps_tier() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = BookMasterError::persistence(SettingsTier::Device, io.into());

        assert_eq!(err.failed_tier(), Some(SettingsTier::Device));
        assert!(err.is_retryable());
        assert!(err.to_string().starts_with("Failed to save device settings"));
    }

    #[test]
    fn test_error_classification() {
        assert!(BookMasterError::NotConfiguredOnDevice { id: "00".into() }.is_user_facing());
        assert!(!BookMasterError::VaultNotFound { id: "00".into() }.is_user_facing());
        assert!(!BookMasterError::VaultNotFound { id: "00".into() }.is_retryable());
        assert_eq!(
            BookMasterError::Other("x".into()).failed_tier(),
            None
        );
    }
}
