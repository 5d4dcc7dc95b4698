//! Shared settings document, synced across all of a user's devices.

use crate::registry::VaultId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Library-wide settings.
///
/// The vault catalog (`bookVaultNames`) is the source of truth for which
/// vaults exist. Everything else is carried for other features and
/// round-tripped unchanged; keys this version does not know about are kept in
/// `extra` so a newer client's fields survive a save from an older one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SharedSettings {
    #[serde(deserialize_with = "super::deserialize_vault_map")]
    pub book_vault_names: IndexMap<VaultId, String>,
    pub data_path: String,
    pub show_book_exts: Vec<String>,
    pub open_book_exts_with_default_app: Vec<String>,
    pub open_all_book_with_default_app: bool,
    pub auto_change_book_status_when_open: bool,
    pub auto_insert_new_annotation: bool,
    pub annotation_author: String,
    pub fixed_annotation_image_scale: f64,
    pub document_viewer_theme: String,
    pub annotation_template: AnnotationTemplates,
    pub llm: LlmSettings,
    pub translate: TranslateSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self {
            book_vault_names: IndexMap::new(),
            data_path: "BookMaster".to_string(),
            show_book_exts: ["pdf", "epub", "mobi", "txt", "md"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            open_book_exts_with_default_app: Vec::new(),
            open_all_book_with_default_app: false,
            auto_change_book_status_when_open: true,
            auto_insert_new_annotation: false,
            annotation_author: String::new(),
            fixed_annotation_image_scale: 1.0,
            document_viewer_theme: "default".to_string(),
            annotation_template: AnnotationTemplates::default(),
            llm: LlmSettings::default(),
            translate: TranslateSettings::default(),
            extra: Map::new(),
        }
    }
}

impl SharedSettings {
    pub fn vault_name(&self, id: VaultId) -> Option<&str> {
        self.book_vault_names.get(&id).map(String::as_str)
    }

    pub fn contains_vault(&self, id: VaultId) -> bool {
        self.book_vault_names.contains_key(&id)
    }

    pub fn vault_count(&self) -> usize {
        self.book_vault_names.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationTemplates {
    pub pdf: PdfAnnotationTemplates,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfAnnotationTemplates {
    pub text_annotation: String,
    pub region_annotation: String,
    pub page_annotation: String,
}

impl Default for PdfAnnotationTemplates {
    fn default() -> Self {
        Self {
            text_annotation: "> {{content}}\n\n{{comment}}".to_string(),
            region_annotation: "![[{{image}}]]\n\n{{comment}}".to_string(),
            page_annotation: "{{comment}}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub gpt: GptSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GptSettings {
    pub host: String,
    pub key: String,
}

impl Default for GptSettings {
    fn default() -> Self {
        Self {
            host: "https://api.openai.com".to_string(),
            key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateSettings {
    pub baidu: BaiduTranslateSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaiduTranslateSettings {
    pub appid: String,
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(s: &str) -> VaultId {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings: SharedSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, SharedSettings::default());
        assert_eq!(settings.vault_count(), 0);
    }

    #[test]
    fn test_catalog_keeps_stored_order() {
        let raw = r#"{"bookVaultNames": {"05": "Papers", "00": "Fiction", "02": "Manuals"}}"#;
        let settings: SharedSettings = serde_json::from_str(raw).unwrap();

        let ids: Vec<String> = settings
            .book_vault_names
            .keys()
            .map(ToString::to_string)
            .collect();
        assert_eq!(ids, vec!["05", "00", "02"]);

        let out = serde_json::to_string(&settings).unwrap();
        let papers = out.find("\"05\"").unwrap();
        let fiction = out.find("\"00\"").unwrap();
        assert!(papers < fiction);
    }

    #[test]
    fn test_invalid_catalog_keys_are_dropped() {
        let raw = r#"{"bookVaultNames": {"00": "Fiction", "abc": "Junk", "99": "Overflow"}}"#;
        let settings: SharedSettings = serde_json::from_str(raw).unwrap();

        assert_eq!(settings.vault_count(), 1);
        assert_eq!(settings.vault_name(id("00")), Some("Fiction"));
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let raw = json!({
            "bookVaultNames": {"00": "Fiction"},
            "annotationAuthor": "me",
            "futureOption": {"enabled": true}
        });
        let settings: SharedSettings = serde_json::from_value(raw).unwrap();
        assert_eq!(settings.annotation_author, "me");

        let back = serde_json::to_value(&settings).unwrap();
        assert_eq!(back["futureOption"], json!({"enabled": true}));
        assert_eq!(back["translate"]["baidu"]["appid"], json!(""));
    }
}
