//! Build manifest: version -> {sha256, tags}
//!
//! The manifest is loaded once per run and is read-only afterwards. Entries
//! keep the order they have in the file so builds run in a deterministic
//! order.

use crate::core::error::ManifestError;
use crate::validation::ManifestValidator;
use serde::Deserialize;
use std::path::Path;

/// One manifest record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildEntry {
    /// Version label, the manifest key
    #[serde(skip)]
    pub version: String,

    /// Content checksum passed verbatim to the build
    #[serde(rename = "sha256")]
    pub checksum: String,

    /// Output tags, in manifest order
    pub tags: Vec<String>,
}

/// Ordered mapping of version to [`BuildEntry`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<BuildEntry>,
}

impl Manifest {
    /// Load and validate a manifest file.
    ///
    /// # Errors
    ///
    /// - `ManifestError::NotFound` - the file does not exist
    /// - `ManifestError::Read` - the file could not be read
    /// - `ManifestError::Parse` - the file is not a JSON object of entries
    /// - `ManifestError::Invalid` - duplicate or malformed tags
    pub async fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ManifestError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ManifestError::Read {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let origin = path.display().to_string();
        let manifest = Self::from_json_str(&content, &origin)?;

        let report = ManifestValidator::new().validate(&manifest);
        for warning in &report.warnings {
            tracing::warn!(manifest = %origin, "{}", warning);
        }
        if !report.is_valid() {
            return Err(ManifestError::Invalid {
                origin,
                errors: report.errors,
            });
        }

        tracing::debug!(manifest = %origin, entries = manifest.len(), "manifest loaded");
        Ok(manifest)
    }

    /// Parse manifest JSON without validating it.
    ///
    /// `origin` names the source in error messages.
    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, ManifestError> {
        let parse_error = |message: String| ManifestError::Parse {
            origin: origin.to_string(),
            message,
        };

        let root: serde_json::Value =
            serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;

        let serde_json::Value::Object(map) = root else {
            return Err(parse_error(
                "top level must be an object keyed by version".to_string(),
            ));
        };

        let mut entries = Vec::with_capacity(map.len());
        for (version, value) in map {
            let mut entry: BuildEntry = serde_json::from_value(value)
                .map_err(|e| parse_error(format!("entry {}: {}", version, e)))?;
            entry.version = version;
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// Entries in manifest order
    pub fn entries(&self) -> impl Iterator<Item = &BuildEntry> {
        self.entries.iter()
    }

    pub fn get(&self, version: &str) -> Option<&BuildEntry> {
        self.entries.iter().find(|entry| entry.version == version)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Union of all tags, in first-seen order
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in self.entries.iter().flat_map(|entry| entry.tags.iter()) {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "1.1.0": { "sha256": "aaaa", "tags": ["1.1.0", "stable"] },
        "1.0.0": { "sha256": "bbbb", "tags": ["1.0.0"] },
        "0.17.79": { "sha256": "cccc", "tags": ["0.17.79", "0.17"] }
    }"#;

    #[test]
    fn test_parse_preserves_file_order() {
        let manifest = Manifest::from_json_str(SAMPLE, "test").unwrap();
        let versions: Vec<&str> = manifest.entries().map(|e| e.version.as_str()).collect();
        assert_eq!(versions, vec!["1.1.0", "1.0.0", "0.17.79"]);
    }

    #[test]
    fn test_parse_entry_fields() {
        let manifest = Manifest::from_json_str(SAMPLE, "test").unwrap();
        let entry = manifest.get("1.1.0").unwrap();
        assert_eq!(entry.checksum, "aaaa");
        assert_eq!(entry.tags, vec!["1.1.0", "stable"]);
        assert!(manifest.get("9.9.9").is_none());
    }

    #[test]
    fn test_all_tags_is_ordered_union() {
        let manifest = Manifest::from_json_str(SAMPLE, "test").unwrap();
        assert_eq!(
            manifest.all_tags(),
            vec!["1.1.0", "stable", "1.0.0", "0.17.79", "0.17"]
        );
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = Manifest::from_json_str("[1, 2, 3]", "test").unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_parse_rejects_entry_without_sha256() {
        let err = Manifest::from_json_str(r#"{"1.0.0": {"tags": ["1.0.0"]}}"#, "test").unwrap_err();
        match err {
            ManifestError::Parse { message, .. } => assert!(message.contains("1.0.0")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = Manifest::from_json_str("{ not json", "test").unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_empty_object_is_empty_manifest() {
        let manifest = Manifest::from_json_str("{}", "test").unwrap();
        assert!(manifest.is_empty());
        assert!(manifest.all_tags().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Manifest::load(&temp_dir.path().join("buildinfo.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_load_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buildinfo.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let manifest = Manifest::load(&path).await.unwrap();
        assert_eq!(manifest.len(), 3);
    }

    #[tokio::test]
    async fn test_load_rejects_duplicate_tags() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buildinfo.json");
        std::fs::write(
            &path,
            r#"{
                "1.1.0": { "sha256": "aaaa", "tags": ["1.1.0", "stable"] },
                "1.0.0": { "sha256": "bbbb", "tags": ["1.0.0", "stable"] }
            }"#,
        )
        .unwrap();

        let err = Manifest::load(&path).await.unwrap_err();
        match err {
            ManifestError::Invalid { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("stable"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
