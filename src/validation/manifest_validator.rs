//! Manifest Validator - checks a loaded build manifest before anything runs
//!
//! Errors (fatal):
//! - a tag used more than once across the manifest
//! - a tag that the registry would refuse
//! - an empty version key
//!
//! Warnings:
//! - an entry without tags
//! - a checksum that does not look like a sha256 hex digest
//!
//! # Example
//!
//! ```
//! use image_publisher::core::Manifest;
//! use image_publisher::validation::ManifestValidator;
//!
//! let manifest = Manifest::from_json_str(
//!     r#"{"1.0.0": {"sha256": "abc", "tags": ["1.0.0", "stable"]}}"#,
//!     "inline",
//! ).unwrap();
//!
//! let report = ManifestValidator::new().validate(&manifest);
//! assert!(report.is_valid());
//! ```

use crate::core::manifest::Manifest;
use regex::Regex;
use std::collections::HashMap;

/// Registry tag grammar
const TAG_PATTERN: &str = r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$";

/// Lowercase hex sha256 digest
const SHA256_PATTERN: &str = r"^[0-9a-f]{64}$";

/// Result of manifest validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validator for build manifests
pub struct ManifestValidator {
    tag_regex: Regex,
    sha256_regex: Regex,
}

impl Default for ManifestValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestValidator {
    pub fn new() -> Self {
        Self {
            tag_regex: Regex::new(TAG_PATTERN).expect("tag pattern is a valid regex"),
            sha256_regex: Regex::new(SHA256_PATTERN).expect("sha256 pattern is a valid regex"),
        }
    }

    /// Check whether a single tag is acceptable to the registry
    pub fn is_valid_tag(&self, tag: &str) -> bool {
        self.tag_regex.is_match(tag)
    }

    /// Validate every entry of the manifest
    pub fn validate(&self, manifest: &Manifest) -> ValidationReport {
        let mut report = ValidationReport::default();
        // tag -> version that first claimed it
        let mut owners: HashMap<&str, &str> = HashMap::new();

        for entry in manifest.entries() {
            if entry.version.trim().is_empty() {
                report.errors.push("Version key must not be empty".to_string());
            }

            if entry.tags.is_empty() {
                report.warnings.push(format!(
                    "Version {} has no tags and will never be built",
                    entry.version
                ));
            }

            if !self.sha256_regex.is_match(&entry.checksum) {
                report.warnings.push(format!(
                    "Version {} has a sha256 that is not 64 lowercase hex characters",
                    entry.version
                ));
            }

            for tag in &entry.tags {
                if !self.is_valid_tag(tag) {
                    report
                        .errors
                        .push(format!("Version {} has invalid tag '{}'", entry.version, tag));
                }

                if let Some(owner) = owners.insert(tag.as_str(), entry.version.as_str()) {
                    report.errors.push(format!(
                        "Tag '{}' is used by both {} and {}",
                        tag, owner, entry.version
                    ));
                }
            }
        }

        report
    }
}
