//! Tag selection: which manifest entries to build, with which tags

use crate::core::manifest::Manifest;
use std::collections::HashSet;

/// One entry selected for building
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBuild {
    pub version: String,
    pub checksum: String,
    /// Selected tags, in manifest order; never empty
    pub tags: Vec<String>,
}

/// What a run will do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
    /// Entries to build, in manifest order
    pub builds: Vec<PlannedBuild>,
    /// Versions with no selected tags
    pub skipped: Vec<String>,
    /// Requested tags that no entry carries
    pub unknown_tags: Vec<String>,
}

impl BuildPlan {
    /// Number of pushes a publishing run performs
    pub fn tag_count(&self) -> usize {
        self.builds.iter().map(|build| build.tags.len()).sum()
    }
}

/// Intersect every manifest entry's tags with `requested`.
///
/// `None` selects every tag in the manifest.
pub fn plan(manifest: &Manifest, requested: Option<&[String]>) -> BuildPlan {
    let all_tags = manifest.all_tags();
    let requested: HashSet<&str> = match requested {
        Some(tags) => tags.iter().map(String::as_str).collect(),
        None => all_tags.iter().map(String::as_str).collect(),
    };

    let mut plan = BuildPlan::default();

    for entry in manifest.entries() {
        let tags: Vec<String> = entry
            .tags
            .iter()
            .filter(|tag| requested.contains(tag.as_str()))
            .cloned()
            .collect();

        if tags.is_empty() {
            plan.skipped.push(entry.version.clone());
            continue;
        }

        plan.builds.push(PlannedBuild {
            version: entry.version.clone(),
            checksum: entry.checksum.clone(),
            tags,
        });
    }

    let mut unknown: Vec<String> = requested
        .into_iter()
        .filter(|tag| !all_tags.iter().any(|known| known == tag))
        .map(str::to_string)
        .collect();
    unknown.sort();
    plan.unknown_tags = unknown;

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        Manifest::from_json_str(
            r#"{
                "1.1.0": { "sha256": "aaa", "tags": ["1.1.0", "stable", "latest"] },
                "1.0.0": { "sha256": "bbb", "tags": ["1.0.0", "1.0"] },
                "0.17.79": { "sha256": "ccc", "tags": ["0.17.79", "0.17"] }
            }"#,
            "test",
        )
        .unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_default_selects_everything() {
        let plan = plan(&manifest(), None);
        assert_eq!(plan.builds.len(), 3);
        assert!(plan.skipped.is_empty());
        assert!(plan.unknown_tags.is_empty());
        assert_eq!(plan.tag_count(), 7);
        assert_eq!(plan.builds[0].tags, strings(&["1.1.0", "stable", "latest"]));
    }

    #[test]
    fn test_selection_keeps_only_requested_tags() {
        let requested = strings(&["latest"]);
        let plan = plan(&manifest(), Some(requested.as_slice()));

        assert_eq!(
            plan.builds,
            vec![PlannedBuild {
                version: "1.1.0".to_string(),
                checksum: "aaa".to_string(),
                tags: strings(&["latest"]),
            }]
        );
        assert_eq!(plan.skipped, strings(&["1.0.0", "0.17.79"]));
    }

    #[test]
    fn test_selection_preserves_manifest_order() {
        let requested = strings(&["0.17", "stable", "1.1.0"]);
        let plan = plan(&manifest(), Some(requested.as_slice()));

        let versions: Vec<&str> = plan.builds.iter().map(|b| b.version.as_str()).collect();
        assert_eq!(versions, vec!["1.1.0", "0.17.79"]);
        assert_eq!(plan.builds[0].tags, strings(&["1.1.0", "stable"]));
    }

    #[test]
    fn test_unknown_tags_select_nothing() {
        let requested = strings(&["missing-tag"]);
        let plan = plan(&manifest(), Some(requested.as_slice()));

        assert!(plan.builds.is_empty());
        assert_eq!(plan.skipped.len(), 3);
        assert_eq!(plan.unknown_tags, strings(&["missing-tag"]));
    }

    #[test]
    fn test_empty_selection() {
        let requested: Vec<String> = Vec::new();
        let plan = plan(&manifest(), Some(requested.as_slice()));
        assert!(plan.builds.is_empty());
        assert_eq!(plan.tag_count(), 0);
    }

    #[test]
    fn test_every_selected_entry_intersects_request() {
        let manifest = manifest();
        let requested = strings(&["1.0", "stable", "nope"]);
        let plan = plan(&manifest, Some(requested.as_slice()));

        for entry in manifest.entries() {
            let intersects = entry.tags.iter().any(|t| requested.contains(t));
            let planned = plan.builds.iter().any(|b| b.version == entry.version);
            assert_eq!(intersects, planned, "entry {}", entry.version);
        }
    }
}
