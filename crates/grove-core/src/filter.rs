//! Path filtering policy applied to the listing before any content fetch.
//!
//! Rules, in order:
//!
//! 1. drop non-blob entries;
//! 2. drop paths with any segment equal to an excluded directory name;
//! 3. drop paths whose first segment starts with `.`;
//! 4. drop paths whose extension (case-insensitive) is in the binary set.
//!
//! Binary detection is by extension only.

use std::collections::HashSet;

use tracing::trace;

use crate::config::ImportSection;
use crate::types::{EntryKind, FilterCounts, FilterReason, RemotePathEntry};

/// Compiled filter policy.
#[derive(Debug, Clone)]
pub struct PathFilter {
    excluded_dirs: HashSet<String>,
    binary_extensions: HashSet<String>,
}

/// Paths kept by the filter, in listing order, plus per-reason drop counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterResult {
    pub kept: Vec<String>,
    pub counts: FilterCounts,
}

impl PathFilter {
    pub fn new<D, E>(excluded_dirs: D, binary_extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            excluded_dirs: excluded_dirs.into_iter().map(Into::into).collect(),
            binary_extensions: binary_extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Build the policy from the import config section.
    pub fn from_config(config: &ImportSection) -> Self {
        Self::new(
            config.excluded_dirs.iter().cloned(),
            config.binary_extensions.iter(),
        )
    }

    /// Decide whether one entry is dropped, and why.
    pub fn check(&self, entry: &RemotePathEntry) -> Option<FilterReason> {
        if entry.kind != EntryKind::Blob {
            return Some(FilterReason::NotBlob);
        }

        let path = entry.path.as_str();
        if path.split('/').any(|seg| self.excluded_dirs.contains(seg)) {
            return Some(FilterReason::ExcludedDir);
        }

        if path.starts_with('.') {
            return Some(FilterReason::HiddenPath);
        }

        match extension_of(path) {
            Some(ext) if self.binary_extensions.contains(&ext.to_lowercase()) => {
                Some(FilterReason::BinaryExtension)
            }
            _ => None,
        }
    }

    /// Apply the policy to a whole listing, preserving order.
    pub fn apply(&self, entries: &[RemotePathEntry]) -> FilterResult {
        let mut result = FilterResult::default();
        for entry in entries {
            match self.check(entry) {
                Some(reason) => {
                    trace!(path = %entry.path, ?reason, "filtered");
                    result.counts.record(reason);
                }
                None => result.kept.push(entry.path.clone()),
            }
        }
        result
    }
}

/// Text after the last `.` of the final segment, a leading dot included
/// (`assets/.svg` has extension `svg`).
fn extension_of(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rfind('.')
        .map(|i| &name[i + 1..])
        .filter(|ext| !ext.is_empty())
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::from_config(&ImportSection::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, kind: EntryKind) -> RemotePathEntry {
        RemotePathEntry {
            path: path.to_string(),
            kind,
        }
    }

    #[test]
    fn test_default_policy() {
        let filter = PathFilter::default();
        let entries = vec![
            entry("src", EntryKind::Tree),
            entry("src/index.ts", EntryKind::Blob),
            entry("node_modules/react/index.js", EntryKind::Blob),
            entry("packages/app/node_modules/x.js", EntryKind::Blob),
            entry(".github/workflows/ci.yml", EntryKind::Blob),
            entry(".gitignore", EntryKind::Blob),
            entry("public/logo.SVG", EntryKind::Blob),
            entry("public/favicon.ico", EntryKind::Blob),
            entry("assets/.svg", EntryKind::Blob),
            entry("vendor/lib", EntryKind::Other),
            entry("README", EntryKind::Blob),
        ];

        let result = filter.apply(&entries);
        assert_eq!(result.kept, vec!["src/index.ts", "README"]);
        assert_eq!(result.counts.not_blob, 2);
        assert_eq!(result.counts.excluded_dir, 2);
        assert_eq!(result.counts.hidden_path, 2);
        assert_eq!(result.counts.binary_extension, 3);
        assert_eq!(result.counts.total() + result.kept.len(), entries.len());
    }

    #[test]
    fn test_only_first_segment_hidden_rule() {
        let filter = PathFilter::default();
        assert_eq!(
            filter.check(&entry("src/.env.example", EntryKind::Blob)),
            None
        );
        assert_eq!(
            filter.check(&entry(".env", EntryKind::Blob)),
            Some(FilterReason::HiddenPath)
        );
    }

    #[test]
    fn test_dot_named_binary_file_is_dropped() {
        let filter = PathFilter::default();
        for path in ["assets/.svg", "img/.PNG", "a/b/.ico"] {
            assert_eq!(
                filter.check(&entry(path, EntryKind::Blob)),
                Some(FilterReason::BinaryExtension),
                "{path}"
            );
        }
        assert_eq!(filter.check(&entry("assets/.svgrc", EntryKind::Blob)), None);
        assert_eq!(filter.check(&entry("docs/notes.", EntryKind::Blob)), None);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("src/index.test.ts"), Some("ts"));
        assert_eq!(extension_of("assets/.svg"), Some("svg"));
        assert_eq!(extension_of("Makefile"), None);
        assert_eq!(extension_of("dir.d/README"), None);
    }

    #[test]
    fn test_excluded_dir_must_match_whole_segment() {
        let filter = PathFilter::new(["node_modules"], ["png"]);
        assert_eq!(
            filter.check(&entry("my_node_modules/a.js", EntryKind::Blob)),
            None
        );
    }

    #[test]
    fn test_custom_extensions_normalized() {
        let filter = PathFilter::new(Vec::<String>::new(), [".PSD"]);
        assert_eq!(
            filter.check(&entry("art/cover.psd", EntryKind::Blob)),
            Some(FilterReason::BinaryExtension)
        );
        assert_eq!(filter.check(&entry("svg", EntryKind::Blob)), None);
    }
}
