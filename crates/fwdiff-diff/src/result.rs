//! Comparison result types.
//!
//! A [`ComparisonResult`] holds the four classification lists produced by the
//! differ. Child results are folded into their parent with
//! [`ComparisonResult::merge_child`], which prefixes every child path with the
//! subdirectory name so all paths stay relative to the two compared roots.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Join a relative path under a directory prefix using `/`.
pub(crate) fn join_rel(prefix: &str, path: &str) -> String {
    format!("{prefix}/{path}")
}

/// The classification of a relative path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Present only in the right tree.
    Added,
    /// Present only in the left tree.
    Removed,
    /// Present in both, with different content.
    Changed,
    /// Present in both, with identical content.
    Unchanged,
}

impl Category {
    /// All categories in report order.
    pub const ALL: [Category; 4] = [
        Category::Added,
        Category::Removed,
        Category::Changed,
        Category::Unchanged,
    ];

    /// Uppercase section label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Removed => "REMOVED",
            Self::Changed => "CHANGED",
            Self::Unchanged => "UNCHANGED",
        }
    }
}

/// Four-way classification of every relative path across two trees.
///
/// Each path appears in exactly one list for results produced by the differ;
/// [`ComparisonResult::duplicates`] checks this.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Paths present only on the right.
    pub added: Vec<String>,
    /// Paths present only on the left.
    pub removed: Vec<String>,
    /// Paths present on both sides with differing content.
    pub changed: Vec<String>,
    /// Paths present on both sides with identical content.
    pub unchanged: Vec<String>,
}

impl ComparisonResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// The paths in one category.
    pub fn entries(&self, category: Category) -> &[String] {
        match category {
            Category::Added => &self.added,
            Category::Removed => &self.removed,
            Category::Changed => &self.changed,
            Category::Unchanged => &self.unchanged,
        }
    }

    fn entries_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Added => &mut self.added,
            Category::Removed => &mut self.removed,
            Category::Changed => &mut self.changed,
            Category::Unchanged => &mut self.unchanged,
        }
    }

    /// Record a path under a category.
    pub fn push(&mut self, category: Category, path: impl Into<String>) {
        self.entries_mut(category).push(path.into());
    }

    /// Iterate over `(category, paths)` in report order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        Category::ALL.into_iter().map(move |c| (c, self.entries(c)))
    }

    /// Return a copy with every path re-rooted under `prefix`.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        for category in Category::ALL {
            for path in self.entries_mut(category) {
                *path = join_rel(prefix, path);
            }
        }
        self
    }

    /// Fold the result of a subdirectory comparison into this one.
    ///
    /// Each of the child's four lists is appended to the matching list here,
    /// with `prefix/` prepended to every child path.
    pub fn merge_child(&mut self, prefix: &str, child: ComparisonResult) {
        let child = child.with_prefix(prefix);
        self.added.extend(child.added);
        self.removed.extend(child.removed);
        self.changed.extend(child.changed);
        self.unchanged.extend(child.unchanged);
    }

    /// Sort each list lexicographically.
    pub fn sorted(mut self) -> Self {
        self.added.sort();
        self.removed.sort();
        self.changed.sort();
        self.unchanged.sort();
        self
    }

    /// The result of comparing in the opposite direction.
    pub fn swapped(self) -> Self {
        Self {
            added: self.removed,
            removed: self.added,
            changed: self.changed,
            unchanged: self.unchanged,
        }
    }

    /// Returns `true` if nothing was added, removed, or changed.
    pub fn is_identical(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Total number of entries across all categories.
    pub fn total_entries(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len() + self.unchanged.len()
    }

    /// Per-category counts.
    pub fn counts(&self) -> Summary {
        Summary {
            added: self.added.len(),
            removed: self.removed.len(),
            changed: self.changed.len(),
            unchanged: self.unchanged.len(),
        }
    }

    /// The category holding `path`, if any.
    pub fn category_of(&self, path: &str) -> Option<Category> {
        self.iter()
            .find(|(_, paths)| paths.iter().any(|p| p == path))
            .map(|(c, _)| c)
    }

    /// Paths recorded more than once, in any combination of categories.
    pub fn duplicates(&self) -> Vec<String> {
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, paths) in self.iter() {
            for p in paths {
                *seen.entry(p.as_str()).or_default() += 1;
            }
        }
        seen.into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(p, _)| p.to_string())
            .collect()
    }
}

/// Entry counts per category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub unchanged: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} removed, {} changed, {} unchanged",
            self.added, self.removed, self.changed, self.unchanged
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ComparisonResult {
        ComparisonResult {
            added: vec!["new.bin".into()],
            removed: vec!["old.bin".into()],
            changed: vec!["kernel".into()],
            unchanged: vec!["etc".into(), "boot".into()],
        }
    }

    #[test]
    fn empty_result_is_identical() {
        let r = ComparisonResult::new();
        assert!(r.is_identical());
        assert_eq!(r.total_entries(), 0);
        assert!(r.duplicates().is_empty());
    }

    #[test]
    fn unchanged_only_is_identical() {
        let mut r = ComparisonResult::new();
        r.push(Category::Unchanged, "a");
        assert!(r.is_identical());
        r.push(Category::Changed, "b");
        assert!(!r.is_identical());
    }

    #[test]
    fn merge_child_prefixes_every_category() {
        let mut parent = ComparisonResult::new();
        parent.push(Category::Unchanged, "top.txt");
        parent.merge_child("sub", sample());

        assert_eq!(parent.added, vec!["sub/new.bin"]);
        assert_eq!(parent.removed, vec!["sub/old.bin"]);
        assert_eq!(parent.changed, vec!["sub/kernel"]);
        assert_eq!(parent.unchanged, vec!["top.txt", "sub/etc", "sub/boot"]);
    }

    #[test]
    fn nested_merge_builds_full_paths() {
        let mut leaf = ComparisonResult::new();
        leaf.push(Category::Changed, "a.txt");
        let mut mid = ComparisonResult::new();
        mid.merge_child("inner", leaf);
        let mut root = ComparisonResult::new();
        root.merge_child("outer", mid);
        assert_eq!(root.changed, vec!["outer/inner/a.txt"]);
    }

    #[test]
    fn swapped_exchanges_added_and_removed() {
        let s = sample().swapped();
        assert_eq!(s.added, vec!["old.bin"]);
        assert_eq!(s.removed, vec!["new.bin"]);
        assert_eq!(s.changed, vec!["kernel"]);
        assert_eq!(s.swapped(), sample());
    }

    #[test]
    fn sorted_orders_each_list() {
        let s = sample().sorted();
        assert_eq!(s.unchanged, vec!["boot", "etc"]);
    }

    #[test]
    fn category_lookup() {
        let r = sample();
        assert_eq!(r.category_of("kernel"), Some(Category::Changed));
        assert_eq!(r.category_of("boot"), Some(Category::Unchanged));
        assert_eq!(r.category_of("missing"), None);
    }

    #[test]
    fn duplicates_detects_overlap() {
        let mut r = sample();
        r.push(Category::Added, "kernel");
        assert_eq!(r.duplicates(), vec!["kernel"]);
    }

    #[test]
    fn counts_and_summary() {
        let c = sample().counts();
        assert_eq!(c, Summary { added: 1, removed: 1, changed: 1, unchanged: 2 });
        assert_eq!(c.to_string(), "1 added, 1 removed, 1 changed, 2 unchanged");
        assert_eq!(sample().total_entries(), 5);
    }

    #[test]
    fn iter_follows_report_order() {
        let labels: Vec<_> = sample().iter().map(|(c, _)| c.label()).collect();
        assert_eq!(labels, vec!["ADDED", "REMOVED", "CHANGED", "UNCHANGED"]);
    }
}
