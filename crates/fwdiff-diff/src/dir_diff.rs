//! Recursive directory diff: compare two trees and classify every path.
//!
//! Entries are matched by name at each level. Names on one side only are
//! added or removed, common files are compared by content digest, and common
//! subdirectories are recursed into and merged with their name as prefix.
//!
//! Names are matched as raw OS strings and only rendered (lossily) when a
//! path is recorded in the result, so non-UTF-8 names compare correctly.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use fwdiff_crypto::ContentHasher;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{DiffError, DiffResult};
use crate::result::{join_rel, Category, ComparisonResult};

/// What a directory entry resolves to after following symlinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// A dangling or self-referencing symlink, or a non-regular file
    /// (device node, fifo, socket). Never hashed.
    Special,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Dir => f.write_str("directory"),
            Self::Special => f.write_str("special file"),
        }
    }
}

/// How to treat a name whose entry kind differs between the two sides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeConflictPolicy {
    /// Report the name as changed.
    #[default]
    Changed,
    /// Abort the comparison with [`DiffError::TypeConflict`].
    Error,
}

impl fmt::Display for TypeConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changed => f.write_str("changed"),
            Self::Error => f.write_str("error"),
        }
    }
}

impl FromStr for TypeConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "changed" => Ok(Self::Changed),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown type conflict policy: {other}")),
        }
    }
}

/// Canonical paths of the directories currently being compared, per side.
#[derive(Default)]
struct Ancestors {
    left: Vec<PathBuf>,
    right: Vec<PathBuf>,
}

/// Recursive directory comparator.
#[derive(Clone, Debug, Default)]
pub struct DirDiffer {
    hasher: ContentHasher,
    type_conflict: TypeConflictPolicy,
    expand_one_sided: bool,
}

impl DirDiffer {
    /// A differ with default options: SHA-256, type conflicts reported as
    /// changed, one-sided directories reported by name.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hasher(mut self, hasher: ContentHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_type_conflict(mut self, policy: TypeConflictPolicy) -> Self {
        self.type_conflict = policy;
        self
    }

    /// List every file beneath a directory that exists on one side only,
    /// instead of the directory itself.
    pub fn with_expand_one_sided(mut self, expand: bool) -> Self {
        self.expand_one_sided = expand;
        self
    }

    pub fn hasher(&self) -> &ContentHasher {
        &self.hasher
    }

    /// Compare `left` against `right`.
    ///
    /// Paths in the result are relative to the two roots. Entries within each
    /// list come out in name order per directory; callers wanting a global
    /// order should call [`ComparisonResult::sorted`].
    ///
    /// A symlinked directory that leads back into one of its own ancestors is
    /// not descended into; it is compared by link target like a special file.
    pub fn compare(&self, left: &Path, right: &Path) -> DiffResult<ComparisonResult> {
        let mut ancestors = Ancestors::default();
        self.compare_tree(left, right, &mut ancestors)
    }

    fn compare_tree(
        &self,
        left: &Path,
        right: &Path,
        ancestors: &mut Ancestors,
    ) -> DiffResult<ComparisonResult> {
        debug!(left = %left.display(), right = %right.display(), "comparing directories");
        ancestors.left.push(canonical(left)?);
        ancestors.right.push(canonical(right)?);

        let result = self.compare_entries(left, right, ancestors);

        ancestors.left.pop();
        ancestors.right.pop();
        result
    }

    fn compare_entries(
        &self,
        left: &Path,
        right: &Path,
        ancestors: &mut Ancestors,
    ) -> DiffResult<ComparisonResult> {
        let left_entries = list_entries(left)?;
        let right_entries = list_entries(right)?;
        let mut result = ComparisonResult::new();

        for (name, left_kind) in &left_entries {
            let Some(right_kind) = right_entries.get(name) else {
                self.record_one_sided(&mut result, Category::Removed, left, name, *left_kind)?;
                continue;
            };
            let (left_path, right_path) = (left.join(name), right.join(name));
            let shown = name.to_string_lossy();

            match (left_kind, right_kind) {
                (EntryKind::File, EntryKind::File) => {
                    let same = self.same_content(&left_path, &right_path)?;
                    result.push(classify(same), shown);
                }
                (EntryKind::Dir, EntryKind::Dir) => {
                    if is_loop(&left_path, &ancestors.left)? || is_loop(&right_path, &ancestors.right)? {
                        warn!("not following directory loop at {:?}", left_path);
                        result.push(classify(same_special(&left_path, &right_path)), shown);
                        continue;
                    }
                    let child = self
                        .compare_tree(&left_path, &right_path, ancestors)
                        .map_err(|e| e.under(&shown))?;
                    result.merge_child(&shown, child);
                }
                (EntryKind::Special, EntryKind::Special) => {
                    result.push(classify(same_special(&left_path, &right_path)), shown);
                }
                (l, r) => match self.type_conflict {
                    TypeConflictPolicy::Changed => {
                        debug!(path = %shown, left = %l, right = %r, "type conflict reported as changed");
                        result.push(Category::Changed, shown);
                    }
                    TypeConflictPolicy::Error => {
                        return Err(DiffError::TypeConflict {
                            path: shown.into_owned(),
                            left: *l,
                            right: *r,
                        });
                    }
                },
            }
        }

        for (name, right_kind) in &right_entries {
            if !left_entries.contains_key(name) {
                self.record_one_sided(&mut result, Category::Added, right, name, *right_kind)?;
            }
        }

        Ok(result)
    }

    fn same_content(&self, left: &Path, right: &Path) -> DiffResult<bool> {
        let hash = |path: &Path| {
            self.hasher.hash_file(path).map_err(|source| DiffError::Hash {
                path: path.to_path_buf(),
                source,
            })
        };
        let (l, r) = (hash(left)?, hash(right)?);
        if l != r {
            debug!(path = %right.display(), left = %l, right = %r, "content differs");
        }
        Ok(l == r)
    }

    fn record_one_sided(
        &self,
        result: &mut ComparisonResult,
        category: Category,
        parent: &Path,
        name: &OsStr,
        kind: EntryKind,
    ) -> DiffResult<()> {
        let shown = name.to_string_lossy();
        if kind == EntryKind::Dir && self.expand_one_sided {
            let files = list_files_recursive(&parent.join(name))?;
            if !files.is_empty() {
                for file in files {
                    result.push(category, join_rel(&shown, &file));
                }
                return Ok(());
            }
        }
        result.push(category, shown);
        Ok(())
    }
}

/// Compare two directory trees with default options.
pub fn compare_dirs(left: &Path, right: &Path) -> DiffResult<ComparisonResult> {
    DirDiffer::new().compare(left, right)
}

fn classify(same: bool) -> Category {
    if same {
        Category::Unchanged
    } else {
        Category::Changed
    }
}

fn canonical(path: &Path) -> DiffResult<PathBuf> {
    std::fs::canonicalize(path).map_err(|source| DiffError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_loop(dir: &Path, ancestors: &[PathBuf]) -> DiffResult<bool> {
    let target = canonical(dir)?;
    Ok(ancestors.contains(&target))
}

/// Special entries match when both are links to the same target, or both
/// are non-link special files.
fn same_special(left: &Path, right: &Path) -> bool {
    match (std::fs::read_link(left), std::fs::read_link(right)) {
        (Ok(l), Ok(r)) => l == r,
        (Err(_), Err(_)) => true,
        _ => false,
    }
}

/// Classify an entry, following symlinks.
///
/// A link whose target cannot be resolved is [`EntryKind::Special`]; any
/// other metadata failure is an error.
fn entry_kind(path: &Path) -> std::io::Result<EntryKind> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(EntryKind::File),
        Ok(meta) if meta.is_dir() => Ok(EntryKind::Dir),
        Ok(_) => Ok(EntryKind::Special),
        Err(e) => match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                debug!("unresolvable symlink {:?}: {}", path, e);
                Ok(EntryKind::Special)
            }
            _ => Err(e),
        },
    }
}

fn list_entries(dir: &Path) -> DiffResult<BTreeMap<OsString, EntryKind>> {
    let io_err = |path: &Path, source| DiffError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut entries = BTreeMap::new();

    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let kind = entry_kind(&path).map_err(|e| io_err(&path, e))?;
        entries.insert(entry.file_name(), kind);
    }

    Ok(entries)
}

/// Non-directory entries beneath `root`, relative to it, `/`-joined and in
/// name order. Dangling links and links looping back into the walk are
/// listed by their own path instead of failing the walk.
fn list_files_recursive(root: &Path) -> DiffResult<Vec<String>> {
    let rel_of = |path: &Path| -> Option<String> {
        let rel = path.strip_prefix(root).ok()?;
        Some(
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        )
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                let is_link = std::fs::symlink_metadata(&path)
                    .map(|m| m.file_type().is_symlink())
                    .unwrap_or(false);
                if e.loop_ancestor().is_some() || (is_link && e.io_error().is_some()) {
                    debug!("listing unresolvable link {:?}: {}", path, e);
                    files.extend(rel_of(&path));
                    continue;
                }
                return Err(DiffError::Io {
                    path,
                    source: e.into(),
                });
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        files.extend(rel_of(entry.path()));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn trees() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("left");
        let right = dir.path().join("right");
        std::fs::create_dir_all(&left).unwrap();
        std::fs::create_dir_all(&right).unwrap();
        (dir, left, right)
    }

    #[test]
    fn identical_trees_all_unchanged() {
        let (_dir, left, right) = trees();
        for root in [&left, &right] {
            write(root, "a.txt", "alpha");
            write(root, "etc/config", "cfg");
            write(root, "etc/init.d/rc", "#!/bin/sh");
        }

        let r = compare_dirs(&left, &right).unwrap().sorted();
        assert!(r.added.is_empty());
        assert!(r.removed.is_empty());
        assert!(r.changed.is_empty());
        assert_eq!(r.unchanged, vec!["a.txt", "etc/config", "etc/init.d/rc"]);
    }

    #[test]
    fn added_file_scenario() {
        let (_dir, left, right) = trees();
        write(&left, "x", "hello");
        write(&right, "x", "hello");
        write(&right, "y", "world");

        let r = compare_dirs(&left, &right).unwrap();
        assert_eq!(r.added, vec!["y"]);
        assert!(r.removed.is_empty());
        assert!(r.changed.is_empty());
        assert_eq!(r.unchanged, vec!["x"]);
    }

    #[test]
    fn changed_file_scenario() {
        let (_dir, left, right) = trees();
        write(&left, "x", "v1");
        write(&right, "x", "v2");

        let r = compare_dirs(&left, &right).unwrap();
        assert_eq!(r.changed, vec!["x"]);
        assert!(r.added.is_empty());
        assert!(r.removed.is_empty());
        assert!(r.unchanged.is_empty());
    }

    #[test]
    fn removed_file_appears_once() {
        let (_dir, left, right) = trees();
        write(&left, "gone.ko", "module");
        write(&left, "kept", "k");
        write(&right, "kept", "k");

        let r = compare_dirs(&left, &right).unwrap();
        assert_eq!(r.removed, vec!["gone.ko"]);
        assert_eq!(r.category_of("gone.ko"), Some(Category::Removed));
        assert!(r.duplicates().is_empty());
    }

    #[test]
    fn nested_change_is_prefixed() {
        let (_dir, left, right) = trees();
        write(&left, "sub/a.txt", "one");
        write(&right, "sub/a.txt", "two");

        let r = compare_dirs(&left, &right).unwrap();
        assert_eq!(r.changed, vec!["sub/a.txt"]);
        assert_eq!(r.total_entries(), 1);
    }

    #[test]
    fn reversed_comparison_swaps_added_and_removed() {
        let (_dir, left, right) = trees();
        write(&left, "only_left", "l");
        write(&right, "only_right", "r");
        write(&left, "both", "1");
        write(&right, "both", "2");
        write(&left, "d/same", "s");
        write(&right, "d/same", "s");

        let forward = compare_dirs(&left, &right).unwrap().sorted();
        let backward = compare_dirs(&right, &left).unwrap().sorted();
        assert_eq!(forward, backward.swapped());
    }

    #[test]
    fn empty_directories_compare_clean() {
        let (_dir, left, right) = trees();
        std::fs::create_dir_all(left.join("empty")).unwrap();
        std::fs::create_dir_all(right.join("empty")).unwrap();

        let r = compare_dirs(&left, &right).unwrap();
        assert_eq!(r.total_entries(), 0);
        assert!(r.is_identical());
    }

    #[test]
    fn one_sided_directory_reported_by_name() {
        let (_dir, left, right) = trees();
        write(&right, "lib/modules/a.ko", "a");
        write(&right, "lib/modules/b.ko", "b");

        let r = compare_dirs(&left, &right).unwrap();
        assert_eq!(r.added, vec!["lib"]);
    }

    #[test]
    fn one_sided_directory_expanded() {
        let (_dir, left, right) = trees();
        write(&left, "lib/modules/a.ko", "a");
        write(&left, "lib/modules/b.ko", "b");
        std::fs::create_dir_all(left.join("var/empty")).unwrap();

        let r = DirDiffer::new()
            .with_expand_one_sided(true)
            .compare(&left, &right)
            .unwrap();
        assert_eq!(r.removed, vec!["lib/modules/a.ko", "lib/modules/b.ko", "var"]);
    }

    #[test]
    fn type_conflict_reported_as_changed_by_default() {
        let (_dir, left, right) = trees();
        write(&left, "bin", "a file");
        write(&right, "bin/busybox", "elf");

        let r = compare_dirs(&left, &right).unwrap();
        assert_eq!(r.changed, vec!["bin"]);
        assert_eq!(r.total_entries(), 1);
    }

    #[test]
    fn type_conflict_error_policy_carries_full_path() {
        let (_dir, left, right) = trees();
        write(&left, "usr/share/data", "a file");
        write(&right, "usr/share/data/x", "nested");

        let err = DirDiffer::new()
            .with_type_conflict(TypeConflictPolicy::Error)
            .compare(&left, &right)
            .unwrap_err();
        match err {
            DiffError::TypeConflict { path, left, right } => {
                assert_eq!(path, "usr/share/data");
                assert_eq!(left, EntryKind::File);
                assert_eq!(right, EntryKind::Dir);
            }
            other => panic!("expected TypeConflict, got {:?}", other),
        }
    }

    #[test]
    fn missing_root_is_io_error() {
        let (_dir, left, right) = trees();
        let missing = right.join("does-not-exist");
        let err = compare_dirs(&left, &missing).unwrap_err();
        assert!(matches!(err, DiffError::Io { path, .. } if path == missing));
    }

    #[test]
    fn blake3_hasher_detects_changes() {
        let (_dir, left, right) = trees();
        write(&left, "f", "a");
        write(&right, "f", "b");
        let r = DirDiffer::new()
            .with_hasher(ContentHasher::BLAKE3)
            .compare(&left, &right)
            .unwrap();
        assert_eq!(r.changed, vec!["f"]);
    }

    #[test]
    fn policy_parse() {
        assert_eq!("error".parse::<TypeConflictPolicy>().unwrap(), TypeConflictPolicy::Error);
        assert_eq!("Changed".parse::<TypeConflictPolicy>().unwrap(), TypeConflictPolicy::Changed);
        assert!("ignore".parse::<TypeConflictPolicy>().is_err());
    }

    #[cfg(target_os = "linux")]
    fn non_utf8(name: &[u8]) -> OsString {
        use std::os::unix::ffi::OsStringExt;
        OsString::from_vec(name.to_vec())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_matched_by_raw_bytes() {
        let (_dir, left, right) = trees();
        let same = non_utf8(b"caf\xe9.cfg");
        let diff = non_utf8(b"r\xe9seau.conf");
        std::fs::write(left.join(&same), "a").unwrap();
        std::fs::write(right.join(&same), "a").unwrap();
        std::fs::create_dir(left.join(non_utf8(b"d\xff"))).unwrap();
        std::fs::create_dir(right.join(non_utf8(b"d\xff"))).unwrap();
        std::fs::write(left.join(non_utf8(b"d\xff")).join(&diff), "v1").unwrap();
        std::fs::write(right.join(non_utf8(b"d\xff")).join(&diff), "v2").unwrap();

        let r = compare_dirs(&left, &right).unwrap();
        assert_eq!(r.unchanged, vec!["caf\u{fffd}.cfg"]);
        assert_eq!(r.changed, vec!["d\u{fffd}/r\u{fffd}seau.conf"]);
        assert!(r.added.is_empty() && r.removed.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn one_sided_dangling_symlink_is_reported() {
        let (_dir, left, right) = trees();
        std::os::unix::fs::symlink("/nonexistent/busybox", left.join("sh")).unwrap();

        let r = compare_dirs(&left, &right).unwrap();
        assert_eq!(r.removed, vec!["sh"]);
        assert_eq!(compare_dirs(&right, &left).unwrap().added, vec!["sh"]);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlinks_compare_by_target() {
        let (_dir, left, right) = trees();
        std::os::unix::fs::symlink("/bin/busybox", left.join("sh")).unwrap();
        std::os::unix::fs::symlink("/bin/busybox", right.join("sh")).unwrap();
        std::os::unix::fs::symlink("/lib/libc.so.0", left.join("libc.so")).unwrap();
        std::os::unix::fs::symlink("/lib/libc.so.1", right.join("libc.so")).unwrap();
        std::os::unix::fs::symlink("/missing", left.join("init")).unwrap();
        write(&right, "init", "#!/bin/sh");

        let r = compare_dirs(&left, &right).unwrap().sorted();
        assert_eq!(r.unchanged, vec!["sh"]);
        assert_eq!(r.changed, vec!["init", "libc.so"]);

        let err = DirDiffer::new()
            .with_type_conflict(TypeConflictPolicy::Error)
            .compare(&left, &right)
            .unwrap_err();
        assert!(matches!(
            err,
            DiffError::TypeConflict { left: EntryKind::Special, right: EntryKind::File, .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn expand_lists_dangling_symlinks() {
        let (_dir, left, right) = trees();
        write(&left, "bin/busybox", "elf");
        std::os::unix::fs::symlink("/bin/busybox", left.join("bin/sh")).unwrap();

        let r = DirDiffer::new()
            .with_expand_one_sided(true)
            .compare(&left, &right)
            .unwrap();
        assert_eq!(r.removed, vec!["bin/busybox", "bin/sh"]);
    }

    #[cfg(unix)]
    #[test]
    fn directory_loop_is_not_followed() {
        let (_dir, left, right) = trees();
        for root in [&left, &right] {
            write(root, "d/f", "x");
            std::os::unix::fs::symlink(".", root.join("d/self")).unwrap();
        }

        let r = compare_dirs(&left, &right).unwrap().sorted();
        assert_eq!(r.unchanged, vec!["d/f", "d/self"]);
        assert!(r.duplicates().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn expand_stops_at_directory_loop() {
        let (_dir, left, right) = trees();
        write(&right, "d/f", "x");
        std::os::unix::fs::symlink(".", right.join("d/self")).unwrap();

        let r = DirDiffer::new()
            .with_expand_one_sided(true)
            .compare(&left, &right)
            .unwrap();
        assert_eq!(r.added, vec!["d/f", "d/self"]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, left, right) = trees();
        write(&left, "etc/shadow", "x");
        write(&right, "etc/shadow", "x");
        let locked = left.join("etc");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::read_dir(&locked).is_ok() {
            // Privileged users bypass permission bits.
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let err = compare_dirs(&left, &right).unwrap_err();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(matches!(err, DiffError::Io { ref path, .. } if *path == locked));
    }

    fn tree_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
        // Directory and file names come from disjoint alphabets so no name
        // can be a file in one tree and a directory in the other.
        let path = (proptest::option::of(0..3u8), 0..4u8).prop_map(|(dir, file)| match dir {
            Some(d) => format!("d{d}/f{file}"),
            None => format!("f{file}"),
        });
        proptest::collection::btree_map(path, "[ab]{0,2}", 0..8)
    }

    fn materialize(root: &Path, files: &BTreeMap<String, String>) {
        std::fs::create_dir_all(root).unwrap();
        for (rel, content) in files {
            write(root, rel, content);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn comparison_is_symmetric_and_partitioned(
            a in tree_strategy(),
            b in tree_strategy(),
        ) {
            let (_dir, left, right) = trees();
            materialize(&left, &a);
            materialize(&right, &b);

            let forward = DirDiffer::new()
                .with_expand_one_sided(true)
                .compare(&left, &right)
                .unwrap()
                .sorted();
            let backward = DirDiffer::new()
                .with_expand_one_sided(true)
                .compare(&right, &left)
                .unwrap()
                .sorted();

            prop_assert!(forward.duplicates().is_empty());
            prop_assert_eq!(&forward, &backward.swapped());

            let mut all: Vec<&String> = a.keys().chain(b.keys()).collect();
            all.sort();
            all.dedup();
            prop_assert_eq!(forward.total_entries(), all.len());
        }
    }
}
