//! Companion text-file diffing (`F_Version.txt`, `Version.txt`).
//!
//! `F_Version.txt` is a semicolon-separated listing keyed by its first
//! field; only `P_GIT_` lines participate, and only the key plus the git
//! hash and svn fields decide whether two lines differ. `Version.txt` is either an
//! `F_HASH:` stamp or a `key: value` listing. A file present on only one
//! side produces a single sentinel row carrying the full content of the
//! present side.

use serde::{Deserialize, Serialize};

use crate::config::{F_VERSION_FILE, VERSION_FILE};

/// Sentinel for the side where the file exists.
pub const FILE_PRESENT: &str = "(檔案存在)";
/// Sentinel for the side where the file is missing.
pub const FILE_MISSING: &str = "(檔案不存在)";

/// Prefix selecting the lines compared in `F_Version.txt`.
const P_GIT_PREFIX: &str = "P_GIT_";
/// Marker for hash-stamp `Version.txt` files.
const F_HASH_MARKER: &str = "F_HASH:";

/// One text-file difference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDiffRow {
    /// Which file the row came from.
    pub file_type: String,
    /// Base-side folder name.
    pub base_folder: String,
    /// Compare-side folder name.
    pub compare_folder: String,
    /// Base-side line (or presence sentinel).
    pub base_line: String,
    /// Compare-side line (or presence sentinel).
    pub compare_line: String,
    /// Full base-side content backing the row; for one-sided rows, the
    /// full content of whichever side exists.
    pub base_full_content: String,
}

/// Compare two `F_Version.txt` contents.
///
/// `None` means the file is absent on that side.
#[must_use]
pub fn diff_f_version(
    base: Option<&str>,
    compare: Option<&str>,
    base_folder: &str,
    compare_folder: &str,
) -> Vec<VersionDiffRow> {
    diff_text_file(
        F_VERSION_FILE,
        base,
        compare,
        base_folder,
        compare_folder,
        compare_f_version,
    )
}

/// Compare two `Version.txt` contents.
///
/// `None` means the file is absent on that side.
#[must_use]
pub fn diff_version(
    base: Option<&str>,
    compare: Option<&str>,
    base_folder: &str,
    compare_folder: &str,
) -> Vec<VersionDiffRow> {
    diff_text_file(
        VERSION_FILE,
        base,
        compare,
        base_folder,
        compare_folder,
        compare_version,
    )
}

/// Split an `F_Version.txt` line into its semicolon fields.
///
/// The report layer highlights only fields 3 and 4 (git hash, svn number);
/// exposing the split here keeps the index rule in one place.
#[must_use]
pub fn f_version_fields(line: &str) -> Vec<&str> {
    line.split(';').collect()
}

/// Field indices of an `F_Version.txt` line that are significant: these
/// decide whether two lines differ, and they receive display emphasis.
/// Together with the key (field 0) they are the only fields compared;
/// branch and description churn in the other fields is ignored.
pub const F_VERSION_HIGHLIGHT_FIELDS: [usize; 2] = [3, 4];

fn diff_text_file(
    file_type: &str,
    base: Option<&str>,
    compare: Option<&str>,
    base_folder: &str,
    compare_folder: &str,
    compare_fn: impl Fn(&str, &str) -> Vec<(String, String, String)>,
) -> Vec<VersionDiffRow> {
    let row = |base_line: String, compare_line: String, full: String| VersionDiffRow {
        file_type: file_type.to_string(),
        base_folder: base_folder.to_string(),
        compare_folder: compare_folder.to_string(),
        base_line,
        compare_line,
        base_full_content: full,
    };

    match (base, compare) {
        (Some(base), Some(compare)) => compare_fn(base, compare)
            .into_iter()
            .map(|(b, c, full)| row(b, c, full))
            .collect(),
        (Some(base), None) => vec![row(
            FILE_PRESENT.to_string(),
            FILE_MISSING.to_string(),
            base.to_string(),
        )],
        (None, Some(compare)) => vec![row(
            FILE_MISSING.to_string(),
            FILE_PRESENT.to_string(),
            compare.to_string(),
        )],
        (None, None) => Vec::new(),
    }
}

/// Keyed line comparison for `F_Version.txt`: `(base, compare, full)` per
/// differing key.
fn compare_f_version(base: &str, compare: &str) -> Vec<(String, String, String)> {
    let base_lines = p_git_lines(base);
    let compare_lines = p_git_lines(compare);

    let mut rows = Vec::new();
    for (key, base_line) in &base_lines {
        if let Some(compare_line) = compare_lines
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, l)| l)
        {
            if f_version_lines_differ(base_line, compare_line) {
                rows.push((
                    (*base_line).to_string(),
                    (*compare_line).to_string(),
                    (*base_line).to_string(),
                ));
            }
        }
    }
    rows
}

/// Whether two `F_Version.txt` lines differ in a significant field
/// (the key or one of [`F_VERSION_HIGHLIGHT_FIELDS`]).
fn f_version_lines_differ(base: &str, compare: &str) -> bool {
    let base_fields = f_version_fields(base);
    let compare_fields = f_version_fields(compare);
    std::iter::once(0)
        .chain(F_VERSION_HIGHLIGHT_FIELDS)
        .any(|i| base_fields.get(i) != compare_fields.get(i))
}

fn p_git_lines(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(P_GIT_PREFIX))
        .filter_map(|line| line.split(';').next().map(|key| (key, line)))
        .collect()
}

/// `Version.txt` comparison: `F_HASH:` stamp when present, otherwise a
/// `key: value` listing.
fn compare_version(base: &str, compare: &str) -> Vec<(String, String, String)> {
    if base.contains(F_HASH_MARKER) || compare.contains(F_HASH_MARKER) {
        let base_line = f_hash_line(base);
        let compare_line = f_hash_line(compare);
        let base_hash = base_line.map(extract_f_hash).unwrap_or_default();
        let compare_hash = compare_line.map(extract_f_hash).unwrap_or_default();
        if base_hash != compare_hash {
            return vec![(
                base_line.unwrap_or_default().to_string(),
                compare_line.unwrap_or_default().to_string(),
                base_line.unwrap_or_default().to_string(),
            )];
        }
        return Vec::new();
    }

    let base_pairs = key_value_lines(base);
    let compare_pairs = key_value_lines(compare);

    let mut rows = Vec::new();
    for (key, base_value, base_line) in &base_pairs {
        if let Some((_, compare_value, _)) = compare_pairs.iter().find(|(k, _, _)| k == key) {
            if base_value != compare_value {
                rows.push((
                    format!("{key}: {base_value}"),
                    format!("{key}: {compare_value}"),
                    (*base_line).to_string(),
                ));
            }
        }
    }
    rows
}

fn f_hash_line(content: &str) -> Option<&str> {
    content
        .lines()
        .map(str::trim)
        .find(|line| line.contains(F_HASH_MARKER))
}

fn extract_f_hash(line: &str) -> String {
    line.split_once(F_HASH_MARKER)
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default()
}

/// Lines with a `:` become `(key, value, full_line)`; comment lines are
/// skipped, lines without `:` are ignored.
fn key_value_lines(content: &str) -> Vec<(&str, &str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with("//"))
        .filter_map(|line| {
            line.split_once(':')
                .map(|(key, value)| (key.trim(), value.trim(), line))
        })
        .collect()
}
