//! Manifest diffing: revision deltas, branch-naming errors, membership.
//!
//! The diff engine emits neutral row values; everything about sheet layout,
//! links, and styling belongs to the report layer.

use serde::{Deserialize, Serialize};

use crate::manifest::{Project, ProjectSet};
use crate::refs::short_revision;

/// Problem label when a premp keyword is missing.
const PROBLEM_PREMP: &str = "沒改成 premp";
/// Problem label when a wave keyword is missing.
const PROBLEM_WAVE: &str = "沒改成 wave";
/// Problem label when a wave.backup keyword is missing.
const PROBLEM_WAVE_BACKUP: &str = "沒改成 wavebackup";

/// A project whose revision differs between the two sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionDelta {
    /// The base-side project.
    pub base: Project,
    /// The compare-side project.
    pub compare: Project,
    /// Base revision shortened for display (first 7 chars of a hash).
    pub base_short: String,
    /// Compare revision shortened for display.
    pub compare_short: String,
}

/// A compare-side project whose upstream/dest-branch lacks the keyword the
/// folder pair calls for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchError {
    /// The compare-side project.
    pub project: Project,
    /// Problem label; blank when `has_wave` is set.
    pub problem: String,
    /// Whether upstream or dest-branch contains `wave`.
    pub has_wave: bool,
}

/// Whether a project was added to or removed from the compare side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipState {
    /// Present only on the compare side.
    Added,
    /// Present only on the base side.
    Removed,
}

impl MembershipState {
    /// Label used on the lost_project sheet.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

/// A project present on only one side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    /// Added or removed.
    pub state: MembershipState,
    /// The single-side project.
    pub project: Project,
}

/// The three difference streams for one folder pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestDiff {
    /// Projects whose revisions differ.
    pub revision_deltas: Vec<RevisionDelta>,
    /// Compare-side branch-naming problems.
    pub branch_errors: Vec<BranchError>,
    /// Added/removed projects.
    pub membership: Vec<Membership>,
}

/// Diff two project sets.
///
/// Ordering is stable: base iteration order first, compare-only entries
/// second. Serial numbers are assigned later, after global collation.
#[must_use]
pub fn diff_project_sets(
    base: &ProjectSet,
    compare: &ProjectSet,
    base_folder: &str,
    compare_folder: &str,
) -> ManifestDiff {
    let mut diff = ManifestDiff::default();

    for base_project in base.iter() {
        match compare.get(&base_project.key()) {
            Some(compare_project) => {
                if base_project.revision != compare_project.revision
                    || compare_project.revision.is_empty()
                {
                    diff.revision_deltas.push(RevisionDelta {
                        base_short: short_revision(&base_project.revision),
                        compare_short: short_revision(&compare_project.revision),
                        base: base_project.clone(),
                        compare: compare_project.clone(),
                    });
                }
            }
            None => diff.membership.push(Membership {
                state: MembershipState::Removed,
                project: base_project.clone(),
            }),
        }
    }

    for compare_project in compare.iter() {
        if !base.contains_key(&compare_project.key()) {
            diff.membership.push(Membership {
                state: MembershipState::Added,
                project: compare_project.clone(),
            });
        }
    }

    if let Some(keyword) = expected_keyword(base_folder, compare_folder) {
        for project in compare.iter() {
            let upstream = &project.upstream;
            let dest_branch = &project.dest_branch;
            if upstream.is_empty() || dest_branch.is_empty() {
                continue;
            }
            if upstream.contains(keyword) || dest_branch.contains(keyword) {
                continue;
            }
            let has_wave = upstream.contains("wave") || dest_branch.contains("wave");
            let problem = if has_wave {
                String::new()
            } else {
                problem_label(keyword).to_string()
            };
            diff.branch_errors.push(BranchError {
                project: project.clone(),
                problem,
                has_wave,
            });
        }
    }

    diff
}

/// Which keyword the compare side's branches must carry, given the folder
/// names of the pair. Returns `None` when the pair implies no naming rule.
#[must_use]
pub fn expected_keyword(base_folder: &str, compare_folder: &str) -> Option<&'static str> {
    if compare_folder.ends_with("-wave.backup") {
        return Some("wave.backup");
    }
    if compare_folder.ends_with("-wave") {
        if base_folder.contains("-premp") {
            return Some("wave");
        }
        return None;
    }
    if compare_folder.ends_with("-premp") && !base_folder.contains("premp") {
        return Some("premp");
    }
    None
}

fn problem_label(keyword: &str) -> &'static str {
    match keyword {
        "premp" => PROBLEM_PREMP,
        "wave" => PROBLEM_WAVE,
        _ => PROBLEM_WAVE_BACKUP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str, path: &str, revision: &str) -> Project {
        Project {
            name: name.to_string(),
            path: path.to_string(),
            revision: revision.to_string(),
            ..Project::default()
        }
    }

    fn set(projects: Vec<Project>) -> ProjectSet {
        projects.into_iter().collect()
    }

    #[test]
    fn test_identity_diff_is_empty() {
        let base = set(vec![
            project("a", "p1", "realtek/master"),
            project("b", "p2", "refs/tags/v1"),
        ]);
        let diff = diff_project_sets(&base, &base.clone(), "X", "X-premp");
        assert!(diff.revision_deltas.is_empty());
        assert!(diff.membership.is_empty());
    }

    #[test]
    fn test_revision_delta_with_short_hashes() {
        let base = set(vec![project(
            "a",
            "p1",
            "aaaaaaa111111111111111111111111111111111",
        )]);
        let compare = set(vec![project(
            "a",
            "p1",
            "bbbbbbb222222222222222222222222222222222",
        )]);
        let diff = diff_project_sets(&base, &compare, "X", "Y");
        assert_eq!(diff.revision_deltas.len(), 1);
        assert_eq!(diff.revision_deltas[0].base_short, "aaaaaaa");
        assert_eq!(diff.revision_deltas[0].compare_short, "bbbbbbb");
    }

    #[test]
    fn test_empty_compare_revision_emits_delta() {
        let base = set(vec![project("a", "p1", "realtek/master")]);
        let compare = set(vec![project("a", "p1", "")]);
        let diff = diff_project_sets(&base, &compare, "X", "Y");
        assert_eq!(diff.revision_deltas.len(), 1);
    }

    #[test]
    fn test_duplicate_name_distinct_paths() {
        let base = set(vec![project("a", "p1", "X"), project("a", "p2", "Y")]);
        let compare = set(vec![project("a", "p1", "X"), project("a", "p2", "Z")]);
        let diff = diff_project_sets(&base, &compare, "A", "B");
        assert_eq!(diff.revision_deltas.len(), 1);
        assert_eq!(diff.revision_deltas[0].base.path, "p2");
    }

    #[test]
    fn test_membership_added_removed() {
        let base = set(vec![project("a", "p1", "r"), project("b", "p2", "r")]);
        let compare = set(vec![project("a", "p1", "r"), project("c", "p3", "r")]);
        let diff = diff_project_sets(&base, &compare, "A", "B");
        assert_eq!(diff.membership.len(), 2);
        assert_eq!(diff.membership[0].state, MembershipState::Removed);
        assert_eq!(diff.membership[0].project.name, "b");
        assert_eq!(diff.membership[1].state, MembershipState::Added);
        assert_eq!(diff.membership[1].project.name, "c");
    }

    #[test]
    fn test_membership_arithmetic() {
        let base = set(vec![
            project("a", "p1", "r"),
            project("b", "p2", "r"),
            project("d", "p4", "r"),
        ]);
        let compare = set(vec![project("a", "p1", "r"), project("c", "p3", "r")]);
        let diff = diff_project_sets(&base, &compare, "A", "B");
        let added = diff
            .membership
            .iter()
            .filter(|m| m.state == MembershipState::Added)
            .count();
        let removed = diff
            .membership
            .iter()
            .filter(|m| m.state == MembershipState::Removed)
            .count();
        let common = base.iter().filter(|p| compare.contains_key(&p.key())).count();
        // |added| + |removed| + |common| == |A ∪ B|
        assert_eq!(added + removed + common, 4);
    }

    #[test]
    fn test_expected_keyword_selection() {
        assert_eq!(expected_keyword("DB2302", "DB2302-premp"), Some("premp"));
        assert_eq!(
            expected_keyword("DB2302-premp", "DB2302-wave"),
            Some("wave")
        );
        assert_eq!(
            expected_keyword("DB2302-wave", "DB2302-wave.backup"),
            Some("wave.backup")
        );
        assert_eq!(expected_keyword("DB2302", "DB2302-wave"), None);
        assert_eq!(expected_keyword("DB2302-premp", "DB2302-premp"), None);
    }

    #[test]
    fn test_branch_error_missing_premp() {
        let mut bad = project("q", "p", "rev");
        bad.upstream = "realtek/android-14/master".to_string();
        bad.dest_branch = "realtek/android-14/master".to_string();
        let compare = set(vec![bad]);
        let diff = diff_project_sets(&ProjectSet::new(), &compare, "X", "X-premp");
        assert_eq!(diff.branch_errors.len(), 1);
        assert_eq!(diff.branch_errors[0].problem, "沒改成 premp");
        assert!(!diff.branch_errors[0].has_wave);
    }

    #[test]
    fn test_branch_error_has_wave_blank_problem() {
        let mut candidate = project("q", "p", "rev");
        candidate.upstream = "realtek/android-14/mp.google-refplus.wave".to_string();
        candidate.dest_branch = "realtek/android-14/mp.google-refplus.wave".to_string();
        let compare = set(vec![candidate]);
        let diff = diff_project_sets(&ProjectSet::new(), &compare, "X", "X-premp");
        // Still emitted, but with a blank problem label.
        assert_eq!(diff.branch_errors.len(), 1);
        assert_eq!(diff.branch_errors[0].problem, "");
        assert!(diff.branch_errors[0].has_wave);
    }

    #[test]
    fn test_branch_error_requires_both_branch_fields() {
        let mut partial = project("q", "p", "rev");
        partial.upstream = "realtek/android-14/master".to_string();
        let compare = set(vec![partial]);
        let diff = diff_project_sets(&ProjectSet::new(), &compare, "X", "X-premp");
        assert!(diff.branch_errors.is_empty());
    }

    #[test]
    fn test_branch_error_keyword_present_no_row() {
        let mut good = project("q", "p", "rev");
        good.upstream = "realtek/android-14/premp.google-refplus".to_string();
        good.dest_branch = "realtek/android-14/premp.google-refplus".to_string();
        let compare = set(vec![good]);
        let diff = diff_project_sets(&ProjectSet::new(), &compare, "X", "X-premp");
        assert!(diff.branch_errors.is_empty());
    }
}
