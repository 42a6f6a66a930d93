//! Report model: sheet row schemas, link derivation, and the sink seam.
//!
//! The orchestrator collates scenario results into a [`SummaryReport`] whose
//! sheet rows carry globally renumbered serial numbers. Sinks (xlsx, json)
//! only render; every value they need is already in the rows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{CompareConfig, PREBUILT_REMOTE};
use crate::refs::{classify, RefKind};

/// Sheet name for the always-present summary.
pub const SHEET_SUMMARY: &str = "摘要";
/// Sheet name for revision deltas.
pub const SHEET_REVISION_DIFF: &str = "revision_diff";
/// Sheet name for branch-naming errors.
pub const SHEET_BRANCH_ERROR: &str = "branch_error";
/// Sheet name for added/removed projects.
pub const SHEET_LOST_PROJECT: &str = "lost_project";
/// Sheet name for text-file differences.
pub const SHEET_VERSION_DIFF: &str = "version_diff";
/// Sheet name for modules with no comparable scenario.
pub const SHEET_CANNOT_COMPARE: &str = "無法比對";

/// Errors raised while persisting a report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EmitError {
    /// Writing the artifact failed.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// The rendering backend rejected the report.
    #[error("failed to render report: {message}")]
    Render {
        /// Backend-specific failure description.
        message: String,
    },
}

/// Derive the gitiles browse link for a project reference.
///
/// `rtk-prebuilt` remotes route to the prebuilt host, everything else to the
/// primary host. A reference that already contains `refs/` (tags included)
/// passes through; bare branch names gain `refs/heads/`; commit hashes pass
/// through raw. Empty references produce an empty link.
#[must_use]
pub fn gitiles_link(
    config: &CompareConfig,
    remote: &str,
    project_name: &str,
    reference: &str,
) -> String {
    if reference.is_empty() {
        return String::new();
    }
    let host = if remote == PREBUILT_REMOTE {
        &config.gerrit.prebuilt
    } else {
        &config.gerrit.primary
    };
    let ref_path = if reference.contains("refs/") {
        reference.to_string()
    } else {
        match classify(reference) {
            RefKind::Hash => reference.to_string(),
            _ => format!("refs/heads/{reference}"),
        }
    };
    format!("{host}/gerrit/plugins/gitiles/{project_name}/+/{ref_path}")
}

/// One revision_diff sheet row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionDiffRow {
    /// Serial number, 1..N within the sheet.
    pub sn: usize,
    /// Module (chip) name.
    pub module: String,
    /// Module directory relative to the source root.
    pub location_path: String,
    /// Base-side folder name.
    pub base_folder: String,
    /// Compare-side folder name.
    pub compare_folder: String,
    /// Project name.
    pub name: String,
    /// Project path.
    pub path: String,
    /// Shortened base revision.
    pub base_short: String,
    /// Full base revision.
    pub base_revision: String,
    /// Shortened compare revision.
    pub compare_short: String,
    /// Full compare revision.
    pub compare_revision: String,
    /// Base-side upstream.
    pub base_upstream: String,
    /// Compare-side upstream.
    pub compare_upstream: String,
    /// Base-side dest-branch.
    pub base_dest_branch: String,
    /// Compare-side dest-branch.
    pub compare_dest_branch: String,
    /// Gitiles link for the base revision.
    pub base_link: String,
    /// Gitiles link for the compare revision.
    pub compare_link: String,
}

/// One branch_error sheet row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchErrorRow {
    /// Serial number, 1..N within the sheet.
    pub sn: usize,
    /// Module (chip) name.
    pub module: String,
    /// Module directory relative to the source root.
    pub location_path: String,
    /// Base-side folder name.
    pub base_folder: String,
    /// Compare-side folder name.
    pub compare_folder: String,
    /// Project name.
    pub name: String,
    /// Project path.
    pub path: String,
    /// Shortened compare revision.
    pub revision_short: String,
    /// Full compare revision.
    pub revision: String,
    /// Compare-side upstream.
    pub upstream: String,
    /// Compare-side dest-branch.
    pub dest_branch: String,
    /// Gitiles link for the compare revision.
    pub compare_link: String,
    /// Problem label; blank when `has_wave` is set.
    pub problem: String,
    /// Whether upstream or dest-branch contains `wave`.
    pub has_wave: bool,
}

impl BranchErrorRow {
    /// The `has_wave` display value (`Y`/`N`).
    #[must_use]
    pub fn has_wave_label(&self) -> &'static str {
        if self.has_wave {
            "Y"
        } else {
            "N"
        }
    }
}

/// One lost_project sheet row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LostProjectRow {
    /// Serial number, 1..N within the sheet.
    pub sn: usize,
    /// Stage label derived from the scenario (`premp`/`wave`/`wavebackup`).
    pub stage_label: String,
    /// `added` or `removed` (狀態 column).
    pub state: String,
    /// Module (chip) name.
    pub module: String,
    /// Module directory relative to the source root.
    pub location_path: String,
    /// Folder the project was found in.
    pub folder: String,
    /// Project name.
    pub name: String,
    /// Project path.
    pub path: String,
    /// Upstream branch.
    pub upstream: String,
    /// dest-branch.
    pub dest_branch: String,
    /// Project revision.
    pub revision: String,
    /// Gitiles link.
    pub link: String,
}

/// One version_diff sheet row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDiffSheetRow {
    /// Serial number, 1..N within the sheet.
    pub sn: usize,
    /// Module (chip) name.
    pub module: String,
    /// Module directory relative to the source root.
    pub location_path: String,
    /// Base-side folder name.
    pub base_folder: String,
    /// Compare-side folder name.
    pub compare_folder: String,
    /// Source file (`F_Version.txt` / `Version.txt`).
    pub file_type: String,
    /// Base-side content.
    pub base_content: String,
    /// Compare-side content.
    pub compare_content: String,
    /// Original full content backing the row.
    pub org_content: String,
}

/// One 無法比對 sheet row: a module none of whose scenarios could run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannotCompareRow {
    /// Serial number, 1..N within the sheet.
    pub sn: usize,
    /// Module (chip) name.
    pub module: String,
    /// Module directory relative to the source root.
    pub location_path: String,
    /// Number of folders found under the module.
    pub folder_count: usize,
    /// Folder names, comma-joined.
    pub folders: String,
    /// Module directory path.
    pub path: String,
    /// Accumulated failure reasons.
    pub reason: String,
}

/// One 摘要 sheet row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Scenario name, or the totals label.
    pub scenario: String,
    /// Number of modules that compared successfully.
    pub success_count: usize,
    /// Number of modules that failed.
    pub failure_count: usize,
    /// Successful modules, comma-joined.
    pub success_modules: String,
    /// Failed modules, comma-joined.
    pub failure_modules: String,
}

/// The complete collated report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryReport {
    /// 摘要 rows (per-scenario plus totals).
    pub summary: Vec<SummaryRow>,
    /// revision_diff rows.
    pub revision_diff: Vec<RevisionDiffRow>,
    /// branch_error rows, sorted `has_wave` ascending (N before Y).
    pub branch_error: Vec<BranchErrorRow>,
    /// lost_project rows.
    pub lost_project: Vec<LostProjectRow>,
    /// version_diff rows.
    pub version_diff: Vec<VersionDiffSheetRow>,
    /// 無法比對 rows.
    pub cannot_compare: Vec<CannotCompareRow>,
}

/// Destination for a collated report.
pub trait ReportSink {
    /// Persist the report.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError`] when the artifact cannot be written.
    fn write(&mut self, report: &SummaryReport) -> Result<(), EmitError>;
}
