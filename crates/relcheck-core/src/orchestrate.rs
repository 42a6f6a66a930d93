//! Scenario orchestration.
//!
//! Walks a source tree, pairs folders per scenario (by suffix convention or
//! an external mapping table), drives the parser and diff engines for each
//! pair, and collates everything into a [`SummaryReport`] with globally
//! renumbered serial numbers.
//!
//! Recoverable failures never abort a run: a missing folder or a malformed
//! manifest marks that one scenario as failed with a structured reason and
//! processing continues. A module lands on the 無法比對 sheet only when all
//! of its attempted scenarios fail.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{CompareConfig, F_VERSION_FILE, MANIFEST_FILE, VERSION_FILE};
use crate::diff::{diff_f_version, diff_project_sets, diff_version, ManifestDiff, MembershipState, VersionDiffRow};
use crate::manifest::parse_manifest;
use crate::mapping::MappingTable;
use crate::report::{
    gitiles_link, BranchErrorRow, CannotCompareRow, LostProjectRow, RevisionDiffRow, SummaryReport,
    SummaryRow, VersionDiffSheetRow,
};
use crate::scenario::CompareScenario;
use crate::tree::{join, SourceTree, TreeError};

/// Totals label on the 摘要 sheet.
const SUMMARY_TOTAL_LABEL: &str = "總計";

/// Maturity stage a folder is classified into by its name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No maturity suffix.
    Master,
    /// `-premp` suffix.
    Premp,
    /// `-wave` suffix.
    Wave,
    /// `-wave.backup` suffix.
    WaveBackup,
}

impl Stage {
    /// Folder-name display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Premp => "premp",
            Self::Wave => "wave",
            Self::WaveBackup => "wave.backup",
        }
    }
}

/// Classify a folder name into a maturity stage by its suffix.
#[must_use]
pub fn classify_folder(name: &str) -> Stage {
    if name.ends_with("-wave.backup") {
        Stage::WaveBackup
    } else if name.ends_with("-wave") {
        Stage::Wave
    } else if name.ends_with("-premp") {
        Stage::Premp
    } else {
        Stage::Master
    }
}

impl CompareScenario {
    /// The (base, compare) stages this scenario pairs.
    #[must_use]
    pub fn stages(self) -> (Stage, Stage) {
        match self {
            Self::MasterVsPremp => (Stage::Master, Stage::Premp),
            Self::PrempVsWave => (Stage::Premp, Stage::Wave),
            Self::WaveVsBackup => (Stage::Wave, Stage::WaveBackup),
        }
    }
}

/// Outcome of one `(module, scenario)` comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Module (chip) name.
    pub module: String,
    /// Scenario that was attempted.
    pub scenario: CompareScenario,
    /// Module directory relative to the source root.
    pub location_path: String,
    /// All folders found under the module directory.
    pub module_folders: Vec<String>,
    /// Base-side folder name (empty when the pair could not be formed).
    pub base_folder: String,
    /// Compare-side folder name (empty when the pair could not be formed).
    pub compare_folder: String,
    /// Whether the comparison ran.
    pub success: bool,
    /// Structured failure reason when `success` is false.
    pub reason: String,
    /// Manifest difference streams.
    pub manifest_diff: ManifestDiff,
    /// Text-file difference rows.
    pub version_rows: Vec<VersionDiffRow>,
}

impl ScenarioResult {
    fn failed(
        module: &str,
        scenario: CompareScenario,
        location_path: &str,
        module_folders: Vec<String>,
        reason: String,
    ) -> Self {
        warn!(module, scenario = %scenario, reason, "scenario failed");
        Self {
            module: module.to_string(),
            scenario,
            location_path: location_path.to_string(),
            module_folders,
            base_folder: String::new(),
            compare_folder: String::new(),
            success: false,
            reason,
            manifest_diff: ManifestDiff::default(),
            version_rows: Vec::new(),
        }
    }
}

/// Drives the comparison pipeline over a source tree.
pub struct Orchestrator<'a, T: SourceTree> {
    tree: &'a T,
    config: &'a CompareConfig,
}

impl<'a, T: SourceTree> Orchestrator<'a, T> {
    /// Create an orchestrator over a tree with a rule-table configuration.
    #[must_use]
    pub fn new(tree: &'a T, config: &'a CompareConfig) -> Self {
        Self { tree, config }
    }

    /// Run the requested scenarios and collate the report.
    ///
    /// With a mapping table the pairs come from the table; otherwise the
    /// tree is scanned and folders are paired by suffix convention.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] only for unrecoverable I/O failures;
    /// per-scenario problems are recorded in the report instead.
    pub fn run(
        &self,
        scenarios: &[CompareScenario],
        mapping: Option<&MappingTable>,
    ) -> Result<SummaryReport, TreeError> {
        self.run_with_cancel(scenarios, mapping, &|| false)
    }

    /// [`Self::run`] with a cooperative cancellation hook, checked between
    /// scenarios. Scenarios not yet started when the hook returns true are
    /// dropped; completed ones are still reported.
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub fn run_with_cancel(
        &self,
        scenarios: &[CompareScenario],
        mapping: Option<&MappingTable>,
        cancel: &dyn Fn() -> bool,
    ) -> Result<SummaryReport, TreeError> {
        let results = match mapping {
            Some(table) => self.run_mapping(scenarios, table, cancel)?,
            None => self.run_convention(scenarios, cancel)?,
        };
        Ok(collate(&results, self.config))
    }

    fn run_convention(
        &self,
        scenarios: &[CompareScenario],
        cancel: &dyn Fn() -> bool,
    ) -> Result<Vec<ScenarioResult>, TreeError> {
        let mut results = Vec::new();
        'modules: for module in self.tree.subdirs("")? {
            let folders = self.tree.subdirs(&module)?;
            for &scenario in scenarios {
                if cancel() {
                    debug!("cancellation requested; stopping scenario loop");
                    break 'modules;
                }
                let (base_stage, compare_stage) = scenario.stages();
                let base = folders
                    .iter()
                    .find(|f| classify_folder(f) == base_stage)
                    .cloned();
                let compare = folders
                    .iter()
                    .find(|f| classify_folder(f) == compare_stage)
                    .cloned();
                match (base, compare) {
                    (Some(base), Some(compare)) => {
                        results.push(self.run_pair(
                            &module,
                            &module,
                            folders.clone(),
                            scenario,
                            &base,
                            &compare,
                        ));
                    }
                    (base, compare) => {
                        let mut missing = Vec::new();
                        if base.is_none() {
                            missing.push(base_stage.label());
                        }
                        if compare.is_none() {
                            missing.push(compare_stage.label());
                        }
                        let reason = format!(
                            "缺少 {} 資料夾 ({module})",
                            missing.join("、")
                        );
                        results.push(ScenarioResult::failed(
                            &module,
                            scenario,
                            &module,
                            folders.clone(),
                            reason,
                        ));
                    }
                }
            }
        }
        Ok(results)
    }

    fn run_mapping(
        &self,
        scenarios: &[CompareScenario],
        table: &MappingTable,
        cancel: &dyn Fn() -> bool,
    ) -> Result<Vec<ScenarioResult>, TreeError> {
        let mut results = Vec::new();
        'scenarios: for &scenario in scenarios {
            for row in table.rows_for(scenario) {
                if cancel() {
                    debug!("cancellation requested; stopping scenario loop");
                    break 'scenarios;
                }
                let folders = self.tree.subdirs(&row.module)?;
                let mut missing = Vec::new();
                if !folders.contains(&row.db_folder) {
                    missing.push(row.db_folder.as_str());
                }
                if !folders.contains(&row.compare_db_folder) {
                    missing.push(row.compare_db_folder.as_str());
                }
                if missing.is_empty() {
                    results.push(self.run_pair(
                        &row.module,
                        &row.module,
                        folders,
                        scenario,
                        &row.db_folder,
                        &row.compare_db_folder,
                    ));
                } else {
                    let reason = format!(
                        "缺少 {} 資料夾 ({})",
                        missing.join("、"),
                        row.module
                    );
                    results.push(ScenarioResult::failed(
                        &row.module,
                        scenario,
                        &row.module,
                        folders,
                        reason,
                    ));
                }
            }
        }
        Ok(results)
    }

    fn run_pair(
        &self,
        module: &str,
        location_path: &str,
        module_folders: Vec<String>,
        scenario: CompareScenario,
        base_folder: &str,
        compare_folder: &str,
    ) -> ScenarioResult {
        debug!(module, scenario = %scenario, base_folder, compare_folder, "comparing pair");
        let base_dir = join(location_path, base_folder);
        let compare_dir = join(location_path, compare_folder);

        let mut result = ScenarioResult {
            module: module.to_string(),
            scenario,
            location_path: location_path.to_string(),
            module_folders,
            base_folder: base_folder.to_string(),
            compare_folder: compare_folder.to_string(),
            success: true,
            reason: String::new(),
            manifest_diff: ManifestDiff::default(),
            version_rows: Vec::new(),
        };

        if self.config.is_target_file(MANIFEST_FILE) {
            match self.diff_manifests(&base_dir, &compare_dir, base_folder, compare_folder) {
                Ok(Some(diff)) => result.manifest_diff = diff,
                // A missing manifest skips the manifest portion only; text
                // comparisons still run.
                Ok(None) => {}
                Err(reason) => {
                    return ScenarioResult::failed(
                        module,
                        scenario,
                        location_path,
                        result.module_folders,
                        reason,
                    );
                }
            }
        }

        if self.config.is_target_file(F_VERSION_FILE) {
            match self.read_sides(&base_dir, &compare_dir, F_VERSION_FILE) {
                Ok((base, compare)) => result.version_rows.extend(diff_f_version(
                    base.as_deref(),
                    compare.as_deref(),
                    base_folder,
                    compare_folder,
                )),
                Err(reason) => {
                    return ScenarioResult::failed(
                        module,
                        scenario,
                        location_path,
                        result.module_folders,
                        reason,
                    );
                }
            }
        }

        let in_dailybuild = base_dir.contains(&self.config.dailybuild_marker)
            || compare_dir.contains(&self.config.dailybuild_marker);
        if self.config.is_target_file(VERSION_FILE) && !in_dailybuild {
            match self.read_sides(&base_dir, &compare_dir, VERSION_FILE) {
                Ok((base, compare)) => result.version_rows.extend(diff_version(
                    base.as_deref(),
                    compare.as_deref(),
                    base_folder,
                    compare_folder,
                )),
                Err(reason) => {
                    return ScenarioResult::failed(
                        module,
                        scenario,
                        location_path,
                        result.module_folders,
                        reason,
                    );
                }
            }
        }

        result
    }

    fn diff_manifests(
        &self,
        base_dir: &str,
        compare_dir: &str,
        base_folder: &str,
        compare_folder: &str,
    ) -> Result<Option<ManifestDiff>, String> {
        let base_xml = self
            .tree
            .read_target(base_dir, MANIFEST_FILE)
            .map_err(|e| e.to_string())?;
        let compare_xml = self
            .tree
            .read_target(compare_dir, MANIFEST_FILE)
            .map_err(|e| e.to_string())?;
        let (Some(base_xml), Some(compare_xml)) = (base_xml, compare_xml) else {
            debug!(base_dir, compare_dir, "manifest missing on one side; skipping manifest diff");
            return Ok(None);
        };
        let base = parse_manifest(&base_xml).map_err(|e| e.to_string())?;
        let compare = parse_manifest(&compare_xml).map_err(|e| e.to_string())?;
        Ok(Some(diff_project_sets(
            &base.projects,
            &compare.projects,
            base_folder,
            compare_folder,
        )))
    }

    fn read_sides(
        &self,
        base_dir: &str,
        compare_dir: &str,
        file_name: &str,
    ) -> Result<(Option<String>, Option<String>), String> {
        let base = self
            .tree
            .read_target(base_dir, file_name)
            .map_err(|e| e.to_string())?;
        let compare = self
            .tree
            .read_target(compare_dir, file_name)
            .map_err(|e| e.to_string())?;
        Ok((base, compare))
    }
}

/// Collate scenario results into the final report, assigning globally
/// unique serial numbers (1..N) within each sheet.
#[must_use]
pub fn collate(results: &[ScenarioResult], config: &CompareConfig) -> SummaryReport {
    let mut report = SummaryReport::default();

    for result in results {
        for delta in &result.manifest_diff.revision_deltas {
            report.revision_diff.push(RevisionDiffRow {
                sn: 0,
                module: result.module.clone(),
                location_path: result.location_path.clone(),
                base_folder: result.base_folder.clone(),
                compare_folder: result.compare_folder.clone(),
                name: delta.base.name.clone(),
                path: delta.base.path.clone(),
                base_short: delta.base_short.clone(),
                base_revision: delta.base.revision.clone(),
                compare_short: delta.compare_short.clone(),
                compare_revision: delta.compare.revision.clone(),
                base_upstream: delta.base.upstream.clone(),
                compare_upstream: delta.compare.upstream.clone(),
                base_dest_branch: delta.base.dest_branch.clone(),
                compare_dest_branch: delta.compare.dest_branch.clone(),
                base_link: gitiles_link(
                    config,
                    &delta.base.remote,
                    &delta.base.name,
                    &delta.base.revision,
                ),
                compare_link: gitiles_link(
                    config,
                    &delta.compare.remote,
                    &delta.compare.name,
                    &delta.compare.revision,
                ),
            });
        }

        for error in &result.manifest_diff.branch_errors {
            report.branch_error.push(BranchErrorRow {
                sn: 0,
                module: result.module.clone(),
                location_path: result.location_path.clone(),
                base_folder: result.base_folder.clone(),
                compare_folder: result.compare_folder.clone(),
                name: error.project.name.clone(),
                path: error.project.path.clone(),
                revision_short: crate::refs::short_revision(&error.project.revision),
                revision: error.project.revision.clone(),
                upstream: error.project.upstream.clone(),
                dest_branch: error.project.dest_branch.clone(),
                compare_link: gitiles_link(
                    config,
                    &error.project.remote,
                    &error.project.name,
                    &error.project.revision,
                ),
                problem: error.problem.clone(),
                has_wave: error.has_wave,
            });
        }

        for membership in &result.manifest_diff.membership {
            let folder = match membership.state {
                MembershipState::Removed => result.base_folder.clone(),
                MembershipState::Added => result.compare_folder.clone(),
            };
            report.lost_project.push(LostProjectRow {
                sn: 0,
                stage_label: result.scenario.stage_label().to_string(),
                state: membership.state.label().to_string(),
                module: result.module.clone(),
                location_path: result.location_path.clone(),
                folder,
                name: membership.project.name.clone(),
                path: membership.project.path.clone(),
                upstream: membership.project.upstream.clone(),
                dest_branch: membership.project.dest_branch.clone(),
                revision: membership.project.revision.clone(),
                link: gitiles_link(
                    config,
                    &membership.project.remote,
                    &membership.project.name,
                    &membership.project.revision,
                ),
            });
        }

        for row in &result.version_rows {
            report.version_diff.push(VersionDiffSheetRow {
                sn: 0,
                module: result.module.clone(),
                location_path: result.location_path.clone(),
                base_folder: result.base_folder.clone(),
                compare_folder: result.compare_folder.clone(),
                file_type: row.file_type.clone(),
                base_content: row.base_line.clone(),
                compare_content: row.compare_line.clone(),
                org_content: row.base_full_content.clone(),
            });
        }
    }

    // branch_error is pre-sorted has_wave ascending so the emitter's filter
    // view (N rows visible) matches the row order.
    report.branch_error.sort_by_key(|row| row.has_wave);

    build_summary(results, &mut report);
    build_cannot_compare(results, &mut report);
    assign_serial_numbers(&mut report);
    report
}

fn build_summary(results: &[ScenarioResult], report: &mut SummaryReport) {
    let mut total_success = 0;
    let mut total_failure = 0;
    for scenario in CompareScenario::ALL {
        let rows: Vec<_> = results.iter().filter(|r| r.scenario == scenario).collect();
        if rows.is_empty() {
            continue;
        }
        let successes: Vec<_> = rows
            .iter()
            .filter(|r| r.success)
            .map(|r| r.module.as_str())
            .collect();
        let failures: Vec<_> = rows
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.module.as_str())
            .collect();
        total_success += successes.len();
        total_failure += failures.len();
        report.summary.push(SummaryRow {
            scenario: scenario.name().to_string(),
            success_count: successes.len(),
            failure_count: failures.len(),
            success_modules: successes.join(", "),
            failure_modules: failures.join(", "),
        });
    }
    report.summary.push(SummaryRow {
        scenario: SUMMARY_TOTAL_LABEL.to_string(),
        success_count: total_success,
        failure_count: total_failure,
        success_modules: String::new(),
        failure_modules: String::new(),
    });
}

fn build_cannot_compare(results: &[ScenarioResult], report: &mut SummaryReport) {
    let mut seen = Vec::new();
    for result in results {
        if seen.contains(&result.module) {
            continue;
        }
        seen.push(result.module.clone());
        let module_results: Vec<_> = results
            .iter()
            .filter(|r| r.module == result.module)
            .collect();
        if module_results.iter().any(|r| r.success) {
            continue;
        }
        let mut reasons: Vec<&str> = Vec::new();
        for r in &module_results {
            if !r.reason.is_empty() && !reasons.contains(&r.reason.as_str()) {
                reasons.push(&r.reason);
            }
        }
        report.cannot_compare.push(CannotCompareRow {
            sn: 0,
            module: result.module.clone(),
            location_path: result.location_path.clone(),
            folder_count: result.module_folders.len(),
            folders: result.module_folders.join(", "),
            path: result.location_path.clone(),
            reason: reasons.join("; "),
        });
    }
}

fn assign_serial_numbers(report: &mut SummaryReport) {
    for (i, row) in report.revision_diff.iter_mut().enumerate() {
        row.sn = i + 1;
    }
    for (i, row) in report.branch_error.iter_mut().enumerate() {
        row.sn = i + 1;
    }
    for (i, row) in report.lost_project.iter_mut().enumerate() {
        row.sn = i + 1;
    }
    for (i, row) in report.version_diff.iter_mut().enumerate() {
        row.sn = i + 1;
    }
    for (i, row) in report.cannot_compare.iter_mut().enumerate() {
        row.sn = i + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MemSourceTree;

    const BASE_MANIFEST: &str = r#"<manifest>
  <default remote="rtk" revision="realtek/android-14/master" />
  <project name="a" path="p1" revision="aaaaaaa111111111111111111111111111111111" />
  <project name="b" path="p2" revision="cccccccc" />
</manifest>"#;

    const COMPARE_MANIFEST: &str = r#"<manifest>
  <default remote="rtk" revision="realtek/android-14/premp.google-refplus" />
  <project name="a" path="p1" revision="bbbbbbb222222222222222222222222222222222" />
  <project name="c" path="p3" revision="dddddddd" />
</manifest>"#;

    fn tree() -> MemSourceTree {
        MemSourceTree::new()
            .with_file("mac7p/DB2302/manifest.xml", BASE_MANIFEST)
            .with_file("mac7p/DB2302/F_Version.txt", "P_GIT_001;k;b;h1;1\n")
            .with_file("mac7p/DB2302/Version.txt", "Version: 1.0\n")
            .with_file("mac7p/DB2302-premp/manifest.xml", COMPARE_MANIFEST)
            .with_file("mac7p/DB2302-premp/F_Version.txt", "P_GIT_001;k;b;h2;2\n")
            .with_file("mac7p/DB2302-premp/Version.txt", "Version: 2.0\n")
    }

    #[test]
    fn test_classify_folder_suffixes() {
        assert_eq!(classify_folder("DB2302"), Stage::Master);
        assert_eq!(classify_folder("DB2302-premp"), Stage::Premp);
        assert_eq!(classify_folder("DB2302-wave"), Stage::Wave);
        assert_eq!(classify_folder("DB2302-wave.backup"), Stage::WaveBackup);
    }

    #[test]
    fn test_identity_run_is_empty() {
        let tree = MemSourceTree::new()
            .with_file("mac7p/DB1/manifest.xml", BASE_MANIFEST)
            .with_file("mac7p/DB1-premp/manifest.xml", BASE_MANIFEST);
        let config = CompareConfig::default();
        let orchestrator = Orchestrator::new(&tree, &config);
        let report = orchestrator
            .run(&[CompareScenario::MasterVsPremp], None)
            .unwrap();
        assert!(report.revision_diff.is_empty());
        assert!(report.branch_error.is_empty());
        assert!(report.lost_project.is_empty());
        assert!(report.version_diff.is_empty());
        assert_eq!(report.summary[0].success_count, 1);
        assert_eq!(report.summary[0].failure_count, 0);
        assert!(report.cannot_compare.is_empty());
    }

    #[test]
    fn test_full_run_collects_all_streams() {
        let tree = tree();
        let config = CompareConfig::default();
        let orchestrator = Orchestrator::new(&tree, &config);
        let report = orchestrator
            .run(&[CompareScenario::MasterVsPremp], None)
            .unwrap();

        assert_eq!(report.revision_diff.len(), 1);
        assert_eq!(report.revision_diff[0].base_short, "aaaaaaa");
        assert_eq!(report.revision_diff[0].compare_short, "bbbbbbb");

        // b removed, c added.
        assert_eq!(report.lost_project.len(), 2);
        assert_eq!(report.lost_project[0].state, "removed");
        assert_eq!(report.lost_project[0].folder, "DB2302");
        assert_eq!(report.lost_project[0].stage_label, "premp");
        assert_eq!(report.lost_project[1].state, "added");
        assert_eq!(report.lost_project[1].folder, "DB2302-premp");

        // One F_Version row, one Version row.
        assert_eq!(report.version_diff.len(), 2);
        assert_eq!(report.version_diff[0].file_type, F_VERSION_FILE);
        assert_eq!(report.version_diff[1].file_type, VERSION_FILE);
    }

    #[test]
    fn test_missing_folder_records_failure() {
        let tree = MemSourceTree::new().with_file("mac7p/DB2302/manifest.xml", BASE_MANIFEST);
        let config = CompareConfig::default();
        let orchestrator = Orchestrator::new(&tree, &config);
        let report = orchestrator
            .run(&[CompareScenario::MasterVsPremp], None)
            .unwrap();
        assert_eq!(report.summary[0].failure_count, 1);
        assert!(report.summary[0].failure_modules.contains("mac7p"));
        // All attempted scenarios failed, so the module is uncomparable.
        assert_eq!(report.cannot_compare.len(), 1);
        assert!(report.cannot_compare[0].reason.contains("缺少"));
        assert!(report.cannot_compare[0].reason.contains("premp"));
    }

    #[test]
    fn test_module_with_one_success_not_uncomparable() {
        let tree = MemSourceTree::new()
            .with_file("mac7p/DB1/manifest.xml", BASE_MANIFEST)
            .with_file("mac7p/DB1-premp/manifest.xml", BASE_MANIFEST);
        let config = CompareConfig::default();
        let orchestrator = Orchestrator::new(&tree, &config);
        let report = orchestrator.run(&CompareScenario::ALL, None).unwrap();
        // premp_vs_wave and wave_vs_backup fail, master_vs_premp succeeds.
        assert!(report.cannot_compare.is_empty());
        assert_eq!(report.summary.len(), 4);
        assert_eq!(report.summary[3].scenario, "總計");
        assert_eq!(report.summary[3].success_count, 1);
        assert_eq!(report.summary[3].failure_count, 2);
    }

    #[test]
    fn test_parse_error_fails_scenario() {
        let tree = MemSourceTree::new()
            .with_file("mac7p/DB1/manifest.xml", "<manifest><project")
            .with_file("mac7p/DB1-premp/manifest.xml", BASE_MANIFEST);
        let config = CompareConfig::default();
        let orchestrator = Orchestrator::new(&tree, &config);
        let report = orchestrator
            .run(&[CompareScenario::MasterVsPremp], None)
            .unwrap();
        assert_eq!(report.summary[0].failure_count, 1);
        assert_eq!(report.cannot_compare.len(), 1);
    }

    #[test]
    fn test_missing_manifest_still_compares_text_files() {
        let tree = MemSourceTree::new()
            .with_file("mac7p/DB1/F_Version.txt", "P_GIT_001;k;b;h1;1\n")
            .with_file("mac7p/DB1-premp/manifest.xml", BASE_MANIFEST)
            .with_file("mac7p/DB1-premp/F_Version.txt", "P_GIT_001;k;b;h2;2\n");
        let config = CompareConfig::default();
        let orchestrator = Orchestrator::new(&tree, &config);
        let report = orchestrator
            .run(&[CompareScenario::MasterVsPremp], None)
            .unwrap();
        assert_eq!(report.summary[0].success_count, 1);
        assert!(report.revision_diff.is_empty());
        assert_eq!(report.version_diff.len(), 1);
    }

    #[test]
    fn test_dailybuild_skips_version_txt() {
        let tree = MemSourceTree::new()
            .with_file("DailyBuild-mac7p/DB1/manifest.xml", BASE_MANIFEST)
            .with_file("DailyBuild-mac7p/DB1/Version.txt", "Version: 1.0\n")
            .with_file("DailyBuild-mac7p/DB1-premp/manifest.xml", BASE_MANIFEST)
            .with_file("DailyBuild-mac7p/DB1-premp/Version.txt", "Version: 2.0\n");
        let config = CompareConfig::default();
        let orchestrator = Orchestrator::new(&tree, &config);
        let report = orchestrator
            .run(&[CompareScenario::MasterVsPremp], None)
            .unwrap();
        assert!(report.version_diff.is_empty());
    }

    #[test]
    fn test_sn_numbering_is_global_and_dense() {
        let tree = tree();
        let config = CompareConfig::default();
        let orchestrator = Orchestrator::new(&tree, &config);
        let report = orchestrator.run(&CompareScenario::ALL, None).unwrap();
        for (i, row) in report.version_diff.iter().enumerate() {
            assert_eq!(row.sn, i + 1);
        }
        for (i, row) in report.revision_diff.iter().enumerate() {
            assert_eq!(row.sn, i + 1);
        }
    }

    #[test]
    fn test_cancellation_stops_remaining_scenarios() {
        let tree = tree();
        let config = CompareConfig::default();
        let orchestrator = Orchestrator::new(&tree, &config);
        let report = orchestrator
            .run_with_cancel(&CompareScenario::ALL, None, &|| true)
            .unwrap();
        assert!(report.revision_diff.is_empty());
        // Only the totals row.
        assert_eq!(report.summary.len(), 1);
    }

    #[test]
    fn test_mapping_driven_run() {
        use crate::mapping::{MappingRow, MappingTable};
        let tree = tree();
        let config = CompareConfig::default();
        let orchestrator = Orchestrator::new(&tree, &config);
        let table = MappingTable {
            rows: vec![MappingRow {
                module: "mac7p".to_string(),
                db_type: "master".to_string(),
                db_folder: "DB2302".to_string(),
                sftp_path: String::new(),
                compare_db_type: "premp".to_string(),
                compare_db_folder: "DB2302-premp".to_string(),
                compare_sftp_path: String::new(),
            }],
        };
        let report = orchestrator
            .run(&[CompareScenario::MasterVsPremp], Some(&table))
            .unwrap();
        assert_eq!(report.summary[0].success_count, 1);
        assert_eq!(report.revision_diff.len(), 1);
    }

    #[test]
    fn test_mapping_missing_folder_fails() {
        use crate::mapping::{MappingRow, MappingTable};
        let tree = tree();
        let config = CompareConfig::default();
        let orchestrator = Orchestrator::new(&tree, &config);
        let table = MappingTable {
            rows: vec![MappingRow {
                module: "mac7p".to_string(),
                db_type: "master".to_string(),
                db_folder: "DB9999".to_string(),
                sftp_path: String::new(),
                compare_db_type: "premp".to_string(),
                compare_db_folder: "DB2302-premp".to_string(),
                compare_sftp_path: String::new(),
            }],
        };
        let report = orchestrator
            .run(&[CompareScenario::MasterVsPremp], Some(&table))
            .unwrap();
        assert_eq!(report.summary[0].failure_count, 1);
        assert!(report.cannot_compare[0].reason.contains("DB9999"));
    }
}
