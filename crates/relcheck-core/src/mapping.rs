//! External mapping-table input.
//!
//! A mapping table enumerates the folder pairs to compare instead of the
//! suffix-convention scan. Rows come from the release spreadsheet; the
//! column names below mirror it.

use serde::{Deserialize, Serialize};

use crate::scenario::CompareScenario;

/// One mapping-table row naming a base/compare folder pair for a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingRow {
    /// Module (chip) name.
    #[serde(rename = "Module")]
    pub module: String,
    /// Base-side maturity stage (`master`, `premp`, `mp`/`wave`).
    #[serde(rename = "DB_Type")]
    pub db_type: String,
    /// Base-side folder name on disk.
    #[serde(rename = "DB_Folder")]
    pub db_folder: String,
    /// Base-side artifact-server path (informational).
    #[serde(rename = "SftpPath", default)]
    pub sftp_path: String,
    /// Compare-side maturity stage.
    #[serde(rename = "compare_DB_Type")]
    pub compare_db_type: String,
    /// Compare-side folder name on disk.
    #[serde(rename = "compare_DB_Folder")]
    pub compare_db_folder: String,
    /// Compare-side artifact-server path (informational).
    #[serde(rename = "compare_SftpPath", default)]
    pub compare_sftp_path: String,
}

impl MappingRow {
    /// Whether this row belongs to the given comparison scenario.
    #[must_use]
    pub fn matches_scenario(&self, scenario: CompareScenario) -> bool {
        let base = self.db_type.to_ascii_lowercase();
        let compare = self.compare_db_type.to_ascii_lowercase();
        match scenario {
            CompareScenario::MasterVsPremp => base == "master" && compare == "premp",
            CompareScenario::PrempVsWave => {
                base == "premp" && (compare == "mp" || compare == "wave")
            }
            CompareScenario::WaveVsBackup => {
                (base == "mp" || base == "wave")
                    && (compare == "mpbackup" || compare == "wave.backup")
            }
        }
    }
}

/// A full mapping table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingTable {
    /// All rows, in spreadsheet order.
    pub rows: Vec<MappingRow>,
}

impl MappingTable {
    /// Rows belonging to a scenario, in table order.
    pub fn rows_for(&self, scenario: CompareScenario) -> impl Iterator<Item = &MappingRow> {
        self.rows
            .iter()
            .filter(move |row| row.matches_scenario(scenario))
    }
}
