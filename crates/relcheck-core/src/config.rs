//! Rule-table configuration.
//!
//! All domain rule tables (the master→premp exact mapping, the chip alias
//! table, the Gerrit hosts, the target-file set) live in an explicit
//! [`CompareConfig`] that callers pass into the orchestrator and the
//! rewriter. The built-in tables are the defaults; a TOML file may override
//! any of them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical manifest file name.
pub const MANIFEST_FILE: &str = "manifest.xml";
/// Canonical firmware version listing file name.
pub const F_VERSION_FILE: &str = "F_Version.txt";
/// Canonical version key/value file name.
pub const VERSION_FILE: &str = "Version.txt";

/// Remote name whose projects inherit the manifest default revision.
pub const DEFAULT_REMOTE: &str = "rtk";
/// Remote name routed to the prebuilt Gerrit host.
pub const PREBUILT_REMOTE: &str = "rtk-prebuilt";

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content is invalid.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Gerrit host base URLs used for gitiles link derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GerritHosts {
    /// Base URL for the primary review host.
    pub primary: String,
    /// Base URL for the prebuilt artifact host.
    pub prebuilt: String,
}

impl Default for GerritHosts {
    fn default() -> Self {
        Self {
            primary: "https://mm2sd.rtkbf.com".to_string(),
            prebuilt: "https://mm2sd-git2.rtkbf.com".to_string(),
        }
    }
}

/// Immutable rule tables for one engine invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Exact branch mapping applied first in master→premp rewriting.
    pub exact_master_to_premp: BTreeMap<String, String>,

    /// Chip alias → rtd identifier table for `realtek/{chip}/master` refs.
    pub chip_to_rtd: BTreeMap<String, String>,

    /// Gerrit hosts for link derivation.
    pub gerrit: GerritHosts,

    /// The files compared per folder pair.
    pub target_files: Vec<String>,

    /// Path substring that marks a DailyBuild tree; `Version.txt` is not
    /// compared under such trees.
    pub dailybuild_marker: String,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            exact_master_to_premp: builtin_exact_master_to_premp(),
            chip_to_rtd: builtin_chip_to_rtd(),
            gerrit: GerritHosts::default(),
            target_files: vec![
                MANIFEST_FILE.to_string(),
                F_VERSION_FILE.to_string(),
                VERSION_FILE.to_string(),
            ],
            dailybuild_marker: "DailyBuild".to_string(),
        }
    }
}

impl CompareConfig {
    /// Load configuration from a TOML file, falling back to the built-in
    /// tables for any section the file omits.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Whether a file name is one of the configured target files.
    ///
    /// Comparison is case-insensitive; folder snapshots from the artifact
    /// server mix cases freely.
    #[must_use]
    pub fn is_target_file(&self, name: &str) -> bool {
        self.target_files
            .iter()
            .any(|t| t.eq_ignore_ascii_case(name))
    }
}

/// The well-known master branches with fixed premp counterparts.
fn builtin_exact_master_to_premp() -> BTreeMap<String, String> {
    [
        ("realtek/master", "realtek/android-14/premp.google-refplus"),
        ("realtek/gaia", "realtek/android-14/premp.google-refplus"),
        ("realtek/gki/master", "realtek/gki/premp.google-refplus"),
        (
            "realtek/android-14/master",
            "realtek/android-14/premp.google-refplus",
        ),
        (
            "realtek/linux-4.14/android-14/master",
            "realtek/linux-4.14/android-14/premp.google-refplus",
        ),
        (
            "realtek/linux-5.4/android-14/master",
            "realtek/linux-5.4/android-14/premp.google-refplus",
        ),
        (
            "realtek/linux-5.10/android-14/master",
            "realtek/linux-5.10/android-14/premp.google-refplus",
        ),
        (
            "realtek/linux-5.15/android-14/master",
            "realtek/linux-5.15/android-14/premp.google-refplus",
        ),
        (
            "realtek/linux-6.1/android-14/master",
            "realtek/linux-6.1/android-14/premp.google-refplus",
        ),
        (
            "realtek/mp.google-refplus",
            "realtek/premp.google-refplus",
        ),
        (
            "realtek/android-14/mp.google-refplus",
            "realtek/android-14/premp.google-refplus",
        ),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

/// Chip marketing alias → rtd silicon identifier.
fn builtin_chip_to_rtd() -> BTreeMap<String, String> {
    [
        ("mac7p", "rtd2851a"),
        ("mac8q", "rtd2851f"),
        ("mac9p", "rtd2895p"),
        ("merlin7", "rtd6748"),
        ("merlin8", "rtd2885p"),
        ("merlin8p", "rtd2885q"),
        ("merlin9", "rtd2875q"),
    ]
    .into_iter()
    .map(|(chip, rtd)| (chip.to_string(), rtd.to_string()))
    .collect()
}
