//! Revision rewriting between release lines.
//!
//! Three deterministic rewrites move a branch reference forward through the
//! maturity stages: master→premp, premp→mp ("wave"), mp→mpbackup. The
//! master→premp direction carries the real rule weight: an exact mapping
//! table for the well-known branches, ordered regex pattern rules, a chip
//! alias rule, and an intelligent fallback. The other two directions are
//! keyword substitutions.
//!
//! The rewriter is total and free of I/O: unrecognized references fall
//! through to the default premp branch rather than failing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CompareConfig;
use crate::refs::{self, RefKind};

/// Prefix of upstream Google references, never rewritten.
const GOOGLE_PREFIX: &str = "google/";

/// Keyword marking a premp branch.
const PREMP_KEYWORD: &str = "premp.google-refplus";
/// Keyword marking an mp ("wave") branch.
const WAVE_KEYWORD: &str = "mp.google-refplus.wave";
/// Keyword marking an mp-backup branch.
const WAVE_BACKUP_KEYWORD: &str = "mp.google-refplus.wave.backup";

/// Default target when no master→premp rule matches.
const DEFAULT_PREMP: &str = "realtek/android-14/premp.google-refplus";

/// A branch-conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertScenario {
    /// master → premp.
    MasterToPremp,
    /// premp → mp (wave).
    PrempToMp,
    /// mp → mp-backup.
    MpToMpbackup,
}

impl fmt::Display for ConvertScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MasterToPremp => "master_to_premp",
            Self::PrempToMp => "premp_to_mp",
            Self::MpToMpbackup => "mp_to_mpbackup",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ConvertScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master_to_premp" => Ok(Self::MasterToPremp),
            "premp_to_mp" => Ok(Self::PrempToMp),
            "mp_to_mpbackup" => Ok(Self::MpToMpbackup),
            other => Err(format!("unknown conversion: {other}")),
        }
    }
}

/// An ordered master→premp pattern rule.
struct PatternRule {
    /// Rule name, for trace output.
    name: &'static str,
    /// Anchored matcher.
    regex: Regex,
    /// Replacement template with `$n` capture references.
    replacement: &'static str,
}

impl PatternRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("invalid rewrite pattern"),
            replacement,
        }
    }
}

/// master→premp pattern rules, applied in order; first match wins.
static MASTER_TO_PREMP_PATTERNS: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    vec![
        PatternRule::new(
            "upgrade_chip",
            r"^realtek/android-(\d+)/mp\.google-refplus\.upgrade-(\d+)\.(rtd\w+)$",
            "realtek/android-$1/premp.google-refplus.upgrade-$2.$3",
        ),
        PatternRule::new(
            "upgrade",
            r"^realtek/android-(\d+)/mp\.google-refplus\.upgrade-(\d+)$",
            "realtek/android-$1/premp.google-refplus.upgrade-$2",
        ),
        PatternRule::new(
            "kernel_master",
            r"^realtek/linux-([0-9.]+)/master$",
            "realtek/linux-$1/android-14/premp.google-refplus",
        ),
        PatternRule::new(
            "kernel_android_master",
            r"^realtek/linux-([0-9.]+)/android-(\d+)/master$",
            "realtek/linux-$1/android-$2/premp.google-refplus",
        ),
        PatternRule::new(
            "kernel_android_mp",
            r"^realtek/linux-([0-9.]+)/android-(\d+)/mp\.google-refplus(\.rtd\w+)?$",
            "realtek/linux-$1/android-$2/premp.google-refplus$3",
        ),
        PatternRule::new(
            "android_mp",
            r"^realtek/android-(\d+)/mp\.google-refplus(\.rtd\w+)?$",
            "realtek/android-$1/premp.google-refplus$2",
        ),
    ]
});

/// Matcher for `realtek/{chip}/master` chip-alias references.
static CHIP_MASTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^realtek/([a-z0-9]+)/master$").expect("invalid chip pattern"));

/// Android version extractor for the fallback rule.
static ANDROID_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"android-(\d+)").expect("invalid android pattern"));

/// Rewrite a revision reference for the given conversion direction.
///
/// Tags, references under `google/`, and empty strings are returned
/// unchanged. The rewrite is idempotent per direction: a reference already
/// in the target form passes through untouched.
#[must_use]
pub fn rewrite(reference: &str, scenario: ConvertScenario, config: &CompareConfig) -> String {
    if should_skip(reference) {
        return reference.to_string();
    }
    match scenario {
        ConvertScenario::MasterToPremp => master_to_premp(reference, config),
        ConvertScenario::PrempToMp => premp_to_mp(reference),
        ConvertScenario::MpToMpbackup => mp_to_mpbackup(reference),
    }
}

/// Whether a reference is exempt from rewriting.
#[must_use]
pub fn should_skip(reference: &str) -> bool {
    reference.is_empty()
        || refs::classify(reference) == RefKind::Tag
        || reference.starts_with(GOOGLE_PREFIX)
}

fn master_to_premp(reference: &str, config: &CompareConfig) -> String {
    // Already in premp form; re-applying the conversion must be identity.
    if reference.contains(PREMP_KEYWORD) {
        return reference.to_string();
    }

    // Rule 1: exact mapping table.
    if let Some(target) = config.exact_master_to_premp.get(reference) {
        return target.clone();
    }

    // Rule 2: pattern rules, first match wins.
    for rule in MASTER_TO_PREMP_PATTERNS.iter() {
        if rule.regex.is_match(reference) {
            debug!(rule = rule.name, reference, "pattern rule matched");
            return rule.regex.replace(reference, rule.replacement).into_owned();
        }
    }

    // Rule 3: chip alias table.
    if let Some(caps) = CHIP_MASTER.captures(reference) {
        if let Some(rtd) = config.chip_to_rtd.get(&caps[1]) {
            return format!("realtek/android-14/premp.google-refplus.{rtd}");
        }
    }

    // Rule 4: intelligent fallback.
    debug!(reference, "no master→premp rule matched; using fallback");
    if reference.contains("mp.google-refplus") {
        return reference.replace("mp.google-refplus", PREMP_KEYWORD);
    }
    if reference.contains("/master") && reference.contains("realtek/") {
        if let Some(caps) = ANDROID_VERSION.captures(reference) {
            return format!("realtek/android-{}/premp.google-refplus", &caps[1]);
        }
    }
    DEFAULT_PREMP.to_string()
}

fn premp_to_mp(reference: &str) -> String {
    reference.replace(PREMP_KEYWORD, WAVE_KEYWORD)
}

fn mp_to_mpbackup(reference: &str) -> String {
    if reference.contains(WAVE_BACKUP_KEYWORD) {
        return reference.to_string();
    }
    reference.replace(WAVE_KEYWORD, WAVE_BACKUP_KEYWORD)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CompareConfig {
        CompareConfig::default()
    }

    fn to_premp(reference: &str) -> String {
        rewrite(reference, ConvertScenario::MasterToPremp, &config())
    }

    #[test]
    fn test_skip_tags() {
        for scenario in [
            ConvertScenario::MasterToPremp,
            ConvertScenario::PrempToMp,
            ConvertScenario::MpToMpbackup,
        ] {
            assert_eq!(
                rewrite("refs/tags/REL_8888", scenario, &config()),
                "refs/tags/REL_8888"
            );
        }
    }

    #[test]
    fn test_skip_google_refs() {
        assert_eq!(to_premp("google/android-14-qpr3"), "google/android-14-qpr3");
    }

    #[test]
    fn test_skip_empty() {
        assert_eq!(to_premp(""), "");
    }

    #[test]
    fn test_exact_mapping() {
        assert_eq!(
            to_premp("realtek/master"),
            "realtek/android-14/premp.google-refplus"
        );
        assert_eq!(
            to_premp("realtek/gki/master"),
            "realtek/gki/premp.google-refplus"
        );
        assert_eq!(
            to_premp("realtek/linux-5.15/android-14/master"),
            "realtek/linux-5.15/android-14/premp.google-refplus"
        );
        assert_eq!(
            to_premp("realtek/mp.google-refplus"),
            "realtek/premp.google-refplus"
        );
    }

    #[test]
    fn test_pattern_upgrade_with_chip() {
        assert_eq!(
            to_premp("realtek/android-14/mp.google-refplus.upgrade-11.rtd2851a"),
            "realtek/android-14/premp.google-refplus.upgrade-11.rtd2851a"
        );
    }

    #[test]
    fn test_pattern_upgrade() {
        assert_eq!(
            to_premp("realtek/android-13/mp.google-refplus.upgrade-11"),
            "realtek/android-13/premp.google-refplus.upgrade-11"
        );
    }

    #[test]
    fn test_pattern_kernel_master() {
        assert_eq!(
            to_premp("realtek/linux-5.10/master"),
            "realtek/linux-5.10/android-14/premp.google-refplus"
        );
    }

    #[test]
    fn test_pattern_kernel_android_master() {
        assert_eq!(
            to_premp("realtek/linux-6.1/android-15/master"),
            "realtek/linux-6.1/android-15/premp.google-refplus"
        );
    }

    #[test]
    fn test_pattern_kernel_android_mp_with_chip() {
        assert_eq!(
            to_premp("realtek/linux-5.4/android-14/mp.google-refplus.rtd2885p"),
            "realtek/linux-5.4/android-14/premp.google-refplus.rtd2885p"
        );
    }

    #[test]
    fn test_pattern_android_mp_with_chip() {
        assert_eq!(
            to_premp("realtek/android-14/mp.google-refplus.rtd2875q"),
            "realtek/android-14/premp.google-refplus.rtd2875q"
        );
    }

    #[test]
    fn test_chip_alias() {
        assert_eq!(
            to_premp("realtek/mac7p/master"),
            "realtek/android-14/premp.google-refplus.rtd2851a"
        );
        assert_eq!(
            to_premp("realtek/merlin9/master"),
            "realtek/android-14/premp.google-refplus.rtd2875q"
        );
    }

    #[test]
    fn test_fallback_mp_keyword() {
        assert_eq!(
            to_premp("realtek/special/mp.google-refplus.custom"),
            "realtek/special/premp.google-refplus.custom"
        );
    }

    #[test]
    fn test_fallback_master_with_android_version() {
        assert_eq!(
            to_premp("realtek/weird/android-13/branch/master"),
            "realtek/android-13/premp.google-refplus"
        );
    }

    #[test]
    fn test_fallback_default() {
        assert_eq!(to_premp("some/unknown/branch"), DEFAULT_PREMP);
    }

    // Pins the historical behavior: `/master` without `realtek/` falls to
    // the default branch.
    #[test]
    fn test_fallback_master_without_realtek() {
        assert_eq!(to_premp("vendor/master"), DEFAULT_PREMP);
    }

    #[test]
    fn test_master_to_premp_idempotent() {
        for reference in [
            "realtek/master",
            "realtek/mac8q/master",
            "realtek/linux-4.14/master",
            "realtek/android-14/mp.google-refplus.upgrade-11",
            "some/unknown/branch",
        ] {
            let once = to_premp(reference);
            assert_eq!(to_premp(&once), once, "not idempotent for {reference}");
        }
    }

    #[test]
    fn test_premp_to_mp() {
        assert_eq!(
            rewrite(
                "realtek/android-14/premp.google-refplus",
                ConvertScenario::PrempToMp,
                &config()
            ),
            "realtek/android-14/mp.google-refplus.wave"
        );
    }

    #[test]
    fn test_premp_to_mp_idempotent() {
        let once = rewrite(
            "realtek/android-14/premp.google-refplus.rtd2851a",
            ConvertScenario::PrempToMp,
            &config(),
        );
        assert_eq!(
            rewrite(&once, ConvertScenario::PrempToMp, &config()),
            once
        );
    }

    #[test]
    fn test_mp_to_mpbackup() {
        assert_eq!(
            rewrite(
                "realtek/android-14/mp.google-refplus.wave",
                ConvertScenario::MpToMpbackup,
                &config()
            ),
            "realtek/android-14/mp.google-refplus.wave.backup"
        );
    }

    #[test]
    fn test_mp_to_mpbackup_idempotent() {
        let once = rewrite(
            "realtek/android-14/mp.google-refplus.wave",
            ConvertScenario::MpToMpbackup,
            &config(),
        );
        assert_eq!(
            rewrite(&once, ConvertScenario::MpToMpbackup, &config()),
            once
        );
    }

    #[test]
    fn test_non_premp_branch_unchanged_by_premp_to_mp() {
        assert_eq!(
            rewrite("realtek/master", ConvertScenario::PrempToMp, &config()),
            "realtek/master"
        );
    }
}
