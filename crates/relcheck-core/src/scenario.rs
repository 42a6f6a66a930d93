//! Comparison scenarios: which pair of maturity stages is being diffed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::rewrite::ConvertScenario;

/// A pair of maturity stages to diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareScenario {
    /// master vs premp.
    MasterVsPremp,
    /// premp vs mp ("wave").
    PrempVsWave,
    /// mp vs mp-backup ("wave.backup").
    WaveVsBackup,
}

impl CompareScenario {
    /// The three canonical scenarios, in execution order.
    pub const ALL: [Self; 3] = [Self::MasterVsPremp, Self::PrempVsWave, Self::WaveVsBackup];

    /// Canonical scenario name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MasterVsPremp => "master_vs_premp",
            Self::PrempVsWave => "premp_vs_wave",
            Self::WaveVsBackup => "wave_vs_backup",
        }
    }

    /// Stage label attached to membership rows for this scenario.
    #[must_use]
    pub fn stage_label(self) -> &'static str {
        match self {
            Self::MasterVsPremp => "premp",
            Self::PrempVsWave => "wave",
            Self::WaveVsBackup => "wavebackup",
        }
    }

    /// The conversion direction whose output the compare side of this
    /// scenario is expected to be on.
    #[must_use]
    pub fn convert_direction(self) -> ConvertScenario {
        match self {
            Self::MasterVsPremp => ConvertScenario::MasterToPremp,
            Self::PrempVsWave => ConvertScenario::PrempToMp,
            Self::WaveVsBackup => ConvertScenario::MpToMpbackup,
        }
    }
}

impl fmt::Display for CompareScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompareScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master_vs_premp" => Ok(Self::MasterVsPremp),
            "premp_vs_wave" => Ok(Self::PrempVsWave),
            "wave_vs_backup" => Ok(Self::WaveVsBackup),
            other => Err(format!("unknown scenario: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for scenario in CompareScenario::ALL {
            assert_eq!(scenario.name().parse::<CompareScenario>(), Ok(scenario));
        }
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(CompareScenario::MasterVsPremp.stage_label(), "premp");
        assert_eq!(CompareScenario::PrempVsWave.stage_label(), "wave");
        assert_eq!(CompareScenario::WaveVsBackup.stage_label(), "wavebackup");
    }
}
