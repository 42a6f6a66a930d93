//! JSON report sink.
//!
//! Serializes the full report for scripting; row order and serial numbers
//! are exactly those of the xlsx sheets.

use std::path::PathBuf;

use relcheck_core::report::{EmitError, ReportSink};
use relcheck_core::SummaryReport;

/// Writes the report as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    /// Create a sink writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonSink {
    fn write(&mut self, report: &SummaryReport) -> Result<(), EmitError> {
        let file = std::fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(file, report).map_err(|e| EmitError::Render {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut sink = JsonSink::new(&path);
        sink.write(&SummaryReport::default()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["summary"].is_array());
    }
}
