//! Core engine for firmware release manifest comparison.
//!
//! Given a source tree of per-module build folders, the engine pairs folders
//! across maturity stages (master, premp, wave, wave.backup), parses each
//! side's repo manifest and companion version files, diffs them under the
//! release-engineering rules, and collates a multi-sheet report. A sibling
//! conversion engine rewrites manifest branch references between release
//! lines and validates the result.
//!
//! The crate is a pure data transformation: all I/O goes through the
//! [`tree::SourceTree`] and [`remote::RemoteMeta`] seams, rule tables are an
//! explicit [`config::CompareConfig`], and logging is emitted through
//! `tracing` without any subscriber configuration.

pub mod config;
pub mod convert;
pub mod diff;
pub mod manifest;
pub mod mapping;
pub mod orchestrate;
pub mod refs;
pub mod remote;
pub mod report;
pub mod rewrite;
pub mod scenario;
pub mod tree;

pub use config::{CompareConfig, ConfigError, GerritHosts};
pub use convert::{convert_manifest, validate_conversion, ConvertError, ConvertedManifest};
pub use manifest::{parse_manifest, ManifestDocument, ParseError, Project, ProjectSet};
pub use orchestrate::{collate, Orchestrator, ScenarioResult, Stage};
pub use refs::{classify, RefKind};
pub use report::{EmitError, ReportSink, SummaryReport};
pub use rewrite::{rewrite, ConvertScenario};
pub use scenario::CompareScenario;
pub use tree::{FsSourceTree, MemSourceTree, SourceTree, TreeError};
