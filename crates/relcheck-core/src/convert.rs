//! Manifest branch conversion.
//!
//! Rewrites the `revision`, `upstream`, and `dest-branch` attributes of a
//! manifest document for a conversion direction, preserving the document's
//! formatting, and validates a converted manifest against a known-good
//! target manifest by the `(name, path)` key.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::CompareConfig;
use crate::manifest::{parse_manifest, ParseError};
use crate::refs::{classify, RefKind, TAG_PREFIX};
use crate::remote::{RemoteError, RemoteMeta};
use crate::rewrite::{rewrite, ConvertScenario};

/// Errors raised by the conversion engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The input or target manifest is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result of converting a manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedManifest {
    /// The converted document, formatting preserved.
    pub xml: String,
    /// Number of attribute values that changed.
    pub rewritten: usize,
    /// Number of attribute values left unchanged (tags, Google refs,
    /// already-converted values).
    pub skipped: usize,
}

/// One row of a conversion validation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRow {
    /// Project name.
    pub name: String,
    /// Project path.
    pub path: String,
    /// Revision in the converted manifest.
    pub converted_revision: String,
    /// Revision in the target manifest; empty when the project is absent
    /// there.
    pub target_revision: String,
    /// Whether the revisions agree.
    pub matches: bool,
    /// Whether the converted ref exists on the remote: `Y`, `N`, or `-`
    /// when no remote was consulted or the remote was unavailable.
    pub exists: String,
}

/// Branch-reference attributes rewritten during conversion.
static REF_ATTRIBUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(revision|upstream|dest-branch)="([^"]*)""#).expect("invalid attribute pattern")
});

/// Convert a manifest document to the next release line.
///
/// The document is rewritten attribute-by-attribute so comments, element
/// order, and whitespace survive unchanged. The input must parse as a
/// manifest before conversion; a malformed document is rejected rather than
/// half-rewritten.
///
/// # Errors
///
/// Returns [`ConvertError::Parse`] when the input is not a valid manifest.
pub fn convert_manifest(
    content: &str,
    scenario: ConvertScenario,
    config: &CompareConfig,
) -> Result<ConvertedManifest, ConvertError> {
    parse_manifest(content)?;

    let mut rewritten = 0usize;
    let mut skipped = 0usize;
    let mut apply = |segment: &str| {
        REF_ATTRIBUTES
            .replace_all(segment, |caps: &Captures<'_>| {
                let attribute = &caps[1];
                let value = &caps[2];
                let replacement = rewrite(value, scenario, config);
                if replacement == value {
                    skipped += 1;
                } else {
                    rewritten += 1;
                }
                format!(r#"{attribute}="{replacement}""#)
            })
            .into_owned()
    };

    // Commented-out elements are inert; their attributes must survive
    // untouched.
    let mut xml = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("<!--") {
        xml.push_str(&apply(&rest[..start]));
        let comment = &rest[start..];
        match comment.find("-->") {
            Some(end) => {
                let end = end + "-->".len();
                xml.push_str(&comment[..end]);
                rest = &comment[end..];
            }
            None => {
                xml.push_str(comment);
                rest = "";
            }
        }
    }
    xml.push_str(&apply(rest));

    debug!(%scenario, rewritten, skipped, "converted manifest");
    Ok(ConvertedManifest {
        xml,
        rewritten,
        skipped,
    })
}

/// Validate a converted manifest against a known-good target manifest.
///
/// Projects are matched by `(name, path)`. When a remote metadata provider
/// is given, each converted reference is checked for existence; an
/// unavailable remote records `-` instead of failing the validation.
///
/// # Errors
///
/// Returns [`ConvertError::Parse`] when either manifest is malformed.
pub fn validate_conversion(
    converted: &str,
    target: &str,
    remote: Option<&dyn RemoteMeta>,
) -> Result<Vec<ValidationRow>, ConvertError> {
    let converted_doc = parse_manifest(converted)?;
    let target_doc = parse_manifest(target)?;

    let mut rows = Vec::new();
    for project in converted_doc.projects.iter() {
        let target_revision = target_doc
            .projects
            .get(&project.key())
            .map(|p| p.revision.clone())
            .unwrap_or_default();
        let matches = !target_revision.is_empty() && target_revision == project.revision;
        let exists = match remote {
            Some(remote) => ref_existence(remote, &project.name, &project.revision),
            None => "-".to_string(),
        };
        rows.push(ValidationRow {
            name: project.name.clone(),
            path: project.path.clone(),
            converted_revision: project.revision.clone(),
            target_revision,
            matches,
            exists,
        });
    }
    Ok(rows)
}

fn ref_existence(remote: &dyn RemoteMeta, project: &str, reference: &str) -> String {
    if reference.is_empty() {
        return "-".to_string();
    }
    let lookup = match classify(reference) {
        RefKind::Tag => {
            let tag = reference.trim_start_matches(TAG_PREFIX);
            remote.get_tag(project, tag)
        }
        RefKind::Branch => remote.get_branch(project, reference),
        // A pinned hash has no ref to look up.
        RefKind::Hash => return "-".to_string(),
    };
    match lookup {
        Ok(info) if info.exists => "Y".to_string(),
        Ok(_) => "N".to_string(),
        Err(RemoteError::Unavailable { .. }) => "-".to_string(),
        Err(_) => "-".to_string(),
    }
}
