//! Repo manifest parsing.
//!
//! Parses an Android-style `manifest.xml` into a canonical [`ProjectSet`]
//! keyed by the composite `(name, path)` pair. `name` alone is not unique —
//! the same project is routinely checked out under several paths — so the
//! composite key is the only correct identity and duplicates are preserved.
//!
//! `<default>` inheritance is resolved at parse time: a project without a
//! `remote` takes the default remote, and a project without a `revision`
//! whose effective remote is `rtk` takes the default revision. The number of
//! defaulted revisions is recorded for reporting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DEFAULT_REMOTE;

/// Errors raised while parsing a manifest document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The document is not well-formed XML.
    #[error("malformed manifest: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The root element is not `<manifest>`.
    #[error("unexpected root element: <{found}>")]
    UnexpectedRoot {
        /// The tag name that was found instead.
        found: String,
    },

    /// A `<project>` element has no `name` attribute.
    #[error("project element without a name (path: {path:?})")]
    UnnamedProject {
        /// The `path` attribute of the offending element, if any.
        path: String,
    },

    /// The document bytes are not valid UTF-8.
    #[error("manifest is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),
}

/// One `<project>` entry after default inheritance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Gerrit project name.
    pub name: String,
    /// Checkout path; may be empty.
    pub path: String,
    /// Effective revision (after default substitution).
    pub revision: String,
    /// Upstream branch attribute.
    pub upstream: String,
    /// `dest-branch` attribute.
    pub dest_branch: String,
    /// `groups` attribute.
    pub groups: String,
    /// `clone-depth` attribute.
    pub clone_depth: String,
    /// Effective remote (after default substitution).
    pub remote: String,
}

impl Project {
    /// Composite identity of the project inside a manifest.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}|{}", self.name, self.path)
    }
}

/// An insertion-ordered set of projects keyed by `(name, path)`.
///
/// Iteration yields projects in document order, which downstream diff
/// streams rely on for stable output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSet {
    entries: Vec<Project>,
    #[serde(skip)]
    index: std::collections::HashMap<String, usize>,
}

impl ProjectSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a project, replacing any existing entry with the same
    /// `(name, path)` key.
    pub fn insert(&mut self, project: Project) {
        let key = project.key();
        if let Some(&pos) = self.index.get(&key) {
            self.entries[pos] = project;
        } else {
            self.index.insert(key, self.entries.len());
            self.entries.push(project);
        }
    }

    /// Look up a project by its composite key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Project> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    /// Whether a composite key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Projects in insertion (document) order.
    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.entries.iter()
    }

    /// Number of projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Project> for ProjectSet {
    fn from_iter<I: IntoIterator<Item = Project>>(iter: I) -> Self {
        let mut set = Self::new();
        for project in iter {
            set.insert(project);
        }
        set
    }
}

/// A parsed manifest: the project set plus the `<default>` element values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestDocument {
    /// Projects in document order.
    pub projects: ProjectSet,
    /// `<default remote=...>`.
    pub default_remote: String,
    /// `<default revision=...>`.
    pub default_revision: String,
    /// How many projects inherited the default revision.
    pub defaulted_revisions: usize,
}

/// Parse a manifest document from raw bytes.
///
/// # Errors
///
/// Returns [`ParseError`] when the bytes are not UTF-8, the XML is
/// malformed, the root element is not `<manifest>`, or a project lacks a
/// name.
pub fn parse_manifest_bytes(bytes: &[u8]) -> Result<ManifestDocument, ParseError> {
    parse_manifest(std::str::from_utf8(bytes)?)
}

/// Parse a manifest document from a string.
///
/// # Errors
///
/// See [`parse_manifest_bytes`].
pub fn parse_manifest(content: &str) -> Result<ManifestDocument, ParseError> {
    let doc = roxmltree::Document::parse(content)?;
    let root = doc.root_element();
    if root.tag_name().name() != "manifest" {
        return Err(ParseError::UnexpectedRoot {
            found: root.tag_name().name().to_string(),
        });
    }

    let mut manifest = ManifestDocument::default();

    if let Some(default) = root
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "default")
    {
        manifest.default_remote = attr(default, "remote");
        manifest.default_revision = attr(default, "revision");
    }

    for node in root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "project")
    {
        let name = attr(node, "name");
        let path = attr(node, "path");
        if name.is_empty() {
            return Err(ParseError::UnnamedProject { path });
        }

        let mut remote = attr(node, "remote");
        if remote.is_empty() {
            remote = manifest.default_remote.clone();
        }

        let mut revision = attr(node, "revision");
        if revision.is_empty() && remote == DEFAULT_REMOTE {
            revision = manifest.default_revision.clone();
            if !revision.is_empty() {
                manifest.defaulted_revisions += 1;
            }
        }

        manifest.projects.insert(Project {
            name,
            path,
            revision,
            upstream: attr(node, "upstream"),
            dest_branch: attr(node, "dest-branch"),
            groups: attr(node, "groups"),
            clone_depth: attr(node, "clone-depth"),
            remote,
        });
    }

    Ok(manifest)
}

fn attr(node: roxmltree::Node<'_, '_>, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}
