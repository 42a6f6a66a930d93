//! Revision reference classification.
//!
//! Every place the engine interprets a revision string goes through
//! [`classify`]: the rewriter uses it to skip tags, the report layer uses it
//! to pick the gitiles link template.

use serde::{Deserialize, Serialize};

/// Prefix that marks a tag reference.
pub const TAG_PREFIX: &str = "refs/tags/";

/// The kind of a revision reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    /// A tag reference (`refs/tags/...`).
    Tag,
    /// A branch name, with or without the `refs/heads/` prefix.
    Branch,
    /// A 40-character hexadecimal commit hash.
    Hash,
}

/// Classify a revision string.
///
/// Pure and total. Rules, in order: the empty string is a branch (neutral
/// default), a `refs/tags/` prefix is a tag, 40 hex characters is a commit
/// hash, anything else is a branch.
#[must_use]
pub fn classify(reference: &str) -> RefKind {
    if reference.is_empty() {
        return RefKind::Branch;
    }
    if reference.starts_with(TAG_PREFIX) {
        return RefKind::Tag;
    }
    if is_commit_hash(reference) {
        return RefKind::Hash;
    }
    RefKind::Branch
}

/// Whether a string is a full 40-hex commit hash.
#[must_use]
pub fn is_commit_hash(reference: &str) -> bool {
    reference.len() == 40 && reference.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Shorten a revision to its display form: the first seven characters for
/// hashes, the string unchanged otherwise.
#[must_use]
pub fn short_revision(reference: &str) -> String {
    if is_commit_hash(reference) {
        reference[..7].to_string()
    } else {
        reference.to_string()
    }
}
