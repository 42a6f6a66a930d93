//! Remote metadata provider seam.
//!
//! The branch-conversion engine checks converted references against a code
//! review server through this trait. All operations are idempotent;
//! [`RemoteMeta::create_branch`] reports "already exists" distinctly from
//! "created". An unavailable remote is a recoverable condition: callers
//! record existence as unknown (`-`) and continue.

use thiserror::Error;

/// Errors raised by a remote metadata provider.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    /// The remote could not be reached.
    #[error("remote unavailable: {reason}")]
    Unavailable {
        /// Transport-level description.
        reason: String,
    },

    /// The remote rejected the request.
    #[error("remote request rejected for {project}: {reason}")]
    Rejected {
        /// The project the request was for.
        project: String,
        /// Server-side description.
        reason: String,
    },
}

/// Existence and revision of a ref on the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefInfo {
    /// Whether the ref exists.
    pub exists: bool,
    /// The revision the ref points at; empty when it does not exist.
    pub revision: String,
}

/// Outcome of a branch creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateBranchOutcome {
    /// The branch was created.
    Created,
    /// A branch with that name already existed.
    AlreadyExists,
}

/// Read/create access to refs on a review server.
pub trait RemoteMeta {
    /// All refs of a project.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the remote cannot answer.
    fn list_refs(&self, project: &str) -> Result<Vec<String>, RemoteError>;

    /// Look up a branch.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the remote cannot answer.
    fn get_branch(&self, project: &str, branch: &str) -> Result<RefInfo, RemoteError>;

    /// Look up a tag.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the remote cannot answer.
    fn get_tag(&self, project: &str, tag: &str) -> Result<RefInfo, RemoteError>;

    /// Create a branch at a revision.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the remote cannot answer.
    fn create_branch(
        &self,
        project: &str,
        branch: &str,
        revision: &str,
    ) -> Result<CreateBranchOutcome, RemoteError>;
}
