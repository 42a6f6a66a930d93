//! Difference engines over parsed inputs.

pub mod manifest;
pub mod version;

pub use manifest::{
    diff_project_sets, BranchError, ManifestDiff, Membership, MembershipState, RevisionDelta,
};
pub use version::{diff_f_version, diff_version, VersionDiffRow};
