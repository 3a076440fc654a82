//! Write coordination
//!
//! Writes run through the [`MutationCoordinator`], which tracks each one as a
//! [`MutationRecord`] and invalidates the query keys it affects once the
//! server confirms it.

mod coordinator;

pub use coordinator::{MutationCoordinator, MutationOutcome};

use crate::error::ApiError;
use crate::keys::QueryKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Resource families managed by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    College,
    Program,
    GalleryImage,
    Inquiry,
    FormSubmission,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::College => "college",
            Self::Program => "program",
            Self::GalleryImage => "gallery_image",
            Self::Inquiry => "inquiry",
            Self::FormSubmission => "form_submission",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
    /// Attach binary media to an existing record
    Upload,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Upload => "upload",
        }
    }
}

/// Resource and operation a mutation writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationTarget {
    pub resource: ResourceKind,
    pub operation: Operation,
}

impl MutationTarget {
    pub fn new(resource: ResourceKind, operation: Operation) -> Self {
        Self {
            resource,
            operation,
        }
    }
}

impl std::fmt::Display for MutationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource, self.operation.as_str())
    }
}

/// Unique id of a mutation within one coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MutationId(pub u64);

impl std::fmt::Display for MutationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "m{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Lifecycle bookkeeping for one write
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub id: MutationId,
    pub target: MutationTarget,
    pub status: MutationStatus,
    pub error: Option<ApiError>,
    /// Query prefixes invalidated when the write succeeds
    pub affected_keys: BTreeSet<QueryKey>,
}

impl MutationRecord {
    pub fn is_pending(&self) -> bool {
        self.status == MutationStatus::Pending
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.status, MutationStatus::Success | MutationStatus::Error)
    }
}
