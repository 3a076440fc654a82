//! Resource addressing and payload validation

use crate::error::{ApiError, ErrorKind, Result};
use crate::keys::{self, QueryKey};
use crate::mutation::ResourceKind;
use crate::types::{
    College, CollegeInput, FormSubmission, FormSubmissionInput, GalleryImage, GalleryUpload,
    Inquiry, InquiryInput, Program, ProgramInput,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;

/// A record type served by the admin API.
///
/// # Example
///
/// ```rust,ignore
/// use campus_sdk::{College, Resource};
///
/// let key = College::detail_key("c1");
/// assert_eq!(key.to_string(), "[college, c1]");
/// ```
pub trait Resource: Sized + Send + Sync + Serialize + DeserializeOwned + 'static {
    const KIND: ResourceKind;

    /// Collection path under the API origin, without slashes
    const PATH: &'static str;

    fn list_key() -> QueryKey;

    fn detail_key(id: &str) -> QueryKey;
}

impl Resource for College {
    const KIND: ResourceKind = ResourceKind::College;
    const PATH: &'static str = "colleges";

    fn list_key() -> QueryKey {
        keys::colleges()
    }

    fn detail_key(id: &str) -> QueryKey {
        keys::college(id)
    }
}

impl Resource for Program {
    const KIND: ResourceKind = ResourceKind::Program;
    const PATH: &'static str = "programs";

    fn list_key() -> QueryKey {
        keys::programs()
    }

    fn detail_key(id: &str) -> QueryKey {
        keys::program(id)
    }
}

impl Resource for GalleryImage {
    const KIND: ResourceKind = ResourceKind::GalleryImage;
    const PATH: &'static str = "gallery";

    fn list_key() -> QueryKey {
        keys::gallery()
    }

    fn detail_key(id: &str) -> QueryKey {
        keys::gallery_image(id)
    }
}

impl Resource for Inquiry {
    const KIND: ResourceKind = ResourceKind::Inquiry;
    const PATH: &'static str = "inquiries";

    fn list_key() -> QueryKey {
        keys::inquiries()
    }

    fn detail_key(id: &str) -> QueryKey {
        keys::inquiry(id)
    }
}

impl Resource for FormSubmission {
    const KIND: ResourceKind = ResourceKind::FormSubmission;
    const PATH: &'static str = "forms";

    fn list_key() -> QueryKey {
        keys::forms()
    }

    fn detail_key(id: &str) -> QueryKey {
        keys::form(id)
    }
}

/// Client-side checks run before a write is sent.
///
/// Failures are reported as [`ErrorKind::Validation`] with per-field
/// messages, the same shape the server uses.
pub trait Validate {
    /// Collect `(field, message)` pairs for every problem found
    fn problems(&self) -> Vec<(&'static str, &'static str)>;

    fn validate(&self) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            return Ok(());
        }
        let field_errors: BTreeMap<String, String> = problems
            .into_iter()
            .map(|(field, message)| (field.to_string(), message.to_string()))
            .collect();
        Err(ApiError::new(ErrorKind::Validation, "Please correct the highlighted fields")
            .with_field_errors(field_errors))
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl Validate for CollegeInput {
    fn problems(&self) -> Vec<(&'static str, &'static str)> {
        let mut problems = Vec::new();
        if blank(&self.name) {
            problems.push(("name", "Name is required"));
        }
        if blank(&self.short_name) {
            problems.push(("shortName", "Short name is required"));
        }
        problems
    }
}

impl Validate for ProgramInput {
    fn problems(&self) -> Vec<(&'static str, &'static str)> {
        let mut problems = Vec::new();
        if blank(&self.title) {
            problems.push(("title", "Title is required"));
        }
        if blank(&self.category) {
            problems.push(("category", "Category is required"));
        }
        if blank(&self.duration) {
            problems.push(("duration", "Duration is required"));
        }
        problems
    }
}

impl Validate for GalleryUpload {
    fn problems(&self) -> Vec<(&'static str, &'static str)> {
        let mut problems = Vec::new();
        if blank(&self.title) {
            problems.push(("title", "Title is required"));
        }
        if blank(&self.category) {
            problems.push(("category", "Category is required"));
        }
        if blank(&self.alt) {
            problems.push(("alt", "Alt text is required"));
        }
        problems
    }
}

impl Validate for InquiryInput {
    fn problems(&self) -> Vec<(&'static str, &'static str)> {
        let mut problems = Vec::new();
        if blank(&self.name) {
            problems.push(("name", "Name is required"));
        }
        if !self.email.contains('@') {
            problems.push(("email", "A valid email is required"));
        }
        problems
    }
}

impl Validate for FormSubmissionInput {
    fn problems(&self) -> Vec<(&'static str, &'static str)> {
        let mut problems = Vec::new();
        if blank(&self.name) {
            problems.push(("name", "Name is required"));
        }
        if !self.email.contains('@') {
            problems.push(("email", "A valid email is required"));
        }
        if blank(&self.phone) {
            problems.push(("phone", "Phone is required"));
        }
        problems
    }
}
