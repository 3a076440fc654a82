//! Query keys
//!
//! A query key is an ordered tuple of scalars. Two keys name the same query
//! iff their parts are equal element by element. Invalidation works on
//! prefixes: `["gallery"]` covers `["gallery", "id", "abc"]` and
//! `["gallery", "college", "abc"]`.

use crate::mutation::{MutationTarget, Operation, ResourceKind};
use serde::{Deserialize, Serialize};

/// One scalar component of a query key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPart {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl std::fmt::Display for KeyPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for KeyPart {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<i64> for KeyPart {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for KeyPart {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<bool> for KeyPart {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Structural identity of a cached query
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    /// Key with a single leading part, usually the resource family
    pub fn new(first: impl Into<KeyPart>) -> Self {
        Self(vec![first.into()])
    }

    /// Empty key. As a prefix it matches every entry.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a part
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `prefix` equals this key or its leading parts
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", part)?;
        }
        write!(f, "]")
    }
}

impl<P: Into<KeyPart>> FromIterator<P> for QueryKey {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Build a key from heterogeneous parts: `query_key!["college", id]`
#[macro_export]
macro_rules! query_key {
    () => { $crate::keys::QueryKey::root() };
    ($first:expr $(, $rest:expr)* $(,)?) => {
        $crate::keys::QueryKey::new($first)$(.with($rest))*
    };
}

// Key families used by the dashboard

pub fn colleges() -> QueryKey {
    QueryKey::new("colleges")
}

pub fn college(id: &str) -> QueryKey {
    QueryKey::new("college").with(id)
}

/// Prefix covering every college detail entry
pub fn all_colleges_detail() -> QueryKey {
    QueryKey::new("college")
}

pub fn programs() -> QueryKey {
    QueryKey::new("programs")
}

pub fn program(id: &str) -> QueryKey {
    QueryKey::new("program").with(id)
}

/// Prefix covering every program detail entry
pub fn all_programs_detail() -> QueryKey {
    QueryKey::new("program")
}

/// The gallery family; as a prefix it covers every gallery entry
pub fn gallery() -> QueryKey {
    QueryKey::new("gallery")
}

/// `["gallery", "id", id]`, disjoint from the by-college family
pub fn gallery_image(id: &str) -> QueryKey {
    gallery().with("id").with(id)
}

pub fn gallery_by_college(college_id: &str) -> QueryKey {
    gallery().with("college").with(college_id)
}

pub fn inquiries() -> QueryKey {
    QueryKey::new("inquiries")
}

pub fn inquiry(id: &str) -> QueryKey {
    QueryKey::new("inquiry").with(id)
}

pub fn forms() -> QueryKey {
    QueryKey::new("forms")
}

pub fn form(id: &str) -> QueryKey {
    QueryKey::new("form").with(id)
}

/// Keys whose cached data a write can render inconsistent.
///
/// Colleges embed their programs and programs embed their colleges, so a
/// write to either family stales both. Gallery images embed college
/// summaries, so college updates and deletes stale the gallery too.
pub fn affected_keys(target: &MutationTarget, id: Option<&str>) -> Vec<QueryKey> {
    let mut keys = Vec::new();
    match (target.resource, target.operation) {
        (ResourceKind::College, Operation::Create) => {
            keys.push(colleges());
            keys.push(programs());
            keys.push(all_programs_detail());
        }
        (ResourceKind::College, _) => {
            keys.push(colleges());
            keys.extend(id.map(college));
            keys.push(programs());
            keys.push(all_programs_detail());
            keys.push(gallery());
        }
        (ResourceKind::Program, Operation::Create) => {
            keys.push(programs());
            keys.push(colleges());
            keys.push(all_colleges_detail());
        }
        (ResourceKind::Program, _) => {
            keys.push(programs());
            keys.extend(id.map(program));
            keys.push(colleges());
            keys.push(all_colleges_detail());
        }
        (ResourceKind::GalleryImage, _) => keys.push(gallery()),
        (ResourceKind::Inquiry, _) => {
            keys.push(inquiries());
            keys.extend(id.map(inquiry));
        }
        (ResourceKind::FormSubmission, _) => {
            keys.push(forms());
            keys.extend(id.map(form));
        }
    }
    keys
}
