//! Academic program records

use super::college::CollegeRef;
use super::decode;
use serde::{Deserialize, Serialize};

/// Program as returned by `/programs` and `/programs/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career: Option<String>,
    #[serde(default, deserialize_with = "decode::string_list")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "decode::lenient_vec")]
    pub colleges: Vec<CollegeRef>,
}

/// Payload for creating or replacing a program
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgramInput {
    pub title: String,
    pub category: String,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career: Option<String>,
    pub features: Vec<String>,
    /// College ids offering the program
    pub colleges: Vec<String>,
}
