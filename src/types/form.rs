//! Contact form submissions

use super::decode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Preferred callback window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BestTime {
    Morning,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub program: String,
    #[serde(default, deserialize_with = "decode::lenient_option")]
    pub best_time: Option<BestTime>,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub message: String,
    /// Free-form fields captured by the public form
    #[serde(default, deserialize_with = "decode::json_object")]
    pub metadata: Map<String, Value>,
    #[serde(default, deserialize_with = "decode::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "decode::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `/forms` list responses are wrapped in `{data: [...]}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FormList {
    #[serde(default, deserialize_with = "decode::lenient_vec")]
    pub data: Vec<FormSubmission>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmissionInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_time: Option<BestTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}
