//! Inquiries submitted from the public site

use super::decode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub phone: String,
    /// College id or name
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub college: String,
    /// Program id or name
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub program: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub inquiry: String,
    #[serde(default, deserialize_with = "decode::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "decode::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InquiryInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub program: String,
    pub inquiry: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let inquiry: Inquiry = serde_json::from_value(json!({
            "_id": "i1",
            "name": "Asha",
            "phone": 9800000000u64,
            "college": null,
            "createdAt": "not a date"
        }))
        .unwrap();

        assert_eq!(inquiry.email, "");
        assert_eq!(inquiry.phone, "9800000000");
        assert_eq!(inquiry.college, "");
        assert!(inquiry.created_at.is_none());
    }
}
