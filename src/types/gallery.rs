//! Gallery images

use super::college::CollegeRef;
use super::decode;
use super::media::Attachment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gallery reads are wrapped in `{data, status, message}`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub src: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub alt: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "decode::lenient_vec")]
    pub colleges: Vec<CollegeRef>,
    #[serde(default, deserialize_with = "decode::flattened_strings")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "decode::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "decode::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Multipart payload for uploading or editing a gallery image.
///
/// `image` may be omitted on edit to keep the current file.
#[derive(Debug, Clone, Default)]
pub struct GalleryUpload {
    pub image: Option<Attachment>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub alt: String,
    pub tags: Vec<String>,
    /// College ids the image belongs to
    pub colleges: Vec<String>,
}

impl GalleryUpload {
    /// Text fields in submission order, arrays as indexed fields
    /// (`tags[0]`, `colleges[0]`, ...)
    pub fn text_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("title".to_string(), self.title.clone()),
            ("description".to_string(), self.description.clone()),
            ("category".to_string(), self.category.clone()),
            ("alt".to_string(), self.alt.clone()),
        ];
        fields.extend(
            self.tags
                .iter()
                .map(|tag| tag.trim())
                .filter(|tag| !tag.is_empty())
                .enumerate()
                .map(|(i, tag)| (format!("tags[{}]", i), tag.to_string())),
        );
        fields.extend(
            self.colleges
                .iter()
                .enumerate()
                .map(|(i, id)| (format!("colleges[{}]", i), id.clone())),
        );
        fields
    }
}
