//! College records

use super::decode;
use super::media::Attachment;
use super::program::Program;
use serde::{Deserialize, Serialize};

/// College as returned by `/colleges` and `/colleges/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct College {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub short_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "decode::json_or_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, deserialize_with = "decode::json_or_default")]
    pub contact: Contact,
    #[serde(default, deserialize_with = "decode::string_or_empty")]
    pub color: String,
    #[serde(default, deserialize_with = "decode::lenient_vec")]
    pub programs: Vec<ProgramRef>,
    #[serde(default, deserialize_with = "decode::flattened_strings")]
    pub facilities: Vec<String>,
    #[serde(default, deserialize_with = "decode::lenient_vec")]
    pub faculty: Vec<Faculty>,
    #[serde(default, deserialize_with = "decode::lenient_vec")]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "decode::string_list")]
    pub phone: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Faculty {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub qualification: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
}

/// A program reference: bare id, or the populated program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgramRef {
    Id(String),
    Program(Box<Program>),
}

impl ProgramRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Program(program) => &program.id,
        }
    }
}

/// College summary embedded in programs and gallery images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

/// A college reference: bare id, or a populated summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollegeRef {
    Id(String),
    Summary(CollegeSummary),
}

impl CollegeRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Summary(summary) => &summary.id,
        }
    }
}

/// Payload for creating or replacing a college
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeInput {
    pub name: String,
    pub short_name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    pub contact: Contact,
    pub color: String,
    /// Program ids
    pub programs: Vec<String>,
    pub facilities: Vec<String>,
    pub faculty: Vec<Faculty>,
    pub events: Vec<Event>,
}

/// Multipart college edit: scalar fields as text, nested fields JSON-encoded,
/// plus optional replacement images
#[derive(Debug, Clone, Default)]
pub struct CollegeMediaUpdate {
    pub college: CollegeInput,
    pub logo: Option<Attachment>,
    pub banner: Option<Attachment>,
    pub faculty_images: Vec<Attachment>,
}

impl CollegeMediaUpdate {
    pub fn new(college: CollegeInput) -> Self {
        Self {
            college,
            ..Default::default()
        }
    }

    /// Text parts in submission order
    pub fn text_fields(&self) -> serde_json::Result<Vec<(&'static str, String)>> {
        let college = &self.college;
        let location = match &college.location {
            Some(location) => serde_json::to_string(location)?,
            None => String::new(),
        };
        Ok(vec![
            ("name", college.name.clone()),
            ("shortName", college.short_name.clone()),
            ("description", college.description.clone()),
            ("location", location),
            ("affiliation", college.affiliation.clone().unwrap_or_default()),
            ("color", college.color.clone()),
            ("facilities", serde_json::to_string(&college.facilities)?),
            ("contact", serde_json::to_string(&college.contact)?),
            ("faculty", serde_json::to_string(&college.faculty)?),
            ("events", serde_json::to_string(&college.events)?),
        ])
    }
}

/// Body of the single-image upload endpoints
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaUploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub college: College,
}
