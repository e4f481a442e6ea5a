//! Attribute groups shared by most standard elements

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::element::{invalid_value, optional_attribute};
use crate::error::Result;

fn set_optional(element: &mut Element, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        element.attributes.insert(name.to_string(), value.clone());
    }
}

fn get_optional(element: &Element, name: &str) -> Option<String> {
    optional_attribute(element, name).map(str::to_string)
}

/// `id` and `description`, common to most standard elements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BaseElement {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            description: Some(description.into()),
        }
    }

    pub fn write_attributes(&self, element: &mut Element) {
        set_optional(element, "id", &self.id);
        set_optional(element, "description", &self.description);
    }

    pub fn from_attributes(element: &Element) -> Self {
        Self {
            id: get_optional(element, "id"),
            description: get_optional(element, "description"),
        }
    }
}

/// Document-level provenance of a top-level SSP file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLevelMetaData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_date_and_time: Option<DateTime<Utc>>,
}

impl TopLevelMetaData {
    /// Metadata stamped with the current time and this crate as generation tool
    pub fn generated_now() -> Self {
        Self {
            generation_tool: Some(format!(
                "{} {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            )),
            generation_date_and_time: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn write_attributes(&self, element: &mut Element) {
        set_optional(element, "author", &self.author);
        set_optional(element, "fileversion", &self.file_version);
        set_optional(element, "copyright", &self.copyright);
        set_optional(element, "license", &self.license);
        set_optional(element, "generationTool", &self.generation_tool);
        if let Some(timestamp) = &self.generation_date_and_time {
            element.attributes.insert(
                "generationDateAndTime".to_string(),
                timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            );
        }
    }

    pub fn from_attributes(element: &Element) -> Result<Self> {
        let generation_date_and_time = match optional_attribute(element, "generationDateAndTime") {
            Some(raw) => Some(parse_date_time(raw).ok_or_else(|| {
                invalid_value(element, "generationDateAndTime", raw, "expected xs:dateTime")
            })?),
            None => None,
        };

        Ok(Self {
            author: get_optional(element, "author"),
            file_version: get_optional(element, "fileversion"),
            copyright: get_optional(element, "copyright"),
            license: get_optional(element, "license"),
            generation_tool: get_optional(element, "generationTool"),
            generation_date_and_time,
        })
    }
}

/// `xs:dateTime` allows an absent timezone; such values are taken as UTC.
fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
