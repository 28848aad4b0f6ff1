//! Serde model of the form-runner document format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::models::ConditionValue;

/// A complete runner document, the unit published to the form runner and
/// written to `form_runner/*.json` on export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDocument {
    #[serde(rename = "startPage")]
    pub start_page: Option<String>,
    pub pages: Vec<PageJson>,
    #[serde(default)]
    pub lists: Vec<ListJson>,
    #[serde(default)]
    pub conditions: Vec<ConditionJson>,
    #[serde(default)]
    pub sections: Vec<FormSectionJson>,
    #[serde(default)]
    pub outputs: Vec<Value>,
    #[serde(rename = "skipSummary", default)]
    pub skip_summary: bool,
    /// Absent in some hand-written documents; the importer falls back to
    /// the start page title.
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageJson {
    pub path: String,
    pub title: String,
    /// Component shapes vary by type, so they stay as raw JSON values.
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(default)]
    pub next: Vec<NextLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
}

impl PageJson {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            components: Vec::new(),
            next: Vec::new(),
            section: None,
            options: None,
            controller: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextLink {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionJson {
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub name: String,
    pub value: ConditionValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSectionJson {
    pub name: String,
    pub title: String,
    #[serde(rename = "hideTitle")]
    pub hide_title: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListJson {
    #[serde(rename = "type")]
    pub list_type: String,
    pub items: Value,
    pub name: String,
    pub title: Option<String>,
}

/// The fixed summary page appended to documents that lack one.
pub fn summary_page() -> PageJson {
    PageJson {
        path: "/summary".to_string(),
        title: "Check your answers".to_string(),
        components: Vec::new(),
        next: Vec::new(),
        section: None,
        options: None,
        controller: Some("./pages/summary.js".to_string()),
    }
}
