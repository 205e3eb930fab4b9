//! Label data model.
//!
//! Labels are assigned to annotations and, as image labels, to the whole
//! image. The host supplies the set of possible labels.

use serde::{Deserialize, Serialize};

/// A label the user may assign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Unique identifier for the label
    pub id: u32,
    /// Display name of the label
    #[serde(rename = "label")]
    pub name: String,
    /// Longer description shown by the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// CSS color string, if the host assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Label {
    /// Create a new label with the given ID and name.
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: None,
            color: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }
}
