//! Topic model: a named category newspapers belong to.

use serde::{Deserialize, Serialize};

use crate::validation::{required_text, FieldErrors, Validate};

pub const TOPIC_NAME_MAX_LENGTH: usize = 255;
pub const TOPIC_NAME_TAKEN: &str = "Topic with this Name already exists.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
}

/// Request body for creating or renaming a topic.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicForm {
    #[serde(default)]
    pub name: String,
}

/// Cleaned topic fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicInput {
    pub name: String,
}

impl Validate for TopicForm {
    type Clean = TopicInput;

    fn validate(self) -> Result<TopicInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, Some(TOPIC_NAME_MAX_LENGTH));
        errors.finish(TopicInput { name })
    }
}
