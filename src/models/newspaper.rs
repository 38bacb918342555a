//! Newspaper model: an article record with one topic and any number of redactors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Redactor, Topic};
use crate::validation::{required_text, FieldErrors, Validate, REQUIRED};

pub const NEWSPAPER_TITLE_MAX_LENGTH: usize = 255;
pub const INVALID_DATE: &str = "Enter a valid date.";
pub const INVALID_TOPIC: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Message for a redactor id that does not resolve.
pub fn invalid_redactor_choice(id: &str) -> String {
    format!(
        "Select a valid choice. {} is not one of the available choices.",
        id
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Newspaper {
    pub id: String,
    pub title: String,
    pub context: String,
    pub published_date: NaiveDate,
    pub topic_id: String,
}

/// A newspaper with its topic loaded alongside.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewspaperWithTopic {
    #[serde(flatten)]
    pub newspaper: Newspaper,
    pub topic: Topic,
}

/// Everything the detail view shows about one newspaper.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewspaperDetail {
    #[serde(flatten)]
    pub newspaper: Newspaper,
    pub topic: Topic,
    pub redactors: Vec<Redactor>,
}

/// Request body for creating or editing a newspaper.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewspaperForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub topic_id: Option<String>,
    /// Redactors to assign as authors
    #[serde(default)]
    pub redactor_ids: Vec<String>,
}

/// Cleaned newspaper fields; `topic_id` and `redactor_ids` are still to be
/// resolved against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewspaperInput {
    pub title: String,
    pub context: String,
    pub published_date: NaiveDate,
    pub topic_id: String,
    pub redactor_ids: Vec<String>,
}

impl Validate for NewspaperForm {
    type Clean = NewspaperInput;

    fn validate(self) -> Result<NewspaperInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required_text(
            &mut errors,
            "title",
            &self.title,
            Some(NEWSPAPER_TITLE_MAX_LENGTH),
        );
        let context = required_text(&mut errors, "context", &self.context, None);

        let published_date = match self.published_date.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add("publishedDate", REQUIRED);
                NaiveDate::MIN
            }
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|_| {
                errors.add("publishedDate", INVALID_DATE);
                NaiveDate::MIN
            }),
        };

        let topic_id = self
            .topic_id
            .map(|id| id.trim().to_string())
            .unwrap_or_default();
        if topic_id.is_empty() {
            errors.add("topicId", REQUIRED);
        }

        let mut redactor_ids: Vec<String> = Vec::with_capacity(self.redactor_ids.len());
        for id in self.redactor_ids {
            let id = id.trim().to_string();
            if id.is_empty() {
                errors.add("redactorIds", invalid_redactor_choice("''"));
            } else if !redactor_ids.contains(&id) {
                redactor_ids.push(id);
            }
        }

        errors.finish(NewspaperInput {
            title,
            context,
            published_date,
            topic_id,
            redactor_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NewspaperForm {
        NewspaperForm {
            title: "Morning Post".to_string(),
            context: "Daily headlines".to_string(),
            published_date: Some("2024-03-01".to_string()),
            topic_id: Some("topic-1".to_string()),
            redactor_ids: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        }
    }

    #[test]
    fn test_valid_form_collapses_duplicate_redactors() {
        let input = form().validate().unwrap();
        assert_eq!(input.published_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(input.redactor_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_redactors_may_be_empty() {
        let mut form = form();
        form.redactor_ids.clear();
        assert!(form.validate().unwrap().redactor_ids.is_empty());
    }

    #[test]
    fn test_bad_date_and_missing_topic() {
        let mut form = form();
        form.published_date = Some("01/03/2024".to_string());
        form.topic_id = None;

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("publishedDate").unwrap()[0], INVALID_DATE);
        assert_eq!(errors.get("topicId").unwrap()[0], REQUIRED);
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let errors = NewspaperForm::default().validate().unwrap_err();
        for field in ["title", "context", "publishedDate", "topicId"] {
            assert!(errors.get(field).is_some(), "missing error for {}", field);
        }
    }
}
