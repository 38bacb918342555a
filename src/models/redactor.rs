//! Redactor model: a staff account plus the agency's own fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NewspaperWithTopic;
use crate::validation::{
    optional_text, required_text, years_of_experience, FieldErrors, Validate, REQUIRED,
};

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const PERSON_NAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const INVALID_USERNAME: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const PASSWORD_TOO_SHORT: &str =
    "This password is too short. It must contain at least 8 characters.";
pub const PASSWORD_NUMERIC: &str = "This password is entirely numeric.";
pub const PASSWORD_TOO_SIMILAR: &str = "The password is too similar to the username.";

/// Login identity shared by every staff account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redactor {
    pub id: String,
    #[serde(flatten)]
    pub account: Account,
    pub years_of_experience: i64,
    pub is_featured: bool,
    pub date_joined: DateTime<Utc>,
}

impl Redactor {
    /// `username (first last)`, as shown in lists and logs.
    pub fn display_name(&self) -> String {
        format!(
            "{} ({} {})",
            self.account.username, self.account.first_name, self.account.last_name
        )
    }
}

/// A redactor with the newspapers they are assigned to, each with its topic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactorWithNewspapers {
    #[serde(flatten)]
    pub redactor: Redactor,
    pub newspapers: Vec<NewspaperWithTopic>,
}

/// Request body for registering a redactor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactorCreationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
    #[serde(default)]
    pub years_of_experience: Option<i64>,
}

/// Cleaned registration; the password is still plaintext here.
#[derive(Debug, Clone)]
pub struct NewRedactor {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub years_of_experience: i64,
}

impl Validate for RedactorCreationForm {
    type Clean = NewRedactor;

    fn validate(self) -> Result<NewRedactor, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = required_text(
            &mut errors,
            "username",
            &self.username,
            Some(USERNAME_MAX_LENGTH),
        );
        if !username.is_empty() && !is_valid_username(&username) {
            errors.add("username", INVALID_USERNAME);
        }

        let first_name = optional_text(
            &mut errors,
            "firstName",
            &self.first_name,
            Some(PERSON_NAME_MAX_LENGTH),
        );
        let last_name = optional_text(
            &mut errors,
            "lastName",
            &self.last_name,
            Some(PERSON_NAME_MAX_LENGTH),
        );

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if !self.password1.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", PASSWORD_MISMATCH);
            } else {
                check_password_strength(&mut errors, &self.password2, &username);
            }
        }

        let years_of_experience = years_of_experience(&mut errors, self.years_of_experience);

        errors.finish(NewRedactor {
            username,
            first_name,
            last_name,
            password: self.password1,
            years_of_experience,
        })
    }
}

/// Request body for the redactor update; only these two fields are editable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactorExperienceForm {
    #[serde(default)]
    pub years_of_experience: Option<i64>,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedactorChanges {
    pub years_of_experience: i64,
    pub is_featured: bool,
}

impl Validate for RedactorExperienceForm {
    type Clean = RedactorChanges;

    fn validate(self) -> Result<RedactorChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let years_of_experience = years_of_experience(&mut errors, self.years_of_experience);
        errors.finish(RedactorChanges {
            years_of_experience,
            is_featured: self.is_featured,
        })
    }
}

/// Request body for logging in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn check_password_strength(errors: &mut FieldErrors, password: &str, username: &str) {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        errors.add("password2", PASSWORD_TOO_SHORT);
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        errors.add("password2", PASSWORD_NUMERIC);
    }
    if !username.is_empty()
        && password
            .to_lowercase()
            .contains(&username.to_lowercase())
    {
        errors.add("password2", PASSWORD_TOO_SIMILAR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::YEARS_OF_EXPERIENCE_TOO_LOW;

    fn creation_form(years: i64) -> RedactorCreationForm {
        RedactorCreationForm {
            username: "j.doe".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            password1: "quill-and-ink-42".to_string(),
            password2: "quill-and-ink-42".to_string(),
            years_of_experience: Some(years),
        }
    }

    #[test]
    fn test_creation_accepts_experience_floor() {
        let redactor = creation_form(3).validate().unwrap();
        assert_eq!(redactor.username, "j.doe");
        assert_eq!(redactor.years_of_experience, 3);
    }

    #[test]
    fn test_creation_rejects_below_floor() {
        let errors = creation_form(2).validate().unwrap_err();
        assert_eq!(
            errors.get("yearsOfExperience").unwrap()[0],
            YEARS_OF_EXPERIENCE_TOO_LOW
        );
    }

    #[test]
    fn test_password_rules() {
        let mut form = creation_form(5);
        form.password2 = "something-else".to_string();
        assert_eq!(
            form.validate().unwrap_err().get("password2").unwrap()[0],
            PASSWORD_MISMATCH
        );

        let mut form = creation_form(5);
        form.password1 = "1234".to_string();
        form.password2 = "1234".to_string();
        let errors = form.validate().unwrap_err();
        let messages = errors.get("password2").unwrap();
        assert!(messages.contains(&PASSWORD_TOO_SHORT.to_string()));
        assert!(messages.contains(&PASSWORD_NUMERIC.to_string()));

        let mut form = creation_form(5);
        form.password1 = "J.Doe-secret".to_string();
        form.password2 = "J.Doe-secret".to_string();
        assert_eq!(
            form.validate().unwrap_err().get("password2").unwrap()[0],
            PASSWORD_TOO_SIMILAR
        );
    }

    #[test]
    fn test_username_characters() {
        let mut form = creation_form(5);
        form.username = "jane doe".to_string();
        assert_eq!(
            form.validate().unwrap_err().get("username").unwrap()[0],
            INVALID_USERNAME
        );
    }

    #[test]
    fn test_experience_form() {
        let changes = RedactorExperienceForm {
            years_of_experience: Some(10),
            is_featured: true,
        }
        .validate()
        .unwrap();
        assert_eq!(
            changes,
            RedactorChanges {
                years_of_experience: 10,
                is_featured: true
            }
        );

        assert!(RedactorExperienceForm {
            years_of_experience: Some(2),
            is_featured: false,
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let redactor = Redactor {
            id: "r1".to_string(),
            account: Account {
                username: "editor".to_string(),
                first_name: "Ed".to_string(),
                last_name: "Itor".to_string(),
                password_hash: "$argon2id$secret".to_string(),
            },
            years_of_experience: 4,
            is_featured: false,
            date_joined: Utc::now(),
        };

        let value = serde_json::to_value(&redactor).unwrap();
        assert_eq!(value["username"], "editor");
        assert!(value.get("passwordHash").is_none());
        assert_eq!(redactor.display_name(), "editor (Ed Itor)");
    }
}
