//! Contact form: raw input, validated submission, and the validator tying them together.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::Rule;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 120;
pub const MESSAGE_MIN: usize = 10;
pub const MESSAGE_MAX: usize = 2000;

/// Fields of the contact form, in display order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    /// Form field name as submitted by the browser.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Your Name",
            Field::Email => "Your Email",
            Field::Message => "Your Message",
        }
    }
}

/// Raw contact form input. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactForm {
    pub fn value(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Message => self.message.as_deref(),
        }
    }
}

/// A contact form post that passed validation. Values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    name: String,
    email: String,
    message: String,
}

impl ContactSubmission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Per-field error messages, ordered by [`Field::ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} contact form field(s) failed validation", .0.len())]
pub struct FieldErrors(Vec<(Field, String)>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, msg)| msg.as_str())
    }

    pub fn is_valid(&self, field: Field) -> bool {
        self.get(field).is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, msg)| (*f, msg.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered rule lists per field.
///
/// Every field is checked; within a field, rules run in order and the first
/// failure is that field's error.
#[derive(Debug)]
pub struct ContactValidator {
    fields: Vec<(Field, Vec<Rule>)>,
}

impl ContactValidator {
    /// Validator with no rules at all.
    pub fn empty() -> Self {
        Self {
            fields: Field::ALL.iter().map(|f| (*f, Vec::new())).collect(),
        }
    }

    /// Append a rule to the end of `field`'s rule list.
    pub fn with_rule(mut self, field: Field, rule: Rule) -> Self {
        if let Some((_, rules)) = self.fields.iter_mut().find(|(f, _)| *f == field) {
            rules.push(rule);
        }
        self
    }

    pub fn rules(&self, field: Field) -> &[Rule] {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, rules)| rules.as_slice())
            .unwrap_or_default()
    }

    pub fn validate(&self, form: &ContactForm) -> Result<ContactSubmission, FieldErrors> {
        let mut errors = Vec::new();
        for (field, rules) in &self.fields {
            let value = form.value(*field);
            if let Some(message) = rules.iter().find_map(|rule| rule.check(value).err()) {
                errors.push((*field, message.to_string()));
            }
        }

        if !errors.is_empty() {
            return Err(FieldErrors(errors));
        }

        Ok(ContactSubmission {
            name: form.name.clone().unwrap_or_default(),
            email: form.email.clone().unwrap_or_default(),
            message: form.message.clone().unwrap_or_default(),
        })
    }
}

impl Default for ContactValidator {
    fn default() -> Self {
        Self::empty()
            .with_rule(Field::Name, Rule::required("Name is required!"))
            .with_rule(
                Field::Name,
                Rule::length(
                    NAME_MIN,
                    NAME_MAX,
                    format!("Name must be between {NAME_MIN} and {NAME_MAX} characters."),
                ),
            )
            .with_rule(Field::Email, Rule::required("Email is required!"))
            .with_rule(Field::Email, Rule::email("Invalid email address!"))
            .with_rule(
                Field::Email,
                Rule::length(0, EMAIL_MAX, format!("Email must be at most {EMAIL_MAX} characters.")),
            )
            .with_rule(Field::Message, Rule::required("Message is required!"))
            .with_rule(
                Field::Message,
                Rule::length(
                    MESSAGE_MIN,
                    MESSAGE_MAX,
                    format!("Message must be between {MESSAGE_MIN} and {MESSAGE_MAX} characters."),
                ),
            )
    }
}

/// Validate with the standard contact form rules.
pub fn validate(form: &ContactForm) -> Result<ContactSubmission, FieldErrors> {
    ContactValidator::default().validate(form)
}
