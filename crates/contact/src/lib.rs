//! Contact form validation.
//!
//! Turns raw, untrusted form fields into a [`ContactSubmission`] or a set of
//! per-field error messages. Validation is purely syntactic: nothing here
//! checks that an address can actually receive mail.

pub mod form;
pub mod rules;

pub use form::{validate, ContactForm, ContactSubmission, ContactValidator, Field, FieldErrors};
pub use rules::Rule;
