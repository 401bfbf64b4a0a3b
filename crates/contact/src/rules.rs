//! Composable field rules (predicate + message).

use std::fmt;

use email_address::{EmailAddress, Options};

type Check = dyn Fn(Option<&str>) -> bool + Send + Sync;

/// A single validation rule for one field.
///
/// The predicate receives the raw value (`None` when the field was not
/// submitted) and returns `true` when the value is acceptable.
pub struct Rule {
    check: Box<Check>,
    message: String,
}

impl Rule {
    pub fn new(
        message: impl Into<String>,
        check: impl Fn(Option<&str>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            check: Box::new(check),
            message: message.into(),
        }
    }

    /// Value must be present and contain at least one non-whitespace character.
    pub fn required(message: impl Into<String>) -> Self {
        Self::new(message, |value| value.is_some_and(|v| !v.trim().is_empty()))
    }

    /// Value must be a bare `local@domain.tld` address. Display names
    /// (`Jo <jo@example.com>`), domain literals and single-label domains are
    /// rejected. Absent values pass.
    pub fn email(message: impl Into<String>) -> Self {
        Self::new(message, |value| {
            value.is_none_or(|v| EmailAddress::parse_with_options(v, strict_address()).is_ok())
        })
    }

    /// Value length in characters must lie in `min..=max`. Absent values pass.
    pub fn length(min: usize, max: usize, message: impl Into<String>) -> Self {
        Self::new(message, move |value| {
            value.is_none_or(|v| (min..=max).contains(&v.chars().count()))
        })
    }

    /// Returns the rule's message when `value` fails it.
    pub fn check(&self, value: Option<&str>) -> Result<(), &str> {
        if (self.check)(value) {
            Ok(())
        } else {
            Err(&self.message)
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn strict_address() -> Options {
    Options::default()
        .without_display_text()
        .without_domain_literal()
        .with_required_tld()
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("message", &self.message).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        let rule = Rule::required("required");
        assert_eq!(rule.check(None), Err("required"));
        assert_eq!(rule.check(Some("")), Err("required"));
        assert_eq!(rule.check(Some(" \t\n")), Err("required"));
        assert_eq!(rule.check(Some(" x ")), Ok(()));
    }

    #[test]
    fn email_checks_syntax_only() {
        let rule = Rule::email("bad email");
        assert!(rule.check(Some("jo@example.com")).is_ok());
        assert!(rule.check(Some("first.last+tag@sub.example.org")).is_ok());
        assert!(rule.check(Some("not-an-email")).is_err());
        assert!(rule.check(Some("a@")).is_err());
        assert!(rule.check(Some("@example.com")).is_err());
        assert!(rule.check(None).is_ok());
    }

    #[test]
    fn email_rejects_display_names_literals_and_bare_hosts() {
        let rule = Rule::email("bad email");
        assert_eq!(rule.check(Some("Jo <jo@example.com>")), Err("bad email"));
        assert_eq!(rule.check(Some("jo@localhost")), Err("bad email"));
        assert_eq!(rule.check(Some("jo@[127.0.0.1]")), Err("bad email"));
    }

    #[test]
    fn length_bounds_are_inclusive_and_char_based() {
        let rule = Rule::length(2, 4, "len");
        assert!(rule.check(Some("a")).is_err());
        assert!(rule.check(Some("ab")).is_ok());
        assert!(rule.check(Some("abcd")).is_ok());
        assert!(rule.check(Some("abcde")).is_err());
        // Four characters, eight bytes.
        assert!(rule.check(Some("ğğğğ")).is_ok());
    }

    #[test]
    fn custom_rules_compose() {
        let rule = Rule::new("no shouting", |v| v.is_none_or(|v| v != v.to_uppercase()));
        assert!(rule.check(Some("Hello")).is_ok());
        assert_eq!(rule.check(Some("HELLO")), Err("no shouting"));
        assert_eq!(rule.message(), "no shouting");
    }
}
