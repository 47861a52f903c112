use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::clock::Clock;
use crate::models::{FieldName, FieldValue};
use crate::rules::Rule;
use crate::utils::error_messages::*;

// Something, an @, something, a dot, something. Not anchored.
// U+FEFF counts as a space here, as everywhere else in this module.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\s\x{FEFF}]+@[^\s\x{FEFF}]+\.[^\s\x{FEFF}]+")
        .expect("Failed to compile email regex")
});

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 50;

/// Symbols accepted by the special symbol requirement
pub const SPECIAL_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

fn text_rule(message: &str, predicate: fn(&str) -> bool) -> Rule {
    Rule::value(message, move |value: &FieldValue| {
        value.as_text().is_some_and(predicate)
    })
}

fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Unicode whitespace plus U+FEFF (zero width no-break space), which
/// `char::is_whitespace` leaves out but browsers treat as a space
pub fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

pub fn is_blank(text: &str) -> bool {
    text.chars().all(is_space)
}

pub fn is_email_format(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

pub fn has_uppercase(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_uppercase())
}

pub fn has_special_symbol(text: &str) -> bool {
    text.chars().any(|c| SPECIAL_SYMBOLS.contains(c))
}

pub fn has_whitespace(text: &str) -> bool {
    text.chars().any(is_space)
}

pub fn username_rules() -> Vec<Rule> {
    vec![text_rule(USERNAME_MIN_LENGTH, |name| {
        char_count(name) >= MIN_USERNAME_LENGTH
    })]
}

/// The date of birth may be today but not later. `clock` is read at every
/// evaluation so a long-lived schema follows the calendar.
pub fn date_of_birth_rules(clock: Arc<dyn Clock>) -> Vec<Rule> {
    vec![Rule::value(INVALID_DATE_OF_BIRTH, move |value: &FieldValue| {
        value.as_date().is_some_and(|date| date <= clock.today())
    })]
}

pub fn email_rules() -> Vec<Rule> {
    vec![
        text_rule(EMAIL_REQUIRED, |email| !is_blank(email)),
        text_rule(EMAIL_FORMAT, is_email_format),
    ]
}

/// Password requirements, in the order they are reported
pub fn password_rules() -> Vec<Rule> {
    vec![
        text_rule(PASSWORD_REQUIRED, |password| !is_blank(password)),
        text_rule(PASSWORD_MIN_LENGTH, |password| {
            char_count(password) >= MIN_PASSWORD_LENGTH
        }),
        text_rule(PASSWORD_MAX_LENGTH, |password| {
            char_count(password) <= MAX_PASSWORD_LENGTH
        }),
        text_rule(PASSWORD_DIGIT, has_digit),
        text_rule(PASSWORD_UPPERCASE, has_uppercase),
        text_rule(PASSWORD_SPECIAL_SYMBOL, has_special_symbol),
        text_rule(PASSWORD_NO_SPACES, |password| !has_whitespace(password)),
    ]
}

/// Own rule only: the confirmation may not be empty. The equality check
/// against the password is a cross-field rule, see [`password_match_rule`].
pub fn confirm_password_rules() -> Vec<Rule> {
    vec![text_rule(PASSWORD_REQUIRED, |confirmation| {
        !confirmation.is_empty()
    })]
}

/// Fails unless the field holds exactly the same text as `password_field`
pub fn password_match_rule(password_field: FieldName) -> Rule {
    let depends_on = vec![password_field.clone()];
    Rule::record(PASSWORD_MISMATCH, depends_on, move |value, record| {
        record.get(&password_field) == Some(value)
    })
}

/// Only a boolean `true` accepts the policy
pub fn policy_rules() -> Vec<Rule> {
    vec![Rule::value(POLICY_REQUIRED, |value: &FieldValue| {
        value.as_flag() == Some(true)
    })]
}
