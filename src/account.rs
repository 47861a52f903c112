//! The account creation form

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::clock::Clock;
use crate::form::{FormError, FormState, LogSink};
use crate::models::{FieldName, FieldValue, Record};
use crate::rules::{FieldSchema, Rule};
use crate::schema::FormSchema;
use crate::utils::input_validation::{
    confirm_password_rules, date_of_birth_rules, email_rules, password_match_rule,
    password_rules, policy_rules, username_rules,
};

pub const USERNAME: &str = "username";
pub const DATE_OF_BIRTH: &str = "dob";
pub const EMAIL: &str = "email";
pub const PASSWORD: &str = "password";
pub const CONFIRM_PASSWORD: &str = "confirmPassword";
pub const POLICY: &str = "policy";

fn with_rules(schema: FieldSchema, rules: Vec<Rule>) -> FieldSchema {
    rules.into_iter().fold(schema, FieldSchema::with_rule)
}

/// Schema of the account creation form. New forms start with empty text
/// fields, today as date of birth and the policy unchecked.
pub fn schema(clock: Arc<dyn Clock>) -> FormSchema {
    let today = clock.today();

    FormSchema::new()
        .field(USERNAME, with_rules(FieldSchema::text(), username_rules()))
        .field(
            DATE_OF_BIRTH,
            with_rules(FieldSchema::date(), date_of_birth_rules(clock)),
        )
        .field(EMAIL, with_rules(FieldSchema::text(), email_rules()))
        .field(PASSWORD, with_rules(FieldSchema::text(), password_rules()))
        .field(
            CONFIRM_PASSWORD,
            with_rules(FieldSchema::text(), confirm_password_rules()),
        )
        .field(POLICY, with_rules(FieldSchema::flag(), policy_rules()))
        .cross_field(CONFIRM_PASSWORD, password_match_rule(PASSWORD.into()))
        .with_default(USERNAME, "")
        .with_default(DATE_OF_BIRTH, today)
        .with_default(EMAIL, "")
        .with_default(PASSWORD, "")
        .with_default(CONFIRM_PASSWORD, "")
        .with_default(POLICY, false)
}

pub fn new_form(clock: Arc<dyn Clock>) -> FormState {
    FormState::new(schema(clock))
}

/// Sink logging submissions without the passwords
pub fn log_sink() -> LogSink {
    LogSink::masking([FieldName::from(PASSWORD), FieldName::from(CONFIRM_PASSWORD)])
}

/// Typed view of a submitted account creation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupData {
    pub username: String,
    pub dob: NaiveDate,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub policy: bool,
}

fn extract<'r, T>(
    record: &'r Record,
    field: &str,
    expected: &'static str,
    read: impl FnOnce(&'r FieldValue) -> Option<T>,
) -> Result<T, FormError> {
    record.get_str(field).and_then(read).ok_or(FormError::WrongValue {
        field: field.into(),
        expected,
    })
}

impl TryFrom<&Record> for SignupData {
    type Error = FormError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let text = |field: &str| {
            extract(record, field, "string", |value| {
                value.as_text().map(str::to_owned)
            })
        };

        Ok(Self {
            username: text(USERNAME)?,
            dob: extract(record, DATE_OF_BIRTH, "date", FieldValue::as_date)?,
            email: text(EMAIL)?,
            password: text(PASSWORD)?,
            confirm_password: text(CONFIRM_PASSWORD)?,
            policy: extract(record, POLICY, "boolean", FieldValue::as_flag)?,
        })
    }
}
