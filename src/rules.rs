//! Per-field rule engine.
//!
//! A field owns an ordered list of rules. Evaluation stops at the first rule
//! whose predicate fails and reports that rule's message.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::models::{FieldKind, FieldName, FieldValue, Record};
use crate::utils::error_messages::{type_mismatch, REQUIRED};

type ValuePredicate = Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>;
type RecordPredicate = Arc<dyn Fn(&FieldValue, &Record) -> bool + Send + Sync>;

/// A failed rule, scoped to exactly one field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    pub field: FieldName,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Result of running a field's rules
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    Valid,
    Invalid(ValidationFailure),
}

impl Outcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// The error message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Valid => None,
            Outcome::Invalid(failure) => Some(&failure.message),
        }
    }

    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            Outcome::Valid => None,
            Outcome::Invalid(failure) => Some(failure),
        }
    }
}

/// A predicate paired with the message reported when it fails.
///
/// `Value` rules only look at the field's own value. `Record` rules also read
/// other fields of the record, which are listed in `depends_on`.
#[derive(Clone)]
pub enum Rule {
    Value {
        message: String,
        predicate: ValuePredicate,
    },
    Record {
        message: String,
        depends_on: Vec<FieldName>,
        predicate: RecordPredicate,
    },
}

impl Rule {
    pub fn value<P>(message: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&FieldValue) -> bool + Send + Sync + 'static,
    {
        Rule::Value {
            message: message.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn record<P>(message: impl Into<String>, depends_on: Vec<FieldName>, predicate: P) -> Self
    where
        P: Fn(&FieldValue, &Record) -> bool + Send + Sync + 'static,
    {
        Rule::Record {
            message: message.into(),
            depends_on,
            predicate: Arc::new(predicate),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Rule::Value { message, .. } | Rule::Record { message, .. } => message,
        }
    }

    /// Other fields this rule reads
    pub fn depends_on(&self) -> &[FieldName] {
        match self {
            Rule::Value { .. } => &[],
            Rule::Record { depends_on, .. } => depends_on,
        }
    }

    pub fn check(&self, value: &FieldValue, record: &Record) -> bool {
        match self {
            Rule::Value { predicate, .. } => predicate(value),
            Rule::Record { predicate, .. } => predicate(value, record),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Value { message, .. } => f.debug_struct("Value").field("message", message).finish(),
            Rule::Record {
                message,
                depends_on,
                ..
            } => f
                .debug_struct("Record")
                .field("message", message)
                .field("depends_on", depends_on)
                .finish(),
        }
    }
}

/// Expected primitive and ordered rules for one field
#[derive(Debug, Clone)]
pub struct FieldSchema {
    kind: FieldKind,
    rules: Vec<Rule>,
}

impl FieldSchema {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            rules: Vec::new(),
        }
    }

    pub fn text() -> Self {
        Self::new(FieldKind::Text)
    }

    pub fn flag() -> Self {
        Self::new(FieldKind::Flag)
    }

    pub fn date() -> Self {
        Self::new(FieldKind::Date)
    }

    /// Appends a rule, evaluated after every rule already present
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Every field read by one of this field's record rules
    pub fn dependencies(&self) -> impl Iterator<Item = &FieldName> {
        self.rules.iter().flat_map(Rule::depends_on)
    }

    /// Runs the rules against `value`, returning the first failure.
    ///
    /// A missing value or a value of the wrong primitive fails before any rule
    /// is consulted.
    pub fn evaluate(&self, field: &FieldName, value: Option<&FieldValue>, record: &Record) -> Outcome {
        let value = match value {
            None => return Outcome::Invalid(ValidationFailure::new(field.clone(), REQUIRED)),
            Some(value) if value.kind() != self.kind => {
                return Outcome::Invalid(ValidationFailure::new(
                    field.clone(),
                    type_mismatch(self.kind, value.kind()),
                ))
            }
            Some(value) => value,
        };

        self.rules
            .iter()
            .find(|rule| !rule.check(value, record))
            .map_or(Outcome::Valid, |rule| {
                Outcome::Invalid(ValidationFailure::new(field.clone(), rule.message()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_empty(value: &FieldValue) -> bool {
        value.as_text().is_some_and(|text| !text.is_empty())
    }

    fn short(value: &FieldValue) -> bool {
        value.as_text().is_some_and(|text| text.len() < 4)
    }

    #[test]
    fn test_first_failure_wins() {
        let schema = FieldSchema::text()
            .with_rule(Rule::value("empty", not_empty))
            .with_rule(Rule::value("too long", short));
        let field = FieldName::from("name");
        let record = Record::new();

        let cases = vec![
            ("", Some("empty")),
            ("abcdef", Some("too long")),
            ("abc", None),
        ];

        for (input, expected) in cases {
            let value = FieldValue::from(input);
            let outcome = schema.evaluate(&field, Some(&value), &record);
            assert_eq!(outcome.message(), expected, "Unexpected outcome for {:?}", input);
        }
    }

    #[test]
    fn test_failure_is_scoped_to_field() {
        let schema = FieldSchema::text().with_rule(Rule::value("empty", not_empty));
        let field = FieldName::from("name");
        let value = FieldValue::from("");

        let outcome = schema.evaluate(&field, Some(&value), &Record::new());
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.field, field);
        assert_eq!(failure.to_string(), "empty");
    }

    #[test]
    fn test_missing_and_mistyped_values() {
        let schema = FieldSchema::flag();
        let field = FieldName::from("policy");
        let record = Record::new();

        let missing = schema.evaluate(&field, None, &record);
        assert_eq!(missing.message(), Some("Required"));

        let text = FieldValue::from("yes");
        let mistyped = schema.evaluate(&field, Some(&text), &record);
        assert_eq!(mistyped.message(), Some("Expected boolean, received string"));
    }

    #[test]
    fn test_record_rule_reads_other_fields() {
        let schema = FieldSchema::text().with_rule(Rule::record(
            "different",
            vec![FieldName::from("other")],
            |value, record| record.get_str("other") == Some(value),
        ));
        let field = FieldName::from("copy");

        let record = Record::new().with("other", "same");
        let same = FieldValue::from("same");
        let different = FieldValue::from("nope");

        assert!(schema.evaluate(&field, Some(&same), &record).is_valid());
        assert_eq!(
            schema.evaluate(&field, Some(&different), &record).message(),
            Some("different")
        );
        assert_eq!(schema.dependencies().collect::<Vec<_>>(), vec![&FieldName::from("other")]);
    }

    #[test]
    fn test_no_rules_is_valid() {
        let schema = FieldSchema::text();
        let value = FieldValue::from("");
        assert!(schema
            .evaluate(&FieldName::from("free"), Some(&value), &Record::new())
            .is_valid());
    }
}
