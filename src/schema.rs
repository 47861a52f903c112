//! Whole-form validation.
//!
//! A [`FormSchema`] declares the fields of a form, their rules, the
//! cross-field rules attached to some of them, and the default record a new
//! form starts from.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::models::{FieldName, FieldValue, Record};
use crate::rules::{FieldSchema, Outcome, Rule, ValidationFailure};

/// A rule over the whole record whose failure is shown on `target`
#[derive(Debug, Clone)]
pub struct CrossFieldRule {
    pub target: FieldName,
    pub rule: Rule,
}

impl CrossFieldRule {
    pub fn depends_on(&self) -> &[FieldName] {
        self.rule.depends_on()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: Vec<(FieldName, FieldSchema)>,
    cross_rules: Vec<CrossFieldRule>,
    defaults: Record,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field. Declaring the same name twice replaces its rules.
    pub fn field(mut self, name: impl Into<FieldName>, schema: FieldSchema) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(declared, _)| *declared == name) {
            Some((_, existing)) => *existing = schema,
            None => self.fields.push((name, schema)),
        }
        self
    }

    /// Attaches a record rule to `target`. It runs after the target's own
    /// rules, and only when they all pass. A rule attached to an undeclared
    /// field is never evaluated.
    pub fn cross_field(mut self, target: impl Into<FieldName>, rule: Rule) -> Self {
        self.cross_rules.push(CrossFieldRule {
            target: target.into(),
            rule,
        });
        self
    }

    pub fn with_default(mut self, name: impl Into<FieldName>, value: impl Into<FieldValue>) -> Self {
        self.defaults.set(name.into(), value.into());
        self
    }

    /// The record a fresh form starts from
    pub fn defaults(&self) -> &Record {
        &self.defaults
    }

    /// Declared field names, in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.iter().map(|(name, _)| name)
    }

    pub fn contains(&self, field: &FieldName) -> bool {
        self.get(field).is_some()
    }

    pub fn get(&self, field: &FieldName) -> Option<&FieldSchema> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, schema)| schema)
    }

    fn cross_rules_for<'a>(&'a self, field: &'a FieldName) -> impl Iterator<Item = &'a Rule> {
        self.cross_rules
            .iter()
            .filter(move |cross| cross.target == *field)
            .map(|cross| &cross.rule)
    }

    /// Runs every rule of one declared field against the record
    pub fn validate_field(&self, field: &FieldName, record: &Record) -> Option<Outcome> {
        let schema = self.get(field)?;
        let value = record.get(field);

        let outcome = match schema.evaluate(field, value, record) {
            Outcome::Valid => match value {
                Some(value) => self
                    .cross_rules_for(field)
                    .find(|rule| !rule.check(value, record))
                    .map_or(Outcome::Valid, |rule| {
                        Outcome::Invalid(ValidationFailure::new(field.clone(), rule.message()))
                    }),
                None => Outcome::Valid,
            },
            invalid => invalid,
        };

        debug!("Field {field} validated: {:?}", outcome.message());
        Some(outcome)
    }

    /// Validates every declared field
    pub fn validate(&self, record: &Record) -> ValidationResult {
        let mut result = ValidationResult::default();
        self.revalidate(record, self.fields().cloned(), &mut result);
        result
    }

    /// Re-runs the given fields and stores their outcomes in `result`.
    /// Undeclared names are skipped.
    pub fn revalidate<I>(&self, record: &Record, fields: I, result: &mut ValidationResult)
    where
        I: IntoIterator<Item = FieldName>,
    {
        for field in fields {
            if let Some(outcome) = self.validate_field(&field, record) {
                result.0.insert(field, outcome);
            }
        }
    }

    /// Declared fields whose outcome may change when `field` changes: the field
    /// itself and every field with a rule reading it.
    pub fn affected_by(&self, field: &FieldName) -> Vec<FieldName> {
        let mut affected = BTreeSet::new();

        if self.contains(field) {
            affected.insert(field.clone());
        }

        for (name, schema) in &self.fields {
            if schema.dependencies().any(|dependency| dependency == field) {
                affected.insert(name.clone());
            }
        }

        for cross in &self.cross_rules {
            if cross.depends_on().contains(field) && self.contains(&cross.target) {
                affected.insert(cross.target.clone());
            }
        }

        // keep declaration order
        self.fields()
            .filter(|name| affected.contains(*name))
            .cloned()
            .collect()
    }
}

/// Outcome of every declared field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult(BTreeMap<FieldName, Outcome>);

impl ValidationResult {
    pub fn get(&self, field: &FieldName) -> Option<&Outcome> {
        self.0.get(field)
    }

    pub fn message(&self, field: &FieldName) -> Option<&str> {
        self.get(field).and_then(Outcome::message)
    }

    pub fn is_submittable(&self) -> bool {
        self.0.values().all(Outcome::is_valid)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.0.values().filter_map(Outcome::failure)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn validate(schema: &FormSchema, record: &Record) -> ValidationResult {
    schema.validate(record)
}

pub fn is_submittable(result: &ValidationResult) -> bool {
    result.is_submittable()
}
