//! One form session: current values, which fields were visited, and the
//! single entry point for input events.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};
use thiserror::Error;

use crate::models::{FieldName, FieldValue, Record};
use crate::rules::{Outcome, ValidationFailure};
use crate::schema::{FormSchema, ValidationResult};

/// Whether a field has been visited yet. The only transition is
/// `Untouched -> Touched`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Touch {
    #[default]
    Untouched,
    Touched,
}

impl Touch {
    /// Returns true if this call performed the transition
    pub fn touch(&mut self) -> bool {
        let first = *self == Touch::Untouched;
        *self = Touch::Touched;
        first
    }

    pub fn is_touched(self) -> bool {
        self == Touch::Touched
    }
}

/// Lifecycle of a session. Once `Submitted`, every event is refused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Editing,
    Submitted,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("The form has already been submitted")]
    AlreadySubmitted,

    #[error("Unknown field: {0}")]
    UnknownField(FieldName),

    #[error("The form has {} invalid field(s)", .0.len())]
    NotSubmittable(Vec<ValidationFailure>),

    #[error("Field {field} should hold a {expected} value")]
    WrongValue {
        field: FieldName,
        expected: &'static str,
    },

    #[error("Submission failed: {0}")]
    Sink(anyhow::Error),
}

/// Receives the record once the whole form is valid
pub trait SubmissionSink {
    fn submit(&mut self, record: &Record) -> anyhow::Result<()>;
}

const MASK: &str = "********";

/// Logs the submitted record as JSON. Values of the `masked` fields are
/// replaced before logging.
#[derive(Debug, Default)]
pub struct LogSink {
    masked: BTreeSet<FieldName>,
}

impl LogSink {
    pub fn masking<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = FieldName>,
    {
        Self {
            masked: fields.into_iter().collect(),
        }
    }

    fn masked_copy(&self, record: &Record) -> Record {
        record
            .iter()
            .map(|(name, value)| {
                if self.masked.contains(name) {
                    (name.clone(), FieldValue::from(MASK))
                } else {
                    (name.clone(), value.clone())
                }
            })
            .collect()
    }
}

impl SubmissionSink for LogSink {
    fn submit(&mut self, record: &Record) -> anyhow::Result<()> {
        let masked = self.masked_copy(record);
        info!("Form submitted: {}", masked.to_plain_json());
        Ok(())
    }
}

/// Current state of one form session.
///
/// Every declared field is always validated against the current record, so
/// [`FormState::is_submittable`] is accurate from the start. Errors are only
/// shown for fields that have been touched.
pub struct FormState {
    schema: FormSchema,
    record: Record,
    result: ValidationResult,
    touched: BTreeMap<FieldName, Touch>,
    phase: Phase,
}

impl FormState {
    pub fn new(schema: FormSchema) -> Self {
        let record = schema.defaults().clone();
        let result = schema.validate(&record);
        let touched = schema
            .fields()
            .map(|name| (name.clone(), Touch::default()))
            .collect();

        Self {
            schema,
            record,
            result,
            touched,
            phase: Phase::default(),
        }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn value(&self, field: &FieldName) -> Option<&FieldValue> {
        self.record.get(field)
    }

    pub fn outcome(&self, field: &FieldName) -> Option<&Outcome> {
        self.result.get(field)
    }

    pub fn touch_state(&self, field: &FieldName) -> Option<Touch> {
        self.touched.get(field).copied()
    }

    fn ensure_editing(&self) -> Result<(), FormError> {
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::Submitted => {
                warn!("Event received after submission");
                Err(FormError::AlreadySubmitted)
            }
        }
    }

    fn ensure_declared(&self, field: &FieldName) -> Result<(), FormError> {
        self.ensure_editing()?;
        if self.schema.contains(field) {
            Ok(())
        } else {
            warn!("Event for unknown field {field}");
            Err(FormError::UnknownField(field.clone()))
        }
    }

    /// Stores a new value and re-validates the field and every field
    /// reading it.
    pub fn on_field_change(
        &mut self,
        field: impl Into<FieldName>,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        let field = field.into();
        self.ensure_declared(&field)?;

        self.record.set(field.clone(), value.into());
        let affected = self.schema.affected_by(&field);
        debug!("Field {field} changed, revalidating {} field(s)", affected.len());
        self.schema.revalidate(&self.record, affected, &mut self.result);
        Ok(())
    }

    /// Marks the field as visited, which makes its error visible
    pub fn on_field_blur(&mut self, field: impl Into<FieldName>) -> Result<(), FormError> {
        let field = field.into();
        self.ensure_declared(&field)?;

        if self.touched.entry(field.clone()).or_default().touch() {
            info!("Field {field} touched");
        }
        self.schema
            .revalidate(&self.record, Some(field), &mut self.result);
        Ok(())
    }

    /// The error to display next to a field, if any
    pub fn visible_error(&self, field: &FieldName) -> Option<&str> {
        if self.touch_state(field)?.is_touched() {
            self.result.message(field)
        } else {
            None
        }
    }

    /// Every currently displayed error, in declaration order
    pub fn visible_errors(&self) -> Vec<(&FieldName, &str)> {
        self.schema
            .fields()
            .filter_map(|field| Some((field, self.visible_error(field)?)))
            .collect()
    }

    pub fn is_submittable(&self) -> bool {
        self.result.is_submittable()
    }

    /// Touches every field, re-validates the whole record, and hands it to
    /// `sink` if every field is valid. A successful submission ends the
    /// session. A refused or failed one leaves it editable.
    pub fn on_submit<S: SubmissionSink>(&mut self, sink: &mut S) -> Result<Record, FormError> {
        self.ensure_editing()?;
        for touch in self.touched.values_mut() {
            touch.touch();
        }
        self.result = self.schema.validate(&self.record);

        if !self.is_submittable() {
            let failures: Vec<ValidationFailure> = self.result.failures().cloned().collect();
            warn!("Submission refused, {} invalid field(s)", failures.len());
            return Err(FormError::NotSubmittable(failures));
        }

        sink.submit(&self.record).map_err(FormError::Sink)?;
        self.phase = Phase::Submitted;
        info!("Form session closed after submission");
        Ok(self.record.clone())
    }
}
