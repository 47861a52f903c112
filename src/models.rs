//! Modèle de données du formulaire

use std::collections::BTreeMap;

use chrono::NaiveDate;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nom d'un champ du formulaire, par exemple `password` ou `confirmPassword`.
#[derive(
    Debug, Serialize, Deserialize, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Display, From,
)]
#[serde(transparent)]
pub struct FieldName(String);

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Le type primitif attendu par un champ
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display)]
pub enum FieldKind {
    #[display("string")]
    Text,
    #[display("boolean")]
    Flag,
    #[display("date")]
    Date,
}

/// Une valeur primitive saisie pour un champ.
///
/// Sérialisée avec son type (`{"kind": "text", "value": "..."}`), pour
/// qu'un texte ressemblant à une date reste un texte.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq, Hash, From)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Flag(_) => FieldKind::Flag,
            FieldValue::Date(_) => FieldKind::Date,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// La valeur JSON nue, sans son type (les dates en ISO 8601)
    pub fn to_plain_json(&self) -> Value {
        match self {
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Flag(flag) => Value::Bool(*flag),
            FieldValue::Date(date) => Value::String(date.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_owned())
    }
}

/// Les valeurs courantes d'un formulaire, par nom de champ.
///
/// Un champ absent n'a pas été saisi du tout, ce qui n'est pas la même
/// chose qu'une chaîne vide.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Eq, PartialEq)]
#[serde(transparent)]
pub struct Record(BTreeMap<FieldName, FieldValue>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &FieldName) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Cherche un champ par son nom textuel
    pub fn get_str(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(&FieldName::from(field))
    }

    pub fn set(&mut self, field: FieldName, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(field, value)
    }

    pub fn remove(&mut self, field: &FieldName) -> Option<FieldValue> {
        self.0.remove(field)
    }

    pub fn with(mut self, field: impl Into<FieldName>, value: impl Into<FieldValue>) -> Self {
        self.set(field.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Objet JSON `{"champ": valeur}` sans les types, pour l'affichage et les logs
    pub fn to_plain_json(&self) -> Value {
        let fields: Map<String, Value> = self
            .0
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_plain_json()))
            .collect();
        Value::Object(fields)
    }
}

impl FromIterator<(FieldName, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (FieldName, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        let cases = vec![
            (FieldValue::from("abc"), FieldKind::Text),
            (FieldValue::from(true), FieldKind::Flag),
            (
                FieldValue::from(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()),
                FieldKind::Date,
            ),
        ];

        for (value, kind) in cases {
            assert_eq!(value.kind(), kind, "Wrong kind for {:?}", value);
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FieldKind::Text.to_string(), "string");
        assert_eq!(FieldKind::Flag.to_string(), "boolean");
        assert_eq!(FieldKind::Date.to_string(), "date");
    }

    #[test]
    fn test_record_builder() {
        let record = Record::new().with("username", "abc").with("policy", true);

        assert_eq!(record.len(), 2);
        assert!(!record.is_empty());
        assert!(Record::new().is_empty());
        assert_eq!(record.get_str("username").and_then(FieldValue::as_text), Some("abc"));
        assert_eq!(record.get_str("policy").and_then(FieldValue::as_flag), Some(true));
        assert!(record.get_str("email").is_none());
    }

    #[test]
    fn test_record_json_shape() {
        let record = Record::new()
            .with("dob", NaiveDate::from_ymd_opt(1990, 5, 17).unwrap())
            .with("policy", false)
            .with("username", "abc");

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"dob":{"kind":"date","value":"1990-05-17"},"policy":{"kind":"flag","value":false},"username":{"kind":"text","value":"abc"}}"#
        );

        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_date_shaped_text_survives_json() {
        let cases = vec!["2000-01-01", "true", "false", "1990-05-17T00:00:00"];

        for text in cases {
            let record = Record::new().with("username", text);
            let json = serde_json::to_string(&record).unwrap();
            let back: Record = serde_json::from_str(&json).unwrap();

            assert_eq!(back, record, "Text {:?} changed kind through JSON", text);
            assert_eq!(back.get_str("username").map(FieldValue::kind), Some(FieldKind::Text));
        }
    }

    #[test]
    fn test_plain_json() {
        let record = Record::new()
            .with("dob", NaiveDate::from_ymd_opt(1990, 5, 17).unwrap())
            .with("policy", true)
            .with("username", "2000-01-01");

        assert_eq!(
            record.to_plain_json().to_string(),
            r#"{"dob":"1990-05-17","policy":true,"username":"2000-01-01"}"#
        );
    }
}
