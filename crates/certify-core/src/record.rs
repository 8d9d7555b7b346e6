use crate::error::{CertifyError, Result};
use crate::types::FieldKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// A leaf value in the record. Only JSON-representable scalars are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Parse raw user input according to the field's kind.
    pub fn parse(field: &str, kind: FieldKind, raw: &str) -> Result<Self> {
        match kind {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Flag => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(FieldValue::Flag(true)),
                "false" | "no" | "0" => Ok(FieldValue::Flag(false)),
                _ => Err(CertifyError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("expected true/false, got '{raw}'"),
                }),
            },
            FieldKind::Number => {
                let trimmed = raw.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Ok(FieldValue::Number(i.into()));
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(FieldValue::Number)
                    .ok_or_else(|| CertifyError::InvalidValue {
                        field: field.to_string(),
                        reason: format!("expected a number, got '{raw}'"),
                    })
            }
        }
    }

    /// Text that is blank counts as absent. Flags and numbers are never blank.
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Flag(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n.into())
    }
}

// ---------------------------------------------------------------------------
// AccumulatedRecord
// ---------------------------------------------------------------------------

/// Flat map of every field collected across wizard steps and dashboard tabs.
///
/// Keys are kept sorted so the serialized form is byte-stable: saving the
/// same record twice yields identical payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccumulatedRecord {
    fields: BTreeMap<String, FieldValue>,
}

/// A partial record emitted by a step or tab.
pub type Patch = AccumulatedRecord;

impl AccumulatedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form used when assembling patches.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    /// Set one field, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Present and not blank.
    pub fn is_filled(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_blank())
    }

    /// Right-biased shallow union: keys in `patch` win, others are kept.
    pub fn merge(&mut self, patch: Patch) {
        self.fields.extend(patch.fields);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &FieldValue) -> bool) {
        self.fields.retain(|k, v| keep(k, v));
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for AccumulatedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_right_biased() {
        let mut record = AccumulatedRecord::new()
            .with("name", "Acme")
            .with("city", "Oslo");
        record.merge(Patch::new().with("city", "Bergen").with("country", "NO"));
        record.merge(Patch::new().with("country", "Norway"));

        assert_eq!(record.get_str("name"), Some("Acme"));
        assert_eq!(record.get_str("city"), Some("Bergen"));
        assert_eq!(record.get_str("country"), Some("Norway"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn merge_empty_patch_is_noop() {
        let mut record = AccumulatedRecord::new().with("name", "Acme");
        let before = record.clone();
        record.merge(Patch::new());
        assert_eq!(record, before);
    }

    #[test]
    fn json_is_flat_and_sorted() {
        let record = AccumulatedRecord::new()
            .with("name", "Acme")
            .with("acceptTerms", true)
            .with("buildingArea", 1200i64);
        assert_eq!(
            record.to_json().unwrap(),
            r#"{"acceptTerms":true,"buildingArea":1200,"name":"Acme"}"#
        );
    }

    #[test]
    fn json_leaf_types_survive_reload() {
        let data = r#"{"a":"text","b":false,"c":12.5}"#;
        let record = AccumulatedRecord::from_json(data).unwrap();
        assert_eq!(record.get("a"), Some(&FieldValue::Text("text".into())));
        assert_eq!(record.get("b"), Some(&FieldValue::Flag(false)));
        assert!(matches!(record.get("c"), Some(FieldValue::Number(_))));
        assert_eq!(record.to_json().unwrap(), data);
    }

    #[test]
    fn nested_payload_is_rejected() {
        assert!(AccumulatedRecord::from_json(r#"{"a":{"b":1}}"#).is_err());
        assert!(AccumulatedRecord::from_json(r#"["a"]"#).is_err());
    }

    #[test]
    fn blank_text_is_not_filled() {
        let record = AccumulatedRecord::new()
            .with("name", "   ")
            .with("acceptTerms", false);
        assert!(!record.is_filled("name"));
        assert!(record.is_filled("acceptTerms"));
        assert!(!record.is_filled("missing"));
    }

    #[test]
    fn parse_by_kind() {
        assert_eq!(
            FieldValue::parse("f", FieldKind::Flag, "Yes").unwrap(),
            FieldValue::Flag(true)
        );
        assert_eq!(
            FieldValue::parse("n", FieldKind::Number, "42").unwrap(),
            FieldValue::from(42i64)
        );
        assert_eq!(
            FieldValue::parse("n", FieldKind::Number, "0.35").unwrap().to_string(),
            "0.35"
        );
        assert_eq!(
            FieldValue::parse("t", FieldKind::Text, "02139").unwrap(),
            FieldValue::Text("02139".into())
        );
        assert!(FieldValue::parse("f", FieldKind::Flag, "maybe").is_err());
        assert!(FieldValue::parse("n", FieldKind::Number, "lots").is_err());
    }
}
