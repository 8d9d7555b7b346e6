use crate::record::{AccumulatedRecord, Patch};
use crate::schema;
use crate::types::StepId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    /// Absent, or text that is blank.
    Missing,
    /// A required flag that is not set to true.
    NotAccepted,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing => f.write_str("is required"),
            Problem::NotAccepted => f.write_str("must be accepted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub problem: Problem,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub step: Option<StepId>,
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{} {}", e.field, e.problem))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Check the required fields of `step`.
///
/// A field satisfies the check if the patch carries a usable value for it,
/// or, when the patch is silent, the record already does. A blank value in
/// the patch is not rescued by an earlier record value: the user cleared it.
pub fn validate_step(
    step: StepId,
    patch: &Patch,
    record: &AccumulatedRecord,
) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    for spec in schema::fields_for_step(step).filter(|f| f.required) {
        let value = patch.get(spec.key).or_else(|| record.get(spec.key));
        let problem = match value {
            None => Some(Problem::Missing),
            Some(v) if v.is_blank() => Some(Problem::Missing),
            Some(v) if v.as_bool() == Some(false) => Some(Problem::NotAccepted),
            Some(_) => None,
        };
        if let Some(problem) = problem {
            errors.push(FieldError {
                field: spec.key.to_string(),
                problem,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors {
            step: Some(step),
            errors,
        })
    }
}

/// True when every required field of `step` is already in `record`.
pub fn step_complete(step: StepId, record: &AccumulatedRecord) -> bool {
    validate_step(step, &Patch::new(), record).is_ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_fields_are_listed_in_schema_order() {
        let err = validate_step(StepId::Owner, &Patch::new(), &AccumulatedRecord::new())
            .unwrap_err();
        let fields: Vec<&str> = err.fields().collect();
        assert_eq!(fields, vec!["ownerName", "organizationName", "email"]);
        assert_eq!(err.step, Some(StepId::Owner));
    }

    #[test]
    fn blank_text_counts_as_missing() {
        let patch = Patch::new()
            .with("name", "  ")
            .with("certificationType", "building");
        let err = validate_step(StepId::Details, &patch, &AccumulatedRecord::new()).unwrap_err();
        assert_eq!(
            err.errors,
            vec![FieldError {
                field: "name".into(),
                problem: Problem::Missing
            }]
        );
    }

    #[test]
    fn record_values_satisfy_silent_patch() {
        let record = AccumulatedRecord::new()
            .with("name", "Acme HQ")
            .with("certificationType", "building");
        validate_step(StepId::Details, &Patch::new(), &record).unwrap();
        assert!(step_complete(StepId::Details, &record));
    }

    #[test]
    fn blank_patch_value_is_not_rescued_by_record() {
        let record = AccumulatedRecord::new()
            .with("name", "Acme HQ")
            .with("certificationType", "building");
        let patch = Patch::new().with("name", "");
        assert!(validate_step(StepId::Details, &patch, &record).is_err());
    }

    #[test]
    fn terms_must_be_accepted() {
        let patch = Patch::new().with("acceptTerms", false);
        let err = validate_step(StepId::Agreement, &patch, &AccumulatedRecord::new()).unwrap_err();
        assert_eq!(err.errors[0].problem, Problem::NotAccepted);
        assert_eq!(err.to_string(), "acceptTerms must be accepted");

        let patch = Patch::new().with("acceptTerms", true);
        validate_step(StepId::Agreement, &patch, &AccumulatedRecord::new()).unwrap();
    }

    #[test]
    fn optional_fields_are_not_checked() {
        let patch = Patch::new()
            .with("addressLine1", "1 Quay St")
            .with("city", "Oslo")
            .with("country", "Norway");
        validate_step(StepId::Address, &patch, &AccumulatedRecord::new()).unwrap();
    }
}
