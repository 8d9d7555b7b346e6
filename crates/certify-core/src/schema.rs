//! Static field schema shared by the wizard and the dashboard.
//!
//! Every field is stored flat in [`AccumulatedRecord`]; the schema records
//! which wizard step (if any) owns it, which dashboard tab shows it, how raw
//! input is parsed, and what it defaults to when a record is created empty.

use crate::config::UnknownFieldPolicy;
use crate::error::{CertifyError, Result};
use crate::record::{AccumulatedRecord, FieldValue, Patch};
use crate::types::{FieldKind, StepId, Tab};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Flag(bool),
    Text(&'static str),
}

impl FieldDefault {
    pub fn to_value(self) -> FieldValue {
        match self {
            FieldDefault::Flag(b) => FieldValue::Flag(b),
            FieldDefault::Text(s) => FieldValue::Text(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    /// `None` for dashboard-only fields.
    pub step: Option<StepId>,
    pub tab: Tab,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    /// True when `value` has the shape this field's kind stores.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self.kind, value),
            (FieldKind::Text, FieldValue::Text(_))
                | (FieldKind::Flag, FieldValue::Flag(_))
                | (FieldKind::Number, FieldValue::Number(_))
        )
    }
}

const fn field(
    key: &'static str,
    label: &'static str,
    step: Option<StepId>,
    tab: Tab,
    kind: FieldKind,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        key,
        label,
        step,
        tab,
        kind,
        required,
        default: None,
    }
}

const fn with_default(spec: FieldSpec, default: FieldDefault) -> FieldSpec {
    FieldSpec {
        default: Some(default),
        ..spec
    }
}

use FieldKind::{Flag, Number, Text};
use StepId::{Address, Agreement, Details, Owner};

pub static FIELDS: &[FieldSpec] = &[
    // Details
    field("name", "Project name", Some(Details), Tab::Overview, Text, true),
    field("certificationType", "Certification type", Some(Details), Tab::Overview, Text, true),
    field("description", "Description", Some(Details), Tab::Overview, Text, false),
    field("startDate", "Start date", Some(Details), Tab::Overview, Text, false),
    // Owner
    field("ownerName", "Owner name", Some(Owner), Tab::Organization, Text, true),
    field("organizationName", "Organization", Some(Owner), Tab::Organization, Text, true),
    field("email", "Contact email", Some(Owner), Tab::Organization, Text, true),
    field("phone", "Phone", Some(Owner), Tab::Organization, Text, false),
    // Address
    field("addressLine1", "Address line 1", Some(Address), Tab::Location, Text, true),
    field("addressLine2", "Address line 2", Some(Address), Tab::Location, Text, false),
    field("city", "City", Some(Address), Tab::Location, Text, true),
    field("region", "State / region", Some(Address), Tab::Location, Text, false),
    field("postalCode", "Postal code", Some(Address), Tab::Location, Text, false),
    field("country", "Country", Some(Address), Tab::Location, Text, true),
    // Agreement
    with_default(
        field("acceptTerms", "Accept terms", Some(Agreement), Tab::Disclosure, Flag, true),
        FieldDefault::Flag(false),
    ),
    with_default(
        field("confidentialData", "Confidential data", Some(Agreement), Tab::Disclosure, Text, false),
        FieldDefault::Text("No"),
    ),
    // Dashboard only
    field("buildingArea", "Gross floor area (m2)", None, Tab::Energy, Number, false),
    field("annualEnergyUse", "Annual energy use (kWh)", None, Tab::Energy, Number, false),
    field("renewableShare", "Renewable share (%)", None, Tab::Energy, Number, false),
    field("scope1Emissions", "Scope 1 (tCO2e)", None, Tab::Emissions, Number, false),
    field("scope2Emissions", "Scope 2 (tCO2e)", None, Tab::Emissions, Number, false),
    field("scope3Emissions", "Scope 3 (tCO2e)", None, Tab::Emissions, Number, false),
    field("targetYear", "Net-zero target year", None, Tab::Emissions, Number, false),
    with_default(
        field("thirdPartyVerified", "Third-party verified", None, Tab::Disclosure, Flag, false),
        FieldDefault::Flag(false),
    ),
    field("notes", "Notes", None, Tab::Disclosure, Text, false),
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

pub fn lookup(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.key == key)
}

pub fn fields_for_step(step: StepId) -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(move |f| f.step == Some(step))
}

pub fn fields_for_tab(tab: Tab) -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(move |f| f.tab == tab)
}

/// Parse raw input for a known field.
pub fn parse_value(key: &str, raw: &str) -> Result<FieldValue> {
    let spec = lookup(key).ok_or_else(|| CertifyError::UnknownField(key.to_string()))?;
    FieldValue::parse(key, spec.kind, raw)
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Fill every defaulted field that is missing. Existing values are kept.
/// Returns the number of fields filled.
pub fn fill_defaults(record: &mut AccumulatedRecord) -> usize {
    let mut filled = 0;
    for spec in FIELDS {
        if let Some(default) = spec.default {
            if !record.contains(spec.key) {
                record.set(spec.key, default.to_value());
                filled += 1;
            }
        }
    }
    filled
}

pub fn defaulted_record() -> AccumulatedRecord {
    let mut record = AccumulatedRecord::new();
    fill_defaults(&mut record);
    record
}

// ---------------------------------------------------------------------------
// Schema check
// ---------------------------------------------------------------------------

/// A known field must carry a value of its declared kind. Keys outside the
/// schema pass; the unknown-field policy deals with them.
pub fn check_value(key: &str, value: &FieldValue) -> Result<()> {
    match lookup(key) {
        Some(spec) if !spec.accepts(value) => Err(CertifyError::InvalidValue {
            field: key.to_string(),
            reason: format!("expected a {} value, got '{value}'", spec.kind),
        }),
        _ => Ok(()),
    }
}

/// Apply the unknown-field policy to a patch, then check every known field
/// against its declared kind.
///
/// `Reject` fails on the first key outside the schema; `Ignore` drops such
/// keys and returns the remainder.
pub fn check_patch(mut patch: Patch, policy: UnknownFieldPolicy) -> Result<Patch> {
    match policy {
        UnknownFieldPolicy::Reject => {
            if let Some(key) = patch.keys().find(|k| lookup(k).is_none()) {
                return Err(CertifyError::UnknownField(key.to_string()));
            }
        }
        UnknownFieldPolicy::Ignore => {
            patch.retain(|key, _| {
                let known = lookup(key).is_some();
                if !known {
                    tracing::warn!(field = %key, "dropping field outside the record schema");
                }
                known
            });
        }
    }
    for (key, value) in patch.iter() {
        check_value(key, value)?;
    }
    Ok(patch)
}

/// Every key in the patch must be owned by `step`. Keys unknown to the
/// schema are left to [`check_patch`].
pub fn check_ownership(patch: &Patch, step: StepId) -> Result<()> {
    for key in patch.keys() {
        if let Some(spec) = lookup(key) {
            if spec.step != Some(step) {
                let owner = spec.step.map(|s| s.as_str()).unwrap_or("dashboard");
                return Err(CertifyError::FieldNotOwned {
                    field: key.to_string(),
                    owner: owner.to_string(),
                    step: step.as_str().to_string(),
                });
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
