use crate::config::UnknownFieldPolicy;
use crate::error::{CertifyError, Result};
use crate::paths;
use crate::record::{AccumulatedRecord, Patch};
use crate::schema;
use crate::types::StepId;
use crate::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// StepDescriptor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StepDescriptor {
    /// 1-based, matches the cursor.
    pub index: usize,
    pub id: StepId,
    pub name: &'static str,
    pub description: &'static str,
}

pub fn steps() -> Vec<StepDescriptor> {
    StepId::all()
        .iter()
        .map(|&id| StepDescriptor {
            index: id.position(),
            id,
            name: id.display_name(),
            description: id.description(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStatus {
    Active,
    HandedOff,
    Cancelled,
}

impl fmt::Display for WizardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WizardStatus::Active => "active",
            WizardStatus::HandedOff => "handed_off",
            WizardStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The record carried from the wizard to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handoff {
    pub wizard_id: Uuid,
    pub record: AccumulatedRecord,
    pub handed_off_at: DateTime<Utc>,
}

impl Handoff {
    pub fn load(root: &Path) -> Result<Option<Self>> {
        match crate::io::read_if_exists(&paths::handoff_path(root))? {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(&paths::handoff_path(root), data.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Moved { from: usize, to: usize },
    HandedOff(Handoff),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    pub discarded_fields: usize,
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

/// Project-creation wizard controller.
///
/// Owns the cursor and the accumulated record. Steps hand it patches;
/// it never validates across fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wizard {
    pub id: Uuid,
    cursor: usize,
    record: AccumulatedRecord,
    status: WizardStatus,
    #[serde(default)]
    unknown_fields: UnknownFieldPolicy,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wizard {
    pub fn new(unknown_fields: UnknownFieldPolicy) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            cursor: 1,
            record: AccumulatedRecord::new(),
            status: WizardStatus::Active,
            unknown_fields,
            started_at: now,
            updated_at: now,
        }
    }

    /// Start from a record handed over by an earlier screen. The seed is
    /// held to the same schema checks as a patch. The cursor resumes at the
    /// first step whose required fields are not all present.
    pub fn seeded(record: AccumulatedRecord, unknown_fields: UnknownFieldPolicy) -> Result<Self> {
        let record = schema::check_patch(record, unknown_fields)?;
        let cursor = StepId::all()
            .iter()
            .find(|step| !validation::step_complete(**step, &record))
            .map(|step| step.position())
            .unwrap_or(StepId::all().len());
        tracing::debug!(cursor, fields = record.len(), "wizard seeded");
        Ok(Self {
            cursor,
            record,
            ..Self::new(unknown_fields)
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn step_count(&self) -> usize {
        StepId::all().len()
    }

    pub fn current_step(&self) -> StepId {
        // cursor stays within 1..=step_count; `load` rejects anything else
        StepId::all()[self.cursor - 1]
    }

    pub fn record(&self) -> &AccumulatedRecord {
        &self.record
    }

    pub fn status(&self) -> WizardStatus {
        self.status
    }

    fn ensure_active(&self) -> Result<()> {
        match self.status {
            WizardStatus::Active => Ok(()),
            other => Err(CertifyError::WizardClosed(other.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn prepare(&self, patch: Patch) -> Result<Patch> {
        self.ensure_active()?;
        let patch = schema::check_patch(patch, self.unknown_fields)?;
        schema::check_ownership(&patch, self.current_step())?;
        Ok(patch)
    }

    /// Merge `patch` and move forward one step, or hand off the record when
    /// the current step is the last one. The patch is assumed validated.
    pub fn advance(&mut self, patch: Patch) -> Result<Transition> {
        let patch = self.prepare(patch)?;
        Ok(self.apply(patch))
    }

    /// Validate the current step's required fields, then advance. A failed
    /// validation leaves cursor and record untouched.
    pub fn submit(&mut self, patch: Patch) -> Result<Transition> {
        let patch = self.prepare(patch)?;
        validation::validate_step(self.current_step(), &patch, &self.record)
            .map_err(CertifyError::Validation)?;
        Ok(self.apply(patch))
    }

    fn apply(&mut self, patch: Patch) -> Transition {
        self.record.merge(patch);
        self.updated_at = Utc::now();

        if self.cursor < self.step_count() {
            let from = self.cursor;
            self.cursor += 1;
            tracing::debug!(from, to = self.cursor, "wizard advanced");
            Transition::Moved {
                from,
                to: self.cursor,
            }
        } else {
            self.status = WizardStatus::HandedOff;
            tracing::info!(wizard = %self.id, fields = self.record.len(), "wizard handed off");
            Transition::HandedOff(Handoff {
                wizard_id: self.id,
                record: self.record.clone(),
                handed_off_at: self.updated_at,
            })
        }
    }

    /// Step back one, keeping every merged field. No-op on the first step.
    pub fn retreat(&mut self) -> Result<usize> {
        self.ensure_active()?;
        if self.cursor > 1 {
            self.cursor -= 1;
            self.updated_at = Utc::now();
        }
        Ok(self.cursor)
    }

    /// Discard the in-progress record. Irreversible.
    pub fn cancel(&mut self) -> Result<Exit> {
        self.ensure_active()?;
        let discarded_fields = self.record.len();
        self.record = AccumulatedRecord::new();
        self.status = WizardStatus::Cancelled;
        self.updated_at = Utc::now();
        tracing::info!(wizard = %self.id, discarded_fields, "wizard cancelled");
        Ok(Exit { discarded_fields })
    }

    // -----------------------------------------------------------------------
    // Session persistence
    // -----------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        match crate::io::read_if_exists(&paths::wizard_path(root))? {
            Some(data) => {
                let wizard: Self = serde_yaml::from_str(&data)?;
                if StepId::at(wizard.cursor).is_none() {
                    return Err(CertifyError::InvalidStep(format!(
                        "session cursor {} is outside 1..={}",
                        wizard.cursor,
                        wizard.step_count()
                    )));
                }
                Ok(wizard)
            }
            None => Err(CertifyError::NoWizard),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::wizard_path(root), data.as_bytes())
    }

    /// Remove the session file. Returns true if one existed.
    pub fn discard(root: &Path) -> Result<bool> {
        crate::io::remove_if_exists(&paths::wizard_path(root))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn wizard() -> Wizard {
        Wizard::new(UnknownFieldPolicy::Reject)
    }

    fn details() -> Patch {
        Patch::new()
            .with("name", "Acme HQ")
            .with("certificationType", "building")
    }

    fn owner() -> Patch {
        Patch::new()
            .with("ownerName", "Ada Lovelace")
            .with("organizationName", "Acme")
            .with("email", "ada@acme.test")
    }

    fn address() -> Patch {
        Patch::new()
            .with("addressLine1", "1 Quay St")
            .with("city", "Oslo")
            .with("country", "Norway")
    }

    fn agreement() -> Patch {
        Patch::new()
            .with("acceptTerms", true)
            .with("confidentialData", "No")
    }

    #[test]
    fn descriptors_are_ordered() {
        let names: Vec<&str> = steps().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Project Details", "Owner Info", "Address", "Agreement"]);
        assert!(steps().iter().enumerate().all(|(i, s)| s.index == i + 1));
    }

    #[test]
    fn advance_then_retreat_keeps_fields() {
        let mut w = wizard();
        assert_eq!(w.cursor(), 1);
        let t = w.advance(Patch::new().with("name", "Acme")).unwrap();
        assert_eq!(t, Transition::Moved { from: 1, to: 2 });
        assert_eq!(w.record().get_str("name"), Some("Acme"));

        assert_eq!(w.retreat().unwrap(), 1);
        assert_eq!(w.record().get_str("name"), Some("Acme"));
    }

    #[test]
    fn cursor_moves_by_one_and_stays_in_bounds() {
        let mut w = wizard();
        let mut last = w.cursor();
        for patch in [details(), owner(), address()] {
            w.advance(patch).unwrap();
            assert_eq!(w.cursor(), last + 1);
            last = w.cursor();
        }
        assert_eq!(w.cursor(), w.step_count());

        for expected in (1..w.step_count()).rev() {
            assert_eq!(w.retreat().unwrap(), expected);
        }
        assert_eq!(w.retreat().unwrap(), 1);
        assert_eq!(w.retreat().unwrap(), 1);
    }

    #[test]
    fn last_advance_hands_off_full_record() {
        let mut w = wizard();
        w.advance(details()).unwrap();
        w.advance(owner()).unwrap();
        w.advance(address()).unwrap();
        let t = w.advance(agreement()).unwrap();

        let Transition::HandedOff(handoff) = t else {
            panic!("expected handoff");
        };
        assert_eq!(handoff.wizard_id, w.id);
        assert_eq!(handoff.record.get_str("city"), Some("Oslo"));
        assert_eq!(handoff.record.len(), 10);
        assert_eq!(w.status(), WizardStatus::HandedOff);
        assert_eq!(w.cursor(), 4);
    }

    #[test]
    fn closed_wizard_rejects_everything() {
        let mut w = wizard();
        w.cancel().unwrap();
        assert!(matches!(w.advance(details()), Err(CertifyError::WizardClosed(_))));
        assert!(matches!(w.retreat(), Err(CertifyError::WizardClosed(_))));
        assert!(matches!(w.cancel(), Err(CertifyError::WizardClosed(_))));
    }

    #[test]
    fn cancel_discards_record() {
        let mut w = wizard();
        w.advance(details()).unwrap();
        let exit = w.cancel().unwrap();
        assert_eq!(exit.discarded_fields, 2);
        assert!(w.record().is_empty());
        assert_eq!(w.status(), WizardStatus::Cancelled);
    }

    #[test]
    fn later_step_cannot_clobber_earlier_field() {
        let mut w = wizard();
        w.advance(details()).unwrap();
        let err = w.advance(owner().with("name", "Other")).unwrap_err();
        assert!(matches!(err, CertifyError::FieldNotOwned { .. }));
        assert_eq!(w.record().get_str("name"), Some("Acme HQ"));
        assert_eq!(w.cursor(), 2);
    }

    #[test]
    fn resubmitting_a_step_overwrites_its_own_fields() {
        let mut w = wizard();
        w.advance(details()).unwrap();
        w.retreat().unwrap();
        w.advance(Patch::new().with("name", "Acme Tower")).unwrap();
        assert_eq!(w.record().get_str("name"), Some("Acme Tower"));
        assert_eq!(w.record().get_str("certificationType"), Some("building"));
    }

    #[test]
    fn unknown_fields_follow_policy() {
        let mut strict = wizard();
        let err = strict.advance(details().with("colour", "green")).unwrap_err();
        assert!(matches!(err, CertifyError::UnknownField(_)));
        assert_eq!(strict.cursor(), 1);

        let mut lenient = Wizard::new(UnknownFieldPolicy::Ignore);
        lenient.advance(details().with("colour", "green")).unwrap();
        assert!(!lenient.record().contains("colour"));
        assert_eq!(lenient.cursor(), 2);
    }

    #[test]
    fn submit_validates_before_advancing() {
        let mut w = wizard();
        let err = w.submit(Patch::new().with("name", "Acme")).unwrap_err();
        let CertifyError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["certificationType"]);
        assert_eq!(w.cursor(), 1);
        assert!(w.record().is_empty());

        w.submit(details()).unwrap();
        assert_eq!(w.cursor(), 2);
    }

    #[test]
    fn seeded_wizard_resumes_at_first_incomplete_step() {
        let mut record = AccumulatedRecord::new();
        record.merge(details());
        record.merge(owner());
        let w = Wizard::seeded(record, UnknownFieldPolicy::Reject).unwrap();
        assert_eq!(w.cursor(), 3);
        assert_eq!(w.current_step(), StepId::Address);

        let mut full = AccumulatedRecord::new();
        for p in [details(), owner(), address(), agreement()] {
            full.merge(p);
        }
        assert_eq!(Wizard::seeded(full, UnknownFieldPolicy::Reject).unwrap().cursor(), 4);
        assert_eq!(
            Wizard::seeded(AccumulatedRecord::new(), UnknownFieldPolicy::Reject)
                .unwrap()
                .cursor(),
            1
        );
    }

    #[test]
    fn seed_record_follows_unknown_field_policy() {
        let seed = details().with("colour", "green");
        let err = Wizard::seeded(seed.clone(), UnknownFieldPolicy::Reject).unwrap_err();
        assert!(matches!(err, CertifyError::UnknownField(k) if k == "colour"));

        let w = Wizard::seeded(seed, UnknownFieldPolicy::Ignore).unwrap();
        assert!(!w.record().contains("colour"));
        assert_eq!(w.cursor(), 2);

        let mistyped = details().with("acceptTerms", "yes");
        assert!(matches!(
            Wizard::seeded(mistyped, UnknownFieldPolicy::Reject),
            Err(CertifyError::InvalidValue { .. })
        ));
    }

    #[test]
    fn text_in_flag_field_is_rejected() {
        let mut w = wizard();
        w.submit(details()).unwrap();
        w.submit(owner()).unwrap();
        w.submit(address()).unwrap();

        let err = w.submit(Patch::new().with("acceptTerms", "false")).unwrap_err();
        assert!(matches!(err, CertifyError::InvalidValue { ref field, .. } if field == "acceptTerms"));
        assert_eq!(w.status(), WizardStatus::Active);
        assert_eq!(w.cursor(), 4);
        assert!(!w.record().contains("acceptTerms"));
    }

    #[test]
    fn session_roundtrip() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(Wizard::load(dir.path()), Err(CertifyError::NoWizard)));

        let mut w = wizard();
        w.advance(details()).unwrap();
        w.save(dir.path()).unwrap();

        let loaded = Wizard::load(dir.path()).unwrap();
        assert_eq!(loaded.id, w.id);
        assert_eq!(loaded.cursor(), 2);
        assert_eq!(loaded.record(), w.record());

        assert!(Wizard::discard(dir.path()).unwrap());
        assert!(!Wizard::discard(dir.path()).unwrap());
    }

    #[test]
    fn load_rejects_cursor_out_of_range() {
        let dir = TempDir::new().unwrap();
        let w = wizard();
        w.save(dir.path()).unwrap();
        let path = paths::wizard_path(dir.path());
        let data = std::fs::read_to_string(&path).unwrap();
        assert!(data.contains("cursor: 1"));

        for bad in ["cursor: 0", "cursor: 99"] {
            std::fs::write(&path, data.replace("cursor: 1", bad)).unwrap();
            assert!(matches!(Wizard::load(dir.path()), Err(CertifyError::InvalidStep(_))));
        }

        std::fs::write(&path, data.replace("cursor: 1", "cursor: 4")).unwrap();
        assert_eq!(Wizard::load(dir.path()).unwrap().current_step(), StepId::Agreement);
    }

    #[test]
    fn handoff_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        assert!(Handoff::load(dir.path()).unwrap().is_none());
        let handoff = Handoff {
            wizard_id: Uuid::new_v4(),
            record: details(),
            handed_off_at: Utc::now(),
        };
        handoff.save(dir.path()).unwrap();
        assert_eq!(Handoff::load(dir.path()).unwrap(), Some(handoff));
    }
}
