//! Tabbed project dashboard over one shared record.
//!
//! Defaults are filled when the record is read from storage or created
//! empty. A handoff record is shown exactly as the wizard produced it, so a
//! fresh handoff may lack `confidentialData` and `thirdPartyVerified` until
//! its first save and remount fills them.

use crate::config::{Config, UnknownFieldPolicy, WritePolicy};
use crate::error::{CertifyError, Result};
use crate::record::{AccumulatedRecord, FieldValue};
use crate::schema::{self, FieldSpec};
use crate::storage::KeyValueStore;
use crate::types::Tab;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Key the dashboard record is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "projectData";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub key: String,
    pub write_policy: WritePolicy,
    pub unknown_fields: UnknownFieldPolicy,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            write_policy: WritePolicy::default(),
            unknown_fields: UnknownFieldPolicy::default(),
        }
    }
}

impl From<&Config> for DashboardOptions {
    fn from(config: &Config) -> Self {
        Self {
            key: config.storage.dashboard_key.clone(),
            write_policy: config.storage.write_policy,
            unknown_fields: config.records.unknown_fields,
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Where the record came from at mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Storage,
    Handoff,
    Empty,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveConfirmation {
    pub key: String,
    pub bytes: usize,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TabProgress {
    pub tab: Tab,
    pub filled: usize,
    pub total: usize,
}

impl TabProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.filled * 100) / self.total) as u8
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Tabbed editor over one shared record, mirrored to a [`KeyValueStore`].
pub struct Dashboard<S: KeyValueStore> {
    store: S,
    options: DashboardOptions,
    record: AccumulatedRecord,
    source: RecordSource,
    active_tab: Tab,
    dirty: bool,
}

impl<S: KeyValueStore> Dashboard<S> {
    /// Rehydrate from storage, else from the handoff, else start empty with
    /// defaulted optional fields. Never writes.
    pub fn load_on_mount(
        store: S,
        handoff: Option<&AccumulatedRecord>,
        options: DashboardOptions,
    ) -> Result<Self> {
        let (record, source) = match store.load(&options.key)? {
            Some(data) => {
                let mut record = AccumulatedRecord::from_json(&data)?;
                let filled = schema::fill_defaults(&mut record);
                if filled > 0 {
                    tracing::debug!(filled, "defaulted fields missing from stored record");
                }
                (record, RecordSource::Storage)
            }
            None => match handoff {
                Some(record) => (record.clone(), RecordSource::Handoff),
                None => (schema::defaulted_record(), RecordSource::Empty),
            },
        };
        tracing::debug!(key = %options.key, source = ?source, fields = record.len(), "dashboard mounted");

        Ok(Self {
            store,
            options,
            record,
            source,
            active_tab: Tab::Overview,
            dirty: false,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn record(&self) -> &AccumulatedRecord {
        &self.record
    }

    pub fn source(&self) -> RecordSource {
        self.source
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Update one field. Under [`WritePolicy::Immediate`] the whole record is
    /// written straight away; otherwise it waits for the next flush.
    pub fn set_field(&mut self, key: &str, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        if schema::lookup(key).is_none() {
            match self.options.unknown_fields {
                UnknownFieldPolicy::Reject => {
                    return Err(CertifyError::UnknownField(key.to_string()));
                }
                UnknownFieldPolicy::Ignore => {
                    tracing::warn!(field = %key, "ignoring edit to field outside the record schema");
                    return Ok(());
                }
            }
        }

        schema::check_value(key, &value)?;
        self.record.set(key, value);
        self.dirty = true;
        if self.options.write_policy == WritePolicy::Immediate {
            self.persist()?;
        }
        Ok(())
    }

    /// Parse raw input by the field's schema kind, then [`Self::set_field`].
    pub fn set_field_raw(&mut self, key: &str, raw: &str) -> Result<()> {
        match schema::parse_value(key, raw) {
            Ok(value) => self.set_field(key, value),
            Err(CertifyError::UnknownField(_))
                if self.options.unknown_fields == UnknownFieldPolicy::Ignore =>
            {
                self.set_field(key, raw)
            }
            Err(e) => Err(e),
        }
    }

    /// Switch tabs. Pending writes are flushed first.
    pub fn select_tab(&mut self, tab: Tab) -> Result<()> {
        self.flush()?;
        self.active_tab = tab;
        Ok(())
    }

    /// Write the full record and confirm. Repeated saves of an unchanged
    /// record store identical bytes.
    pub fn save_explicit(&mut self) -> Result<SaveConfirmation> {
        let bytes = self.persist()?;
        tracing::info!(key = %self.options.key, bytes, "project data saved");
        Ok(SaveConfirmation {
            key: self.options.key.clone(),
            bytes,
            saved_at: Utc::now(),
        })
    }

    /// Write the record if it has unsaved changes. Returns true if written.
    pub fn flush(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Flush pending changes and give the store back.
    pub fn close(mut self) -> Result<S> {
        self.flush()?;
        Ok(self.store)
    }

    fn persist(&mut self) -> Result<usize> {
        let payload = self.record.to_json()?;
        self.store.save(&self.options.key, &payload)?;
        self.dirty = false;
        Ok(payload.len())
    }

    // -----------------------------------------------------------------------
    // Tab views
    // -----------------------------------------------------------------------

    pub fn tab_fields(&self, tab: Tab) -> Vec<(&'static FieldSpec, Option<&FieldValue>)> {
        schema::fields_for_tab(tab)
            .map(|spec| (spec, self.record.get(spec.key)))
            .collect()
    }

    pub fn tab_progress(&self, tab: Tab) -> TabProgress {
        let mut filled = 0;
        let mut total = 0;
        for spec in schema::fields_for_tab(tab) {
            total += 1;
            if self.record.is_filled(spec.key) {
                filled += 1;
            }
        }
        TabProgress { tab, filled, total }
    }

    pub fn progress(&self) -> Vec<TabProgress> {
        Tab::all().iter().map(|&t| self.tab_progress(t)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
