//! Marketing-site contact form with a simulated network round trip.

use crate::config::ContactConfig;
use crate::error::{CertifyError, Result};
use crate::validation::{FieldError, Problem, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub message: String,
}

impl ContactRequest {
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let errors: Vec<FieldError> = [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| FieldError {
            field: field.to_string(),
            problem: Problem::Missing,
        })
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { step: None, errors })
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactReceipt {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ContactForm
// ---------------------------------------------------------------------------

pub struct ContactForm {
    delay: Duration,
    in_flight: AtomicBool,
    submitted: AtomicBool,
}

/// Clears the in-flight flag even if the submitting future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ContactForm {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicBool::new(false),
            submitted: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &ContactConfig) -> Self {
        Self::new(Duration::from_millis(config.delay_ms))
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted.load(Ordering::Acquire)
    }

    /// Allow another submission after a successful one.
    pub fn reset(&self) {
        self.submitted.store(false, Ordering::Release);
    }

    /// Wait out the simulated delay, then flip the submitted flag.
    ///
    /// Only one submission may be pending at a time; a second call while the
    /// first is waiting fails with [`CertifyError::SubmissionInFlight`].
    pub async fn submit(&self, request: &ContactRequest) -> Result<ContactReceipt> {
        request.validate().map_err(CertifyError::Validation)?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("contact submission rejected: another is in flight");
            return Err(CertifyError::SubmissionInFlight);
        }
        let _guard = InFlight(&self.in_flight);

        if self.is_submitted() {
            return Err(CertifyError::AlreadySubmitted);
        }

        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "submitting contact form");
        tokio::time::sleep(self.delay).await;

        self.submitted.store(true, Ordering::Release);
        let receipt = ContactReceipt {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
        };
        tracing::info!(receipt = %receipt.id, "contact form submitted");
        Ok(receipt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ContactRequest {
        ContactRequest {
            name: "Ada".to_string(),
            email: "ada@acme.test".to_string(),
            company: Some("Acme".to_string()),
            message: "We want to certify our HQ.".to_string(),
        }
    }

    fn form() -> ContactForm {
        ContactForm::new(Duration::from_millis(20))
    }

    #[test]
    fn blank_fields_fail_validation() {
        let req = ContactRequest {
            name: " ".to_string(),
            ..ContactRequest::default()
        };
        let err = req.validate().unwrap_err();
        let fields: Vec<&str> = err.fields().collect();
        assert_eq!(fields, vec!["name", "email", "message"]);
        assert!(err.step.is_none());
    }

    #[tokio::test]
    async fn submit_flips_submitted_flag() {
        let form = form();
        assert!(!form.is_submitted());
        form.submit(&request()).await.unwrap();
        assert!(form.is_submitted());
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn invalid_request_never_starts() {
        let form = form();
        let err = form.submit(&ContactRequest::default()).await.unwrap_err();
        assert!(matches!(err, CertifyError::Validation(_)));
        assert!(!form.is_submitting());
        assert!(!form.is_submitted());
    }

    #[tokio::test]
    async fn double_submit_is_rejected_while_pending() {
        let form = form();
        let req = request();
        let (first, second) = tokio::join!(form.submit(&req), form.submit(&req));
        assert!(first.is_ok());
        assert!(matches!(second, Err(CertifyError::SubmissionInFlight)));
        assert!(form.is_submitted());
    }

    #[tokio::test]
    async fn resubmit_requires_reset() {
        let form = form();
        form.submit(&request()).await.unwrap();
        assert!(matches!(
            form.submit(&request()).await,
            Err(CertifyError::AlreadySubmitted)
        ));
        assert!(!form.is_submitting());

        form.reset();
        form.submit(&request()).await.unwrap();
    }

    #[tokio::test]
    async fn dropped_submission_releases_guard() {
        let form = ContactForm::new(Duration::from_secs(60));
        let req = request();
        let pending = tokio::time::timeout(Duration::from_millis(10), form.submit(&req)).await;
        assert!(pending.is_err());
        assert!(!form.is_submitting());
        assert!(!form.is_submitted());
    }
}
