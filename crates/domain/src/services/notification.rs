//! Visitor notifications for review decisions.
//!
//! Approving or rejecting a registration marks it as "notification due".
//! A background job collects those registrations and hands them to a
//! [`VisitorNotifier`] through [`dispatch_decisions`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::RegistrationStatus;

/// A reviewer decision to tell the visitor about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDecisionPayload {
    pub registration_id: i64,
    pub exhibition_id: i64,
    pub exhibition_title: String,
    pub visitor_name: String,
    pub visitor_email: String,
    pub status: RegistrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl RegistrationDecisionPayload {
    pub fn subject(&self) -> String {
        match self.status {
            RegistrationStatus::Approved => {
                format!("Your registration for {} is confirmed", self.exhibition_title)
            }
            _ => format!(
                "Your registration for {} was not accepted",
                self.exhibition_title
            ),
        }
    }
}

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    Sent,
    /// Sending failed; the registration stays due and is retried next run.
    Failed(String),
}

/// Delivers decision notifications to visitors.
#[async_trait::async_trait]
pub trait VisitorNotifier: Send + Sync {
    async fn notify_decision(&self, payload: &RegistrationDecisionPayload) -> NotificationResult;
}

/// Notifier that only logs the message it would send.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
}

impl LoggingNotifier {
    pub fn new() -> Self {
        Self {
            simulate_failure: false,
        }
    }

    /// Create a notifier that fails every send.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
        }
    }
}

#[async_trait::async_trait]
impl VisitorNotifier for LoggingNotifier {
    async fn notify_decision(&self, payload: &RegistrationDecisionPayload) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(
                registration_id = payload.registration_id,
                visitor_email = %payload.visitor_email,
                "Notifier simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            registration_id = payload.registration_id,
            exhibition_id = payload.exhibition_id,
            visitor_email = %payload.visitor_email,
            status = %payload.status,
            subject = %payload.subject(),
            "Would notify visitor of registration decision"
        );

        NotificationResult::Sent
    }
}

/// Outcome of one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Registrations whose visitor was notified.
    pub sent: Vec<i64>,
    /// Registrations whose notice could not be delivered.
    pub failed: Vec<i64>,
}

/// Sends every payload and reports which registrations were notified.
pub async fn dispatch_decisions<N>(
    notifier: &N,
    payloads: &[RegistrationDecisionPayload],
) -> DispatchSummary
where
    N: VisitorNotifier + ?Sized,
{
    let mut summary = DispatchSummary::default();
    for payload in payloads {
        match notifier.notify_decision(payload).await {
            NotificationResult::Sent => summary.sent.push(payload.registration_id),
            NotificationResult::Failed(reason) => {
                tracing::warn!(
                    registration_id = payload.registration_id,
                    reason = %reason,
                    "Decision notification failed"
                );
                summary.failed.push(payload.registration_id);
            }
        }
    }
    summary
}
