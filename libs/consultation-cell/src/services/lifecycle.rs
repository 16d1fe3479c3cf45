use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::ConsultationError;
use crate::models::{ConsultationRequest, ConsultationStatus};

pub struct ConsultationLifecycle;

impl ConsultationLifecycle {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_status_transition(
        &self,
        current: ConsultationStatus,
        next: ConsultationStatus,
    ) -> Result<(), ConsultationError> {
        debug!("Validating status transition from {} to {}", current, next);

        if !self.valid_transitions(current).contains(&next) {
            warn!("Invalid status transition attempted: {} -> {}", current, next);
            return Err(ConsultationError::InvalidTransition { from: current, to: next });
        }

        Ok(())
    }

    pub fn valid_transitions(&self, current: ConsultationStatus) -> &'static [ConsultationStatus] {
        match current {
            ConsultationStatus::New => &[ConsultationStatus::Accepted],
            ConsultationStatus::Accepted => &[
                ConsultationStatus::InProgress,
                ConsultationStatus::Finished,
            ],
            ConsultationStatus::InProgress => &[ConsultationStatus::Finished],
            ConsultationStatus::Finished => &[],
        }
    }

    /// Timestamp for the next transition of `record`: `now`, clamped so it never
    /// precedes a stamp the record already carries.
    pub fn transition_stamp(&self, record: &ConsultationRequest, now: DateTime<Utc>) -> DateTime<Utc> {
        [
            Some(record.created_at),
            record.accepted_at,
            record.started_at,
            record.finished_at,
        ]
        .into_iter()
        .flatten()
        .fold(now, |latest, stamp| latest.max(stamp))
    }
}

impl Default for ConsultationLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;

    use crate::models::Priority;

    fn record(created_at: DateTime<Utc>) -> ConsultationRequest {
        ConsultationRequest {
            id: "s1".to_string(),
            patient_id: "p1".to_string(),
            patient_name: "Maria".to_string(),
            patient_email: None,
            patient_region: None,
            patient_age: None,
            description: "febre".to_string(),
            priority: Priority::Medium,
            status: ConsultationStatus::New,
            doctor_id: None,
            doctor_name: None,
            created_at,
            accepted_at: None,
            started_at: None,
            finished_at: None,
            finished_by: None,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn allowed_transitions() {
        let lifecycle = ConsultationLifecycle::new();

        assert!(lifecycle.validate_status_transition(ConsultationStatus::New, ConsultationStatus::Accepted).is_ok());
        assert!(lifecycle.validate_status_transition(ConsultationStatus::Accepted, ConsultationStatus::InProgress).is_ok());
        assert!(lifecycle.validate_status_transition(ConsultationStatus::Accepted, ConsultationStatus::Finished).is_ok());
        assert!(lifecycle.validate_status_transition(ConsultationStatus::InProgress, ConsultationStatus::Finished).is_ok());
    }

    #[test]
    fn rejected_transitions() {
        let lifecycle = ConsultationLifecycle::new();

        assert_matches!(
            lifecycle.validate_status_transition(ConsultationStatus::New, ConsultationStatus::Finished),
            Err(ConsultationError::InvalidTransition { from: ConsultationStatus::New, to: ConsultationStatus::Finished })
        );
        assert!(lifecycle.validate_status_transition(ConsultationStatus::New, ConsultationStatus::InProgress).is_err());
        assert!(lifecycle.validate_status_transition(ConsultationStatus::Accepted, ConsultationStatus::Accepted).is_err());
        assert!(lifecycle.valid_transitions(ConsultationStatus::Finished).is_empty());
    }

    #[test]
    fn stamps_never_go_backwards() {
        let lifecycle = ConsultationLifecycle::new();
        let now = Utc::now();

        let mut consultation = record(now + Duration::seconds(30));
        assert_eq!(lifecycle.transition_stamp(&consultation, now), now + Duration::seconds(30));

        consultation.accepted_at = Some(now + Duration::seconds(60));
        assert_eq!(lifecycle.transition_stamp(&consultation, now), now + Duration::seconds(60));

        let later = now + Duration::seconds(90);
        assert_eq!(lifecycle.transition_stamp(&consultation, later), later);
    }
}
