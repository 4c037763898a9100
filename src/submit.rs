//! Public form submissions: store the record, then notify the owner in the
//! background.

use tokio::task::JoinHandle;

use crate::email::{EmailError, EmailSender, SentEmail};
use crate::models::{Booking, BookingStatus, ReviewStatus, Stored, Testimonial};
use crate::store::{DataStore, Served, StoreError};

/// Handle to a notification running in the background.
///
/// Dropping the handle does not cancel the send.
#[derive(Debug)]
pub struct NotificationHandle {
    task: JoinHandle<Result<SentEmail, EmailError>>,
}

impl NotificationHandle {
    /// Waits for the notification to finish.
    pub async fn wait(self) -> Result<SentEmail, EmailError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(EmailError::TaskFailed(e.to_string())),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// A stored submission and its pending notification.
#[derive(Debug)]
pub struct Submission<T> {
    pub record: Served<Stored<T>>,
    pub notification: NotificationHandle,
}

/// Accepts bookings and reviews from the public site.
#[derive(Debug, Clone)]
pub struct SubmissionService {
    store: DataStore,
    email: EmailSender,
}

fn log_outcome(kind: &str, result: &Result<SentEmail, EmailError>) {
    match result {
        Ok(_) => {}
        Err(EmailError::NotConfigured) => {
            tracing::debug!("{} notification skipped: email not configured", kind)
        }
        Err(e) => tracing::error!("{} notification failed: {}", kind, e),
    }
}

impl SubmissionService {
    pub fn new(store: DataStore, email: EmailSender) -> Self {
        Self { store, email }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Stores a booking as pending and starts the owner notification.
    ///
    /// Returns once the booking is stored; the notification outcome never
    /// affects the result.
    pub async fn submit_booking(&self, booking: Booking) -> Result<Submission<Booking>, StoreError> {
        let booking = Booking {
            status: BookingStatus::Pending,
            ..booking
        };
        let record = self.store.insert(&booking).await?;
        tracing::info!("Booking {} submitted ({})", record.value.id, record.backend);

        let email = self.email.clone();
        let task = tokio::spawn(async move {
            let result = email.send_booking_notification(&booking).await;
            log_outcome("Booking", &result);
            result
        });

        Ok(Submission {
            record,
            notification: NotificationHandle { task },
        })
    }

    /// Stores a review as pending approval and starts the owner notification.
    pub async fn submit_testimonial(
        &self,
        review: Testimonial,
    ) -> Result<Submission<Testimonial>, StoreError> {
        let review = review.with_status(ReviewStatus::Pending);
        let record = self.store.insert(&review).await?;
        tracing::info!("Review {} submitted ({})", record.value.id, record.backend);

        let email = self.email.clone();
        let task = tokio::spawn(async move {
            let result = email.send_review_notification(&review).await;
            log_outcome("Review", &result);
            result
        });

        Ok(Submission {
            record,
            notification: NotificationHandle { task },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::EmailConfig;
    use crate::local::MemoryStore;
    use crate::test_support::{closed_url, spawn_fake};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn service(email: EmailConfig) -> SubmissionService {
        let store = DataStore::new(Arc::new(MemoryStore::new()));
        SubmissionService::new(store, EmailSender::new(email))
    }

    fn booking() -> Booking {
        Booking::new("Ann", "ann@example.com", "555", "1 Oak Rd", "Mulching")
    }

    #[tokio::test]
    async fn test_booking_forced_pending_and_notified() {
        let server = spawn_fake(|_| (StatusCode::OK, json!({"id": "msg-1"}))).await;
        let service = service(EmailConfig {
            api_key: Some("key".to_string()),
            endpoint: server.base_url.clone(),
            ..EmailConfig::default()
        });

        let mut input = booking();
        input.status = BookingStatus::Completed;
        let submission = service.submit_booking(input).await.unwrap();

        assert_eq!(submission.record.value.data.status, BookingStatus::Pending);
        let sent = submission.notification.wait().await.unwrap();
        assert_eq!(sent.id, "msg-1");

        let body = server.requests()[0].json();
        assert_eq!(body["subject"], "New Service Booking Request");
    }

    #[tokio::test]
    async fn test_booking_persisted_when_email_down() {
        let service = service(EmailConfig {
            api_key: Some("key".to_string()),
            endpoint: closed_url().await,
            ..EmailConfig::default()
        });

        let submission = service.submit_booking(booking()).await.unwrap();
        let err = submission.notification.wait().await.unwrap_err();
        assert!(matches!(err, EmailError::TransportError(_)));

        let bookings = service.store().fetch::<Booking>().await.unwrap().value;
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].id, submission.record.value.id);
        assert_eq!(bookings[0].data.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_testimonial_without_email_config() {
        let service = service(EmailConfig::default());

        let review = Testimonial::new("Bo", "Fast and friendly", 5).with_status(ReviewStatus::Approved);
        let submission = service.submit_testimonial(review).await.unwrap();

        assert_eq!(submission.record.value.data.status, ReviewStatus::Pending);
        assert!(matches!(
            submission.notification.wait().await,
            Err(EmailError::NotConfigured)
        ));
    }
}
