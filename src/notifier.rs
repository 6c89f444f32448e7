use lettre::AsyncTransport;

use crate::data_store::{DataStoreClient, DataStoreError};
use crate::domain::project_alert::ProjectAlert;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::email_client::{EmailClient, EmailClientError, MessageId};

/// Result of one send attempt in a bulk run.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub recipient: String,
    pub result: Result<MessageId, EmailClientError>,
}

#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DeliveryStats {
    pub sent: usize,
    pub total: usize,
}

impl DeliveryReport {
    pub fn stats(&self) -> DeliveryStats {
        DeliveryStats {
            sent: self
                .outcomes
                .iter()
                .filter(|outcome| outcome.result.is_ok())
                .count(),
            total: self.outcomes.len(),
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &EmailClientError)> {
        self.outcomes.iter().filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .err()
                .map(|err| (outcome.recipient.as_str(), err))
        })
    }
}

/// Sends `alert` to every recipient, one after the other. A failure is
/// recorded and the loop moves on to the next address.
pub async fn broadcast_project_alert<T, I>(
    email_client: &EmailClient<T>,
    recipients: I,
    alert: &ProjectAlert,
    fallback_link: &str,
) -> DeliveryReport
where
    T: AsyncTransport + Send + Sync,
    <T as AsyncTransport>::Error: 'static + Send + Sync,
    <T as AsyncTransport>::Error: std::error::Error,
    I: IntoIterator<Item = String>,
{
    let mut report = DeliveryReport::default();

    for recipient in recipients {
        let result = match SubscriberEmail::parse(recipient.clone()) {
            Ok(email) => {
                email_client
                    .send_project_alert(&email, alert, fallback_link)
                    .await
            }
            Err(err) => Err(EmailClientError::InvalidRecipient(err)),
        };

        report.outcomes.push(DeliveryOutcome { recipient, result });
    }

    report
}

/// Reads the subscriber list once and alerts each subscriber about a project.
#[tracing::instrument(
    name = "Notifying subscribers about a project",
    skip(data_store, email_client, alert, fallback_link),
    fields(title = %alert.title)
)]
pub async fn notify_subscribers<T>(
    data_store: &DataStoreClient,
    email_client: &EmailClient<T>,
    alert: &ProjectAlert,
    fallback_link: &str,
) -> Result<DeliveryStats, DataStoreError>
where
    T: AsyncTransport + Send + Sync,
    <T as AsyncTransport>::Error: 'static + Send + Sync,
    <T as AsyncTransport>::Error: std::error::Error,
{
    let subscribers = data_store.list_subscribers().await?;
    let recipients = subscribers.into_iter().map(|subscriber| subscriber.email);
    let report = broadcast_project_alert(email_client, recipients, alert, fallback_link).await;

    for (recipient, err) in report.failures() {
        tracing::warn!(
            error.cause_chain = ?err,
            error.message = %err,
            "Failed to send a project alert to {}",
            recipient
        );
    }

    let stats = report.stats();
    tracing::info!(
        sent = stats.sent,
        total = stats.total,
        "Project alert delivered"
    );

    Ok(stats)
}
