use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use lettre::AsyncTransport;

use crate::data_store::{DataStoreClient, DataStoreError};
use crate::domain::project_alert::{ProjectAlert, ProjectAlertBody};
use crate::email_client::EmailClient;
use crate::notifier::{notify_subscribers, DeliveryStats};
use crate::routes::{error_chain_fmt, ApiMessage};
use crate::startup::ApplicationSiteUrl;

#[derive(serde::Serialize)]
struct NotifyProjectResponse {
    success: bool,
    message: String,
    stats: DeliveryStats,
}

#[tracing::instrument(
    name = "Publishing a project alert to all subscribers",
    skip(body, data_store, email_client, site_url),
    fields(
        title = %body.title,
        category = %body.category
    )
)]
pub async fn publish_project_alert<T>(
    body: web::Json<ProjectAlertBody>,
    data_store: web::Data<DataStoreClient>,
    email_client: web::Data<EmailClient<T>>,
    site_url: web::Data<ApplicationSiteUrl>,
) -> Result<HttpResponse, NotifyProjectError>
where
    T: AsyncTransport + Send + Sync + 'static,
    <T as AsyncTransport>::Error: 'static + Send + Sync,
    <T as AsyncTransport>::Error: std::error::Error,
{
    let alert: ProjectAlert = body
        .into_inner()
        .try_into()
        .map_err(NotifyProjectError::ValidationError)?;

    let stats = notify_subscribers(&data_store, &email_client, &alert, &site_url.0).await?;

    Ok(HttpResponse::Ok().json(NotifyProjectResponse {
        success: true,
        message: format!("Notified {} of {} subscribers", stats.sent, stats.total),
        stats,
    }))
}

#[derive(thiserror::Error)]
pub enum NotifyProjectError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to get subscribers from the data store.")]
    GetSubscribersError(#[from] DataStoreError),
}

impl std::fmt::Debug for NotifyProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for NotifyProjectError {
    fn status_code(&self) -> StatusCode {
        match self {
            NotifyProjectError::ValidationError(_) => StatusCode::BAD_REQUEST,
            NotifyProjectError::GetSubscribersError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            NotifyProjectError::ValidationError(message) => message.as_str(),
            NotifyProjectError::GetSubscribersError(_) => "Failed to notify subscribers.",
        };

        HttpResponse::build(self.status_code()).json(ApiMessage::failure(message))
    }
}
