use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, ResponseError};
use lettre::AsyncTransport;
use tracing::Instrument;

use crate::{
    data_store::{DataStoreClient, DataStoreError},
    domain::{
        new_subscriber::{NewSubscriber, NewSubscriberBody},
        subscriber::Subscriber,
        subscriber_email::SubscriberEmail,
    },
    email_client::EmailClient,
    routes::{error_chain_fmt, ApiMessage},
};

#[derive(serde::Serialize)]
struct SubscribeResponse {
    success: bool,
    message: &'static str,
    data: Subscriber,
}

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(body, request, data_store, email_client),
    fields(
        subscriber_email = %body.email
    )
)]
pub async fn handle_create_subscription<T>(
    body: web::Json<NewSubscriberBody>,
    request: HttpRequest,
    data_store: web::Data<DataStoreClient>,
    email_client: web::Data<EmailClient<T>>,
) -> Result<HttpResponse, SubscribeError>
where
    T: AsyncTransport + Send + Sync + 'static,
    <T as AsyncTransport>::Error: 'static + Send + Sync,
    <T as AsyncTransport>::Error: std::error::Error,
{
    let new_subscriber = NewSubscriber::parse(body.into_inner(), &request)
        .map_err(SubscribeError::ValidationError)?;

    let subscriber = data_store
        .insert_subscriber(&new_subscriber)
        .await
        .map_err(|err| match err {
            DataStoreError::UniqueViolation => SubscribeError::AlreadySubscribed,
            err => SubscribeError::UnexpectedError(
                anyhow::Error::new(err).context("Failed to insert a new subscriber."),
            ),
        })?;

    dispatch_welcome_email(email_client, new_subscriber.email);

    Ok(HttpResponse::Created().json(SubscribeResponse {
        success: true,
        message: "Successfully subscribed! Check your email for confirmation.",
        data: subscriber,
    }))
}

/// Sends the welcome email on a detached task. The subscription is already
/// stored, so the outcome is only logged and the response never waits for it.
fn dispatch_welcome_email<T>(email_client: web::Data<EmailClient<T>>, recipient: SubscriberEmail)
where
    T: AsyncTransport + Send + Sync + 'static,
    <T as AsyncTransport>::Error: 'static + Send + Sync,
    <T as AsyncTransport>::Error: std::error::Error,
{
    let span = tracing::info_span!("Dispatching the welcome email", subscriber_email = %recipient);

    actix_web::rt::spawn(
        async move {
            match email_client.send_welcome_email(&recipient).await {
                Ok(message_id) => {
                    tracing::info!(%message_id, "Welcome email accepted by the relay")
                }
                Err(err) => tracing::error!(
                    error.cause_chain = ?err,
                    error.message = %err,
                    "Failed to send a welcome email to {}",
                    recipient
                ),
            }
        }
        .instrument(span),
    );
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("This email is already subscribed to our newsletter!")]
    AlreadySubscribed,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SubscribeError::AlreadySubscribed => StatusCode::CONFLICT,
            SubscribeError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Details of unexpected errors stay in the logs
        let message = match self {
            SubscribeError::ValidationError(_) => "Please provide a valid email address",
            SubscribeError::AlreadySubscribed => {
                "This email is already subscribed to our newsletter!"
            }
            SubscribeError::UnexpectedError(_) => "Failed to subscribe. Please try again later.",
        };

        HttpResponse::build(self.status_code()).json(ApiMessage::failure(message))
    }
}
