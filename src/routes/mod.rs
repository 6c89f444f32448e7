mod configuration_error;
mod cors;
mod health_check;
mod notify_project;
mod projects;
mod subscribers;
mod subscriptions;

pub use configuration_error::*;
pub use cors::*;
pub use health_check::*;
pub use notify_project::*;
pub use projects::*;
pub use subscribers::*;
pub use subscriptions::*;

use actix_web::{error::InternalError, error::JsonPayloadError, HttpRequest, HttpResponse};

/// `{ success, message }` body shared by every JSON endpoint.
#[derive(serde::Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Renders body deserialization failures as a JSON 400 instead of plain text.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!("Invalid request body: {}", err);

    let message = format!("Invalid request body: {}", err);
    let response = HttpResponse::BadRequest().json(ApiMessage::failure(message));

    InternalError::from_response(err, response).into()
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
