use actix_web::{http::Method, web, HttpRequest, HttpResponse};

use crate::routes::ApiMessage;

/// Required settings that were absent at startup.
#[derive(Debug, Clone)]
pub struct MissingSettings(pub Vec<&'static str>);

impl MissingSettings {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn message(&self) -> String {
        format!(
            "Server Error: Missing configuration settings: {}. Provide them through the environment or the configuration files.",
            self.0.join(", ")
        )
    }
}

/// Catch-all handler of a misconfigured server: only preflights succeed.
pub async fn configuration_error(
    request: HttpRequest,
    missing: web::Data<MissingSettings>,
) -> HttpResponse {
    if request.method() == Method::OPTIONS {
        return HttpResponse::Ok().finish();
    }

    tracing::error!(
        missing_settings = ?missing.0,
        "Rejecting {} {}: server is missing configuration",
        request.method(),
        request.path()
    );

    HttpResponse::InternalServerError().json(ApiMessage::failure(missing.message()))
}
