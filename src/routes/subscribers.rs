use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};

use crate::data_store::{DataStoreClient, DataStoreError};
use crate::domain::subscriber::Subscriber;
use crate::routes::{error_chain_fmt, ApiMessage};

#[derive(serde::Serialize)]
struct SubscribersResponse {
    success: bool,
    subscribers: Vec<Subscriber>,
}

#[tracing::instrument(name = "Listing subscribers handler", skip(data_store))]
pub async fn list_subscribers(
    data_store: web::Data<DataStoreClient>,
) -> Result<HttpResponse, SubscribersError> {
    let subscribers = data_store.list_subscribers().await?;

    Ok(HttpResponse::Ok().json(SubscribersResponse {
        success: true,
        subscribers,
    }))
}

#[derive(thiserror::Error)]
pub enum SubscribersError {
    #[error("Failed to get subscribers from the data store.")]
    GetSubscribersError(#[from] DataStoreError),
}

impl std::fmt::Debug for SubscribersError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribersError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiMessage::failure(self.to_string()))
    }
}
