use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use anyhow::Context;
use lettre::AsyncTransport;
use uuid::Uuid;

use crate::data_store::DataStoreClient;
use crate::domain::project::{NewProject, Project, ProjectBody};
use crate::email_client::EmailClient;
use crate::notifier::{notify_subscribers, DeliveryStats};
use crate::routes::{error_chain_fmt, ApiMessage};
use crate::startup::ApplicationSiteUrl;

#[derive(serde::Serialize)]
struct ProjectsResponse {
    success: bool,
    projects: Vec<Project>,
}

#[derive(serde::Serialize)]
struct ProjectResponse {
    success: bool,
    message: String,
    data: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<DeliveryStats>,
}

#[tracing::instrument(name = "Listing projects handler", skip(data_store))]
pub async fn list_projects(
    data_store: web::Data<DataStoreClient>,
) -> Result<HttpResponse, ProjectError> {
    let projects = data_store
        .list_projects()
        .await
        .context("Failed to get projects from the data store.")?;

    Ok(HttpResponse::Ok().json(ProjectsResponse {
        success: true,
        projects,
    }))
}

#[tracing::instrument(
    name = "Creating a new project handler",
    skip(body, data_store, email_client, site_url),
    fields(
        title = %body.title,
        notify_subscribers = %body.notify_subscribers
    )
)]
pub async fn create_project<T>(
    body: web::Json<ProjectBody>,
    data_store: web::Data<DataStoreClient>,
    email_client: web::Data<EmailClient<T>>,
    site_url: web::Data<ApplicationSiteUrl>,
) -> Result<HttpResponse, ProjectError>
where
    T: AsyncTransport + Send + Sync + 'static,
    <T as AsyncTransport>::Error: 'static + Send + Sync,
    <T as AsyncTransport>::Error: std::error::Error,
{
    let body = body.into_inner();
    let notify = body.notify_subscribers;
    let new_project: NewProject = body.try_into().map_err(ProjectError::ValidationError)?;

    let project = data_store
        .insert_project(&new_project)
        .await
        .context("Failed to insert a new project.")?;

    // The project is published whatever happens to the alerts
    let stats = if notify {
        let alert = new_project.alert();

        match notify_subscribers(&data_store, &email_client, &alert, &site_url.0).await {
            Ok(stats) => Some(stats),
            Err(err) => {
                tracing::error!(
                    error.cause_chain = ?err,
                    error.message = %err,
                    "Failed to notify subscribers about the new project"
                );
                None
            }
        }
    } else {
        None
    };

    let message = match &stats {
        Some(stats) => format!(
            "Project added and {} of {} subscribers notified",
            stats.sent, stats.total
        ),
        None => String::from("Project added successfully!"),
    };

    Ok(HttpResponse::Created().json(ProjectResponse {
        success: true,
        message,
        data: project,
        stats,
    }))
}

#[tracing::instrument(name = "Updating a project handler", skip(body, data_store))]
pub async fn update_project(
    id: web::Path<Uuid>,
    body: web::Json<ProjectBody>,
    data_store: web::Data<DataStoreClient>,
) -> Result<HttpResponse, ProjectError> {
    let id = id.into_inner();
    let project: NewProject = body
        .into_inner()
        .try_into()
        .map_err(ProjectError::ValidationError)?;

    let project = data_store
        .update_project(id, &project)
        .await
        .context("Failed to update the project.")?
        .ok_or(ProjectError::NotFound(id))?;

    Ok(HttpResponse::Ok().json(ProjectResponse {
        success: true,
        message: String::from("Project updated successfully!"),
        data: project,
        stats: None,
    }))
}

#[tracing::instrument(name = "Deleting a project handler", skip(data_store))]
pub async fn delete_project(
    id: web::Path<Uuid>,
    data_store: web::Data<DataStoreClient>,
) -> Result<HttpResponse, ProjectError> {
    let id = id.into_inner();

    data_store
        .delete_project(id)
        .await
        .context("Failed to delete the project.")?
        .ok_or(ProjectError::NotFound(id))?;

    Ok(HttpResponse::Ok().json(ApiMessage::success("Project deleted successfully!")))
}

#[derive(thiserror::Error)]
pub enum ProjectError {
    #[error("{0}")]
    ValidationError(String),
    #[error("There is no project with id {0}.")]
    NotFound(Uuid),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ProjectError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProjectError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ProjectError::NotFound(_) => StatusCode::NOT_FOUND,
            ProjectError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ProjectError::UnexpectedError(_) => {
                String::from("Something went wrong. Please try again later.")
            }
            err => err.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ApiMessage::failure(message))
    }
}
