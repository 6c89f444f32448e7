use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use std::time;
use uuid::Uuid;

use crate::config::DataStoreSettings;
use crate::domain::new_subscriber::NewSubscriber;
use crate::domain::project::{NewProject, Project};
use crate::domain::subscriber::Subscriber;

const SUBSCRIBERS_TABLE: &str = "newsletter_subscribers";
const PROJECTS_TABLE: &str = "projects";
// PostgreSQL unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Client for the hosted database REST API (PostgREST dialect, as exposed by
/// Supabase). One instance is built at startup and shared by every request.
pub struct DataStoreClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum DataStoreError {
    #[error("The row violates a unique constraint.")]
    UniqueViolation,
    #[error("The data store rejected the request with {status}: {message}")]
    Rejected {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    #[error("The data store returned no representation of the written row.")]
    EmptyRepresentation,
    #[error("Failed to reach the data store.")]
    RequestError(#[from] reqwest::Error),
}

/// Error body returned by PostgREST.
#[derive(serde::Deserialize, Default)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(serde::Serialize)]
struct SubscriberRow<'a> {
    id: Uuid,
    email: &'a str,
    ip_address: Option<&'a str>,
    user_agent: Option<&'a str>,
}

impl DataStoreClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: time::Duration,
    ) -> Result<DataStoreClient, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(DataStoreClient {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_settings(settings: &DataStoreSettings) -> Result<DataStoreClient, anyhow::Error> {
        let base_url = settings
            .base_url
            .clone()
            .context("The data store base url is not configured.")?;
        let api_key = settings
            .api_key
            .clone()
            .context("The data store api key is not configured.")?;

        DataStoreClient::new(base_url, api_key, settings.get_timeout())
            .context("Failed to build the data store http client.")
    }

    #[tracing::instrument(
        name = "Insert a new subscriber into the data store",
        skip(self, new_subscriber)
    )]
    pub async fn insert_subscriber(
        &self,
        new_subscriber: &NewSubscriber,
    ) -> Result<Subscriber, DataStoreError> {
        let row = SubscriberRow {
            id: Uuid::new_v4(),
            email: new_subscriber.email.as_ref(),
            ip_address: new_subscriber.ip_address.as_deref(),
            user_agent: new_subscriber.user_agent.as_deref(),
        };
        let response = self
            .request(Method::POST, SUBSCRIBERS_TABLE)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;

        first_row(response).await
    }

    #[tracing::instrument(name = "Get subscribers from the data store", skip(self))]
    pub async fn list_subscribers(&self) -> Result<Vec<Subscriber>, DataStoreError> {
        let response = self
            .request(Method::GET, SUBSCRIBERS_TABLE)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;

        rows(response).await
    }

    #[tracing::instrument(name = "Get projects from the data store", skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<Project>, DataStoreError> {
        let response = self
            .request(Method::GET, PROJECTS_TABLE)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;

        rows(response).await
    }

    #[tracing::instrument(
        name = "Insert a new project into the data store",
        skip(self, project),
        fields(title = %project.title.as_ref())
    )]
    pub async fn insert_project(&self, project: &NewProject) -> Result<Project, DataStoreError> {
        // The `id` column default assigns the identifier
        let response = self
            .request(Method::POST, PROJECTS_TABLE)
            .header("Prefer", "return=representation")
            .json(&[project])
            .send()
            .await?;

        first_row(response).await
    }

    /// Replaces every editable column. `None` when no project has `id`.
    #[tracing::instrument(name = "Update a project in the data store", skip(self, project))]
    pub async fn update_project(
        &self,
        id: Uuid,
        project: &NewProject,
    ) -> Result<Option<Project>, DataStoreError> {
        let response = self
            .request(Method::PATCH, PROJECTS_TABLE)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(project)
            .send()
            .await?;

        Ok(rows(response).await?.into_iter().next())
    }

    /// `None` when no project has `id`.
    #[tracing::instrument(name = "Delete a project from the data store", skip(self))]
    pub async fn delete_project(&self, id: Uuid) -> Result<Option<Project>, DataStoreError> {
        let response = self
            .request(Method::DELETE, PROJECTS_TABLE)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .send()
            .await?;

        Ok(rows(response).await?.into_iter().next())
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table);

        self.http_client
            .request(method, &url)
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
    }
}

async fn first_row<R: DeserializeOwned>(response: Response) -> Result<R, DataStoreError> {
    rows(response)
        .await?
        .into_iter()
        .next()
        .ok_or(DataStoreError::EmptyRepresentation)
}

async fn rows<R: DeserializeOwned>(response: Response) -> Result<Vec<R>, DataStoreError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body: PostgrestError = response.json().await.unwrap_or_default();

    if body.code.as_deref() == Some(UNIQUE_VIOLATION) {
        return Err(DataStoreError::UniqueViolation);
    }

    tracing::error!(
        status = %status,
        code = ?body.code,
        message = ?body.message,
        "The data store rejected the request"
    );

    Err(DataStoreError::Rejected {
        status,
        code: body.code,
        message: body.message.unwrap_or_default(),
    })
}
