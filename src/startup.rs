use actix_web::dev::Server;
use actix_web::http::Method;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use lettre::AsyncTransport;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::config::{Settings, EMAIL_CLIENT_SMTP_SERVER};
use crate::data_store::DataStoreClient;
use crate::email_client::{EmailClient, MailTransport};
use crate::routes::{
    configuration_error, cors_headers, create_project, delete_project, handle_create_subscription,
    health_check, json_error_handler, list_projects, list_subscribers, method_not_allowed,
    preflight, publish_project_alert, update_project, MissingSettings,
};

/// Public url of the site, used as call to action when an alert has no link.
#[derive(Debug, Clone)]
pub struct ApplicationSiteUrl(pub String);

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        if let Some(application) = Self::misconfigured(&config)? {
            return Ok(application);
        }

        let email_client = EmailClient::<MailTransport>::from_settings(&config.email_client);
        let email_client = match email_client {
            Ok(email_client) => email_client,
            Err(err) => {
                tracing::error!(
                    error.cause_chain = ?err,
                    error.message = %err,
                    "Failed to build the SMTP email client"
                );
                let missing = MissingSettings(vec![EMAIL_CLIENT_SMTP_SERVER]);

                return Self::serve_misconfigured(&config, missing);
            }
        };

        Self::build_with_email_client(config, Arc::new(email_client)).await
    }

    /// Same as [`Application::build`] with a caller-provided email client,
    /// so any lettre transport can stand behind the relay.
    pub async fn build_with_email_client<T>(
        config: Settings,
        email_client: Arc<EmailClient<T>>,
    ) -> Result<Self, anyhow::Error>
    where
        T: AsyncTransport + Send + Sync + 'static,
        <T as AsyncTransport>::Error: 'static + Send + Sync,
        <T as AsyncTransport>::Error: std::error::Error,
    {
        if let Some(application) = Self::misconfigured(&config)? {
            return Ok(application);
        }

        let data_store = DataStoreClient::from_settings(&config.data_store)?;
        let site_url = ApplicationSiteUrl(config.get_site_url());

        let listener = TcpListener::bind(config.get_address())
            .with_context(|| format!("Failed to bind {}", config.get_address()))?;
        let port = listener.local_addr()?.port();
        let server = run(listener, data_store, email_client, site_url)?;

        tracing::info!("Server listening on {}:{}", config.application.host, port);

        Ok(Self { port, server })
    }

    fn misconfigured(config: &Settings) -> Result<Option<Self>, anyhow::Error> {
        let missing = MissingSettings(config.missing_settings());
        if missing.is_empty() {
            return Ok(None);
        }

        Self::serve_misconfigured(config, missing).map(Some)
    }

    fn serve_misconfigured(
        config: &Settings,
        missing: MissingSettings,
    ) -> Result<Self, anyhow::Error> {
        tracing::error!(
            missing_settings = ?missing.0,
            "Required settings are missing, every request will be answered with a configuration error"
        );

        let listener = TcpListener::bind(config.get_address())
            .with_context(|| format!("Failed to bind {}", config.get_address()))?;
        let port = listener.local_addr()?.port();
        let server = run_misconfigured(listener, missing)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run<T>(
    listener: TcpListener,
    data_store: DataStoreClient,
    email_client: Arc<EmailClient<T>>,
    site_url: ApplicationSiteUrl,
) -> Result<Server, std::io::Error>
where
    T: AsyncTransport + Send + Sync + 'static,
    <T as AsyncTransport>::Error: 'static + Send + Sync,
    <T as AsyncTransport>::Error: std::error::Error,
{
    let data_store = web::Data::new(data_store);
    let email_client = web::Data::from(email_client);
    let site_url = web::Data::new(site_url);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors_headers())
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/api/subscribe")
                    .route(web::post().to(handle_create_subscription::<T>))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/api/notify-project")
                    .route(web::post().to(publish_project_alert::<T>))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/api/subscribers")
                    .route(web::get().to(list_subscribers))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/api/projects")
                    .route(web::get().to(list_projects))
                    .route(web::post().to(create_project::<T>))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/api/projects/{id}")
                    .route(web::put().to(update_project))
                    .route(web::delete().to(delete_project))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .app_data(data_store.clone())
            .app_data(email_client.clone())
            .app_data(site_url.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Server answering every request with the list of missing settings.
pub fn run_misconfigured(
    listener: TcpListener,
    missing: MissingSettings,
) -> Result<Server, std::io::Error> {
    let missing = web::Data::new(missing);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors_headers())
            .wrap(TracingLogger::default())
            .default_service(web::to(configuration_error))
            .app_data(missing.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
