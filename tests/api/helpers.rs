use chrono::Utc;
use once_cell::sync::Lazy;
use reqwest::Response;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use projects_suite::{
    config::{get_configuration, Settings},
    email_client::{EmailClient, StubMailTransport},
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

pub const SUBSCRIBERS_PATH: &str = "/rest/v1/newsletter_subscribers";
pub const PROJECTS_PATH: &str = "/rest/v1/projects";

// Logs are only printed when TEST_LOG is set, eg: `TEST_LOG=true cargo test`
static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = String::from("info");
    let name = String::from("test");

    if std::env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber(name, filter, std::io::stdout));
    } else {
        init_subscriber(get_subscriber(name, filter, std::io::sink));
    }
});

pub struct TestApp {
    pub address: String,
    pub data_store: MockServer,
    pub email_client: Arc<EmailClient<StubMailTransport>>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        TestApp::spawn_app_with_transport(StubMailTransport::new_ok()).await
    }

    /// Spawns the server on a random port, backed by a mock data store and
    /// the given stub SMTP transport.
    pub async fn spawn_app_with_transport(transport: StubMailTransport) -> TestApp {
        Lazy::force(&TRACING);

        let data_store = MockServer::start().await;
        let mut config = test_configuration();

        config.set_data_store_base_url(data_store.uri());
        config.data_store.api_key = Some(Secret::new(String::from("test-api-key")));
        config.email_client.username = Some(String::from("updates@projects-suite.dev"));
        config.email_client.password = Some(Secret::new(String::from("app-password")));

        let sender = config
            .email_client
            .get_sender_email()
            .expect("Sender email is not valid.");
        let email_client = Arc::new(EmailClient::new(transport, sender));

        let application = Application::build_with_email_client(config, email_client.clone())
            .await
            .expect("Failed to build application.");
        let address = format!("http://127.0.0.1:{}", application.get_port());

        tokio::spawn(application.run_until_stop());

        TestApp {
            address,
            data_store,
            email_client,
            api_client: reqwest::Client::new(),
        }
    }

    /// Emails the stub transport was asked to deliver, successful or not.
    pub async fn sent_emails(&self) -> Vec<(lettre::address::Envelope, String)> {
        self.email_client.transport().messages().await
    }

    /// The welcome email leaves on a detached task, so poll for it.
    pub async fn wait_for_emails(
        &self,
        expected: usize,
    ) -> Vec<(lettre::address::Envelope, String)> {
        for _ in 0..50 {
            let emails = self.sent_emails().await;
            if emails.len() >= expected {
                return emails;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        self.sent_emails().await
    }

    /// Mounts an in-memory `newsletter_subscribers` table on the data store.
    pub async fn mount_subscribers_table(&self) -> FakeSubscribersTable {
        let table = FakeSubscribersTable::default();

        Mock::given(method("POST"))
            .and(path(SUBSCRIBERS_PATH))
            .respond_with(InsertSubscriber(table.clone()))
            .mount(&self.data_store)
            .await;
        Mock::given(method("GET"))
            .and(path(SUBSCRIBERS_PATH))
            .respond_with(ListSubscribers(table.clone()))
            .mount(&self.data_store)
            .await;

        table
    }

    pub async fn post_subscription(&self, body: Value) -> Response {
        self.api_client
            .post(&format!("{}/api/subscribe", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_project_alert(&self, body: Value) -> Response {
        self.api_client
            .post(&format!("{}/api/notify-project", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_project(&self, body: Value) -> Response {
        self.api_client
            .post(&format!("{}/api/projects", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, endpoint: &str) -> Response {
        self.api_client
            .get(&format!("{}{}", self.address, endpoint))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub struct MisconfiguredApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

/// Spawns the server without any data store or SMTP credentials.
pub async fn spawn_misconfigured_app() -> MisconfiguredApp {
    let mut config = test_configuration();

    config.data_store.base_url = None;
    config.data_store.api_key = None;
    config.email_client.username = None;
    config.email_client.password = None;

    spawn_misconfigured_app_from(config).await
}

/// Spawns the server the way `main` does, with the real SMTP client.
pub async fn spawn_misconfigured_app_from(config: Settings) -> MisconfiguredApp {
    Lazy::force(&TRACING);

    let application = Application::build(config)
        .await
        .expect("Failed to build application.");
    let address = format!("http://127.0.0.1:{}", application.get_port());

    tokio::spawn(application.run_until_stop());

    MisconfiguredApp {
        address,
        api_client: reqwest::Client::new(),
    }
}

pub fn test_configuration() -> Settings {
    let mut config = get_configuration().expect("Failed to read configuration.");

    // Port 0 lets the OS pick a free port, so tests can run in parallel
    config.set_app_port(0);
    config.application.host = String::from("127.0.0.1");

    config
}

/// Rows of a fake `newsletter_subscribers` table, unique on `email` like the
/// real one.
#[derive(Clone, Default)]
pub struct FakeSubscribersTable {
    rows: Arc<Mutex<Vec<Value>>>,
}

impl FakeSubscribersTable {
    /// Stores a subscriber as is, skipping any validation.
    pub fn seed(&self, email: &str) {
        self.rows.lock().unwrap().push(json!({
            "id": Uuid::new_v4(),
            "email": email,
            "ip_address": null,
            "user_agent": null,
            "created_at": Utc::now().to_rfc3339(),
        }));
    }

    pub fn rows(&self) -> Vec<Value> {
        self.rows.lock().unwrap().clone()
    }
}

struct InsertSubscriber(FakeSubscribersTable);

impl Respond for InsertSubscriber {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let inserted: Vec<Value> = match serde_json::from_slice(&request.body) {
            Ok(rows) => rows,
            Err(_) => return ResponseTemplate::new(400),
        };
        let mut rows = self.0.rows.lock().unwrap();
        let mut created = Vec::new();

        for mut row in inserted {
            if rows.iter().any(|stored| stored["email"] == row["email"]) {
                return ResponseTemplate::new(409).set_body_json(json!({
                    "code": "23505",
                    "message": "duplicate key value violates unique constraint \"newsletter_subscribers_email_key\"",
                    "details": null,
                    "hint": null,
                }));
            }

            row["created_at"] = json!(Utc::now().to_rfc3339());
            created.push(row);
        }

        rows.extend(created.iter().cloned());

        ResponseTemplate::new(201).set_body_json(created)
    }
}

struct ListSubscribers(FakeSubscribersTable);

impl Respond for ListSubscribers {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let mut rows = self.0.rows();
        rows.reverse();

        ResponseTemplate::new(200).set_body_json(rows)
    }
}

/// A `projects` row as the data store would return it.
pub fn project_row(title: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "title": title,
        "category": "Major Project",
        "description": "Cart, checkout and payments.",
        "techstack": ["React", "Node.js"],
        "image": null,
        "demolink": "https://store.example.com",
        "codelink": null,
        "created_at": Utc::now().to_rfc3339(),
    })
}
