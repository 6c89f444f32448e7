use config::{Config, ConfigError, File};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time;

use crate::domain::subscriber_email::SubscriberEmail;

const DATA_STORE_BASE_URL: &str = "APP_DATA_STORE__BASE_URL";
const DATA_STORE_API_KEY: &str = "APP_DATA_STORE__API_KEY";
const EMAIL_CLIENT_USERNAME: &str = "APP_EMAIL_CLIENT__USERNAME";
const EMAIL_CLIENT_PASSWORD: &str = "APP_EMAIL_CLIENT__PASSWORD";
pub const EMAIL_CLIENT_SMTP_SERVER: &str = "APP_EMAIL_CLIENT__SMTP_SERVER";

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub data_store: DataStoreSettings,
    pub email_client: EmailClientSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    // Call-to-action fallback for project alerts without their own link
    pub site_url: String,
}

/// Hosted data store (PostgREST API). Credentials are optional at
/// deserialization time so a missing value is reported instead of aborting.
#[derive(serde::Deserialize, Clone)]
pub struct DataStoreSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub smtp_server: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    // secrecy protects secret information and prevents them to be exposed (eg: via logs)
    #[serde(default)]
    pub password: Option<Secret<String>>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl Settings {
    pub fn get_address(&self) -> String {
        format!(
            "{}:{}",
            self.application.get_host(),
            self.application.get_port()
        )
    }

    pub fn get_site_url(&self) -> String {
        self.application.site_url.clone()
    }

    pub fn set_app_port(&mut self, port: u16) {
        self.application.port = port;
    }

    pub fn set_data_store_base_url(&mut self, new_base_url: String) {
        self.data_store.base_url = Some(new_base_url)
    }

    /// Names of the required settings that are absent, blank or unusable,
    /// spelled as the environment variables that provide them. The SMTP
    /// username doubles as sender address, so it has to be an email.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if is_blank(self.data_store.base_url.as_deref()) {
            missing.push(DATA_STORE_BASE_URL);
        }
        if is_blank_secret(self.data_store.api_key.as_ref()) {
            missing.push(DATA_STORE_API_KEY);
        }
        if self.email_client.get_sender_email().is_err() {
            missing.push(EMAIL_CLIENT_USERNAME);
        }
        if is_blank_secret(self.email_client.password.as_ref()) {
            missing.push(EMAIL_CLIENT_PASSWORD);
        }

        missing
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |value| value.trim().is_empty())
}

fn is_blank_secret(value: Option<&Secret<String>>) -> bool {
    is_blank(value.map(|secret| secret.expose_secret().as_str()))
}

impl ApplicationSettings {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_host(&self) -> String {
        self.host.clone()
    }
}

impl DataStoreSettings {
    pub fn get_timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_milliseconds)
    }
}

impl EmailClientSettings {
    pub fn get_sender_email(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.username.clone().unwrap_or_default())
    }

    pub fn get_timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_milliseconds)
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir().map_err(|err| ConfigError::Foreign(Box::new(err)))?;
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let enviroment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(enviroment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let settings = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_DATA_STORE__API_KEY would set Settings.data_store.api_key
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    tracing::info!("Application environment = {:?}", enviroment);

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}
