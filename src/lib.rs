pub mod config;
pub mod data_store;
pub mod domain;
pub mod email_client;
pub mod email_templates;
pub mod notifier;
pub mod routes;
pub mod startup;
pub mod telemetry;
