use anyhow::Context;

use projects_suite::config::get_configuration;
use projects_suite::startup::Application;
use projects_suite::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber(
        String::from("projects_suite"),
        String::from("info"),
        std::io::stdout,
    );

    init_subscriber(subscriber);

    let config = get_configuration().context("Failed to read the configuration.")?;
    let application = Application::build(config).await?;

    application.run_until_stop().await?;

    Ok(())
}
