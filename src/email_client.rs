use lettre::address::AddressError;
use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::stub::AsyncStubTransport;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::config::EmailClientSettings;
use crate::domain::project_alert::ProjectAlert;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::email_templates::{project_alert_email, welcome_email, EmailContent};

pub type MailTransport = AsyncSmtpTransport<Tokio1Executor>;
pub type StubMailTransport = AsyncStubTransport;

/// `Message-ID` header assigned to an accepted email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(String);

impl MessageId {
    fn generate(domain: &str) -> Self {
        Self(format!("<{}@{}>", Uuid::new_v4(), domain))
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum EmailClientError {
    #[error("{0}")]
    InvalidRecipient(String),
    #[error("{0} cannot be used as a mailbox")]
    InvalidAddress(String, #[source] AddressError),
    #[error("failed to build the email message")]
    MessageError(#[from] lettre::error::Error),
    #[error("transport error while trying to send the email")]
    TransportError(#[source] anyhow::Error),
}

/// Sends one templated email per call through an SMTP relay (or any other
/// lettre transport). No retries: a failed attempt is reported as it is.
pub struct EmailClient<T>
where
    T: AsyncTransport + Send + Sync,
    <T as AsyncTransport>::Error: 'static + Send + Sync,
    <T as AsyncTransport>::Error: std::error::Error,
{
    transport: T,
    sender: SubscriberEmail,
}

impl EmailClient<MailTransport> {
    pub fn from_settings(settings: &EmailClientSettings) -> Result<Self, anyhow::Error> {
        let sender = settings
            .get_sender_email()
            .map_err(|err| anyhow::anyhow!("Sender email is not valid: {}", err))?;
        let credentials = Credentials::new(
            sender.as_ref().to_string(),
            settings
                .password
                .as_ref()
                .map(|password| password.expose_secret().clone())
                .unwrap_or_default(),
        );
        let transport = MailTransport::relay(&settings.smtp_server)?
            .credentials(credentials)
            .port(settings.port)
            .timeout(Some(settings.get_timeout()))
            .build();

        Ok(Self::new(transport, sender))
    }
}

impl<T> EmailClient<T>
where
    T: AsyncTransport + Send + Sync,
    <T as AsyncTransport>::Error: 'static + Send + Sync,
    <T as AsyncTransport>::Error: std::error::Error,
{
    pub fn new(transport: T, sender: SubscriberEmail) -> Self {
        EmailClient { transport, sender }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[tracing::instrument(
        name = "Sending a welcome email",
        skip(self, recipient),
        fields(recipient = %recipient)
    )]
    pub async fn send_welcome_email(
        &self,
        recipient: &SubscriberEmail,
    ) -> Result<MessageId, EmailClientError> {
        self.send_email(recipient, welcome_email()).await
    }

    #[tracing::instrument(
        name = "Sending a new project alert",
        skip(self, recipient, alert, fallback_link),
        fields(recipient = %recipient, title = %alert.title)
    )]
    pub async fn send_project_alert(
        &self,
        recipient: &SubscriberEmail,
        alert: &ProjectAlert,
        fallback_link: &str,
    ) -> Result<MessageId, EmailClientError> {
        self.send_email(recipient, project_alert_email(alert, fallback_link))
            .await
    }

    pub async fn send_email(
        &self,
        recipient: &SubscriberEmail,
        content: EmailContent,
    ) -> Result<MessageId, EmailClientError> {
        let from = Mailbox::new(Some(content.sender_name), parse_address(&self.sender)?);
        let to = Mailbox::new(None, parse_address(recipient)?);
        let message_id = MessageId::generate(self.sender.domain());
        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(content.subject)
            .message_id(Some(message_id.to_string()))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(content.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(content.html),
                    ),
            )?;

        self.transport
            .send(email)
            .await
            .map_err(|err| EmailClientError::TransportError(err.into()))?;

        Ok(message_id)
    }
}

fn parse_address(email: &SubscriberEmail) -> Result<Address, EmailClientError> {
    email
        .as_ref()
        .parse::<Address>()
        .map_err(|err| EmailClientError::InvalidAddress(email.to_string(), err))
}
