use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A row of the `newsletter_subscribers` table as the data store returns it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}
