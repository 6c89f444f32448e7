use actix_web::{http::header, HttpRequest};
use serde::Deserialize;

use crate::domain::subscriber_email::SubscriberEmail;

#[derive(Debug)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Deserialize)]
pub struct NewSubscriberBody {
    pub email: String,
}

impl NewSubscriber {
    /// Validate the body and attach whatever the request tells about its caller.
    pub fn parse(body: NewSubscriberBody, request: &HttpRequest) -> Result<Self, String> {
        let email = SubscriberEmail::parse(body.email)?;
        // Honours Forwarded / X-Forwarded-For before falling back to the peer address
        let ip_address = request
            .connection_info()
            .realip_remote_addr()
            .map(str::to_owned);
        let user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Ok(NewSubscriber {
            email,
            ip_address,
            user_agent,
        })
    }
}
