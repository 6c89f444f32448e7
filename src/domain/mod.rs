pub mod new_subscriber;
pub mod project;
pub mod project_alert;
pub mod project_title;
pub mod subscriber;
pub mod subscriber_email;
