//! HTML and plain-text bodies for the two transactional emails.

use chrono::{Datelike, Utc};

use crate::domain::project_alert::ProjectAlert;

const WELCOME_SENDER_NAME: &str = "ProjectsSuite";
const ALERT_SENDER_NAME: &str = "ProjectsSuite Updates";

/// A rendered email, ready to be handed to the SMTP relay.
#[derive(Debug, Clone)]
pub struct EmailContent {
    pub sender_name: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

const WELCOME_STYLE: &str = r#"
      body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
      .header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; text-align: center; border-radius: 10px 10px 0 0; }
      .content { background: #f9fafb; padding: 30px; border-radius: 0 0 10px 10px; }
      .feature { background: white; padding: 15px; margin: 10px 0; border-left: 4px solid #667eea; border-radius: 5px; }
      .footer { text-align: center; margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb; color: #6b7280; font-size: 14px; }
      .emoji { font-size: 24px; }
"#;

const ALERT_STYLE: &str = r#"
      body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 0; background-color: #f4f4f5; }
      .container { background-color: white; margin: 20px auto; border-radius: 12px; overflow: hidden; box-shadow: 0 4px 6px rgba(0,0,0,0.1); }
      .header { background: linear-gradient(135deg, #2563eb 0%, #7c3aed 100%); color: white; padding: 40px 30px; text-align: center; }
      .header h1 { margin: 0; font-size: 28px; font-weight: 800; }
      .header p { margin: 10px 0 0; opacity: 0.9; font-size: 16px; }
      .image-container { width: 100%; height: 250px; background-color: #f3f4f6; overflow: hidden; }
      .project-image { width: 100%; height: 100%; object-fit: cover; }
      .content { padding: 40px 30px; }
      .badge { display: inline-block; background-color: #eff6ff; color: #2563eb; padding: 6px 16px; border-radius: 50px; font-size: 14px; font-weight: 600; margin-bottom: 20px; }
      .title { font-size: 24px; font-weight: bold; margin: 0 0 15px; color: #111827; }
      .description { color: #4b5563; margin-bottom: 30px; font-size: 16px; line-height: 1.8; }
      .btn { display: block; background: linear-gradient(90deg, #2563eb 0%, #7c3aed 100%); color: white; text-align: center; padding: 16px; text-decoration: none; border-radius: 12px; font-weight: bold; font-size: 16px; }
      .footer { background-color: #f9fafb; padding: 30px; text-align: center; border-top: 1px solid #e5e7eb; font-size: 13px; color: #6b7280; }
      .divider { height: 1px; background-color: #e5e7eb; margin: 30px 0; }
"#;

pub fn welcome_email() -> EmailContent {
    let year = Utc::now().year();
    let html = format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <style>{style}</style>
  </head>
  <body>
    <div class="header">
      <h1 style="margin: 0;">Welcome to ProjectsSuite! 🚀</h1>
    </div>
    <div class="content">
      <p>Hi there!</p>
      <p>Thank you for subscribing to the <strong>ProjectsSuite Newsletter</strong>! Your #1 destination for Major &amp; Minor Student Projects.</p>
      <p>Here's what you can expect from us:</p>
      <div class="feature"><span class="emoji">🎓</span> <strong>Student Projects</strong> - Complete source codes &amp; documentation for Major/Minor projects</div>
      <div class="feature"><span class="emoji">💻</span> <strong>Web Development</strong> - Custom website building services</div>
      <div class="feature"><span class="emoji">🛠️</span> <strong>Software Solutions</strong> - Custom software for your specific needs</div>
      <div class="feature"><span class="emoji">🎁</span> <strong>Exclusive Offers</strong> - Get special discounts for students</div>
      <p style="margin-top: 30px;">Stay tuned for amazing content and updates!</p>
      <p>Best regards,<br><strong>The ProjectsSuite Team</strong></p>
    </div>
    <div class="footer">
      <p>© {year} ProjectsSuite. All rights reserved.</p>
      <p style="font-size: 12px; color: #9ca3af;">You're receiving this email because you subscribed to our newsletter.</p>
    </div>
  </body>
</html>
"#,
        style = WELCOME_STYLE,
        year = year,
    );
    let text = format!(
        r#"Welcome to ProjectsSuite! 🎉

Hi there!

Thank you for subscribing to the ProjectsSuite Newsletter! Your #1 destination for Major & Minor Student Projects.

Here's what you can expect from us:

🎓 Student Projects - Complete source codes & documentation for Major/Minor projects
💻 Web Development - Custom website building services
🛠️ Software Solutions - Custom software for your specific needs
🎁 Exclusive Offers - Get special discounts for students

Stay tuned for amazing content and updates!

Best regards,
The ProjectsSuite Team

© {} ProjectsSuite. All rights reserved.
"#,
        year
    );

    EmailContent {
        sender_name: String::from(WELCOME_SENDER_NAME),
        subject: String::from("Welcome to ProjectsSuite! 🚀"),
        html,
        text,
    }
}

/// Renders the alert for `alert`; `fallback_link` is used as call to action
/// when the project has no link of its own.
pub fn project_alert_email(alert: &ProjectAlert, fallback_link: &str) -> EmailContent {
    let year = Utc::now().year();
    let link = alert.link.as_deref().unwrap_or(fallback_link);
    let title = escape_html(&alert.title);
    let image_block = match &alert.image {
        Some(image) => format!(
            r#"
    <div class="image-container">
      <img src="{}" alt="{}" class="project-image" />
    </div>"#,
            escape_html(image),
            title
        ),
        None => String::new(),
    };
    let html = format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <style>{style}</style>
  </head>
  <body>
    <div class="container">
      <div class="header">
        <h1>New Project Added! ✨</h1>
        <p>Check out the latest addition to our portfolio</p>
      </div>{image_block}
      <div class="content">
        <span class="badge">{category}</span>
        <h2 class="title">{title}</h2>
        <p class="description">{description}</p>
        <a href="{link}" class="btn">View Project Details</a>
        <div class="divider"></div>
        <p style="text-align: center; color: #6b7280; margin: 0;">Have questions? Reply to this email!</p>
      </div>
      <div class="footer">
        <p>© {year} ProjectsSuite. All rights reserved.</p>
        <p>You received this email because you are subscribed to new project alerts.</p>
      </div>
    </div>
  </body>
</html>
"#,
        style = ALERT_STYLE,
        image_block = image_block,
        category = escape_html(&alert.category),
        title = title,
        description = escape_html(&alert.description),
        link = escape_html(link),
        year = year,
    );
    let text = format!(
        r#"New Project Alert: {title} 🚀

We've just added a new project to ProjectsSuite!

Title: {title}
Category: {category}

{description}

View Project: {link}

© {year} ProjectsSuite
"#,
        title = alert.title,
        category = alert.category,
        description = alert.description,
        link = link,
        year = year,
    );

    EmailContent {
        sender_name: String::from(ALERT_SENDER_NAME),
        subject: format!("New Project Alert: {} 🚀", alert.title),
        html,
        text,
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for char in value.chars() {
        match char {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(char),
        }
    }

    escaped
}
