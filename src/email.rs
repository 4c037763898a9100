//! Email notifications for new bookings and reviews.
//!
//! Sends HTML notifications to the site owner through the Resend HTTP API.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::{Booking, Testimonial};

/// Resend's send-email endpoint.
pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Email configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Resend API key. Notifications are disabled without it.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// From email address.
    pub from_email: String,
    /// From display name.
    pub from_name: String,
    /// Address that receives notifications.
    pub to_email: String,
    /// API endpoint, overridable for testing.
    pub endpoint: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_email: "noreply@zentraholdings.com".to_string(),
            from_name: "Zentra Holdings".to_string(),
            to_email: "admin@zentraholdings.com".to_string(),
            endpoint: RESEND_ENDPOINT.to_string(),
        }
    }
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("to_email", &self.to_email)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Errors that can occur when sending email.
#[derive(Debug)]
pub enum EmailError {
    /// Email sending is not configured.
    NotConfigured,
    /// The request could not be sent.
    TransportError(String),
    /// The email API rejected the request.
    ApiError { status: u16, body: String },
    /// The email API answered with something other than a message id.
    ResponseError(String),
    /// The background send task panicked or was aborted.
    TaskFailed(String),
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailError::NotConfigured => write!(f, "Email sending is not configured"),
            EmailError::TransportError(e) => write!(f, "Failed to send email: {}", e),
            EmailError::ApiError { status, body } => {
                write!(f, "Email API error: {} {}", status, body)
            }
            EmailError::ResponseError(e) => write!(f, "Unexpected email API response: {}", e),
            EmailError::TaskFailed(e) => write!(f, "Email task failed: {}", e),
        }
    }
}

impl std::error::Error for EmailError {}

/// A message accepted by the email API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentEmail {
    pub id: String,
}

/// Escapes text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn submitted_at() -> String {
    Utc::now().format("%B %-d, %Y %H:%M UTC").to_string()
}

fn booking_html(booking: &Booking, submitted: &str) -> String {
    let message = booking
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .map(|m| format!("<p><strong>Message:</strong> {}</p>", escape_html(m)))
        .unwrap_or_default();

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #006400;">New Service Booking Request</h2>
  <div style="background-color: #f9f9f9; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <h3 style="color: #333; margin-top: 0;">Customer Information</h3>
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> {email}</p>
    <p><strong>Phone:</strong> {phone}</p>
    <p><strong>Address:</strong> {address}</p>
  </div>
  <div style="background-color: #f0f8f0; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <h3 style="color: #333; margin-top: 0;">Service Details</h3>
    <p><strong>Service:</strong> {service}</p>
    <p><strong>Preferred Date:</strong> {date}</p>
    <p><strong>Preferred Time:</strong> {time}</p>
    {message}
  </div>
  <div style="background-color: #e8f4f8; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <p style="margin: 0;"><strong>Submitted:</strong> {submitted}</p>
  </div>
  <p style="color: #666; font-size: 14px;">
    Please respond to this booking request as soon as possible to provide excellent customer service.
  </p>
</div>"#,
        name = escape_html(&booking.name),
        email = escape_html(&booking.email),
        phone = escape_html(&booking.phone),
        address = escape_html(&booking.address),
        service = escape_html(&booking.service),
        date = escape_html(&booking.preferred_date_label()),
        time = escape_html(&booking.preferred_time),
        message = message,
        submitted = submitted,
    )
}

fn review_html(review: &Testimonial, submitted: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #006400;">New Customer Review</h2>
  <div style="background-color: #f9f9f9; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <h3 style="color: #333; margin-top: 0;">Review Details</h3>
    <p><strong>Customer:</strong> {customer}</p>
    <p><strong>Rating:</strong> {rating}/5 stars</p>
    <div style="margin: 15px 0;">
      <strong>Review:</strong>
      <div style="background-color: white; padding: 15px; border-radius: 5px; margin-top: 5px;">
        &quot;{text}&quot;
      </div>
    </div>
  </div>
  <div style="background-color: #e8f4f8; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <p style="margin: 0;"><strong>Submitted:</strong> {submitted}</p>
  </div>
  <p style="color: #666; font-size: 14px;">
    Please review and approve this testimonial in your admin panel.
  </p>
</div>"#,
        customer = escape_html(&review.client_name),
        rating = review.rating,
        text = escape_html(&review.review_text),
        submitted = submitted,
    )
}

/// Sends owner notifications through Resend.
#[derive(Clone)]
pub struct EmailSender {
    config: EmailConfig,
    http: reqwest::Client,
}

impl EmailSender {
    /// Creates a new email sender with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Notifies the owner about a new booking request.
    pub async fn send_booking_notification(&self, booking: &Booking) -> Result<SentEmail, EmailError> {
        let html = booking_html(booking, &submitted_at());
        let sent = self.send("New Service Booking Request", html).await?;
        tracing::info!("Booking notification sent: {}", sent.id);
        Ok(sent)
    }

    /// Notifies the owner about a new review awaiting approval.
    pub async fn send_review_notification(
        &self,
        review: &Testimonial,
    ) -> Result<SentEmail, EmailError> {
        let html = review_html(review, &submitted_at());
        let sent = self.send("New Customer Review Submitted", html).await?;
        tracing::info!("Review notification sent: {}", sent.id);
        Ok(sent)
    }

    async fn send(&self, subject: &str, html: String) -> Result<SentEmail, EmailError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => {
                tracing::warn!("Resend API key not configured. Skipping email notification.");
                return Err(EmailError::NotConfigured);
            }
        };

        let body = json!({
            "from": format!("{} <{}>", self.config.from_name, self.config.from_email),
            "to": [self.config.to_email],
            "subject": subject,
            "html": html,
        });

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::TransportError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<SentEmail>()
            .await
            .map_err(|e| EmailError::ResponseError(e.to_string()))
    }
}

impl std::fmt::Debug for EmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSender")
            .field("endpoint", &self.config.endpoint)
            .field("from_email", &self.config.from_email)
            .field("to_email", &self.config.to_email)
            .finish()
    }
}
