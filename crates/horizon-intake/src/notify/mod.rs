//! Confirmation e-mail rendering and the outbound mail seam.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload accepted by `POST /api/send-email` and produced by the submission
/// workflow on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub target_job: String,
    pub availability: String,
}

/// A fully rendered message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Transactional e-mail provider seam.
pub trait MailTransport: Send + Sync {
    fn send(&self, message: &OutboundEmail) -> Result<(), MailError>;
}

/// Error enumeration for mail dispatch.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Email service not configured")]
    NotConfigured,
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

const SUBJECT: &str = "Application Confirmation - Thank You for Applying!";

/// Render the applicant confirmation message in both HTML and plain text.
pub fn render_confirmation(
    request: &ConfirmationRequest,
    from: &str,
    sent_at: DateTime<Utc>,
) -> OutboundEmail {
    OutboundEmail {
        from: from.to_string(),
        to: request.email.clone(),
        subject: SUBJECT.to_string(),
        html: render_html(request, sent_at),
        text: render_text(request, sent_at),
    }
}

fn render_html(request: &ConfirmationRequest, sent_at: DateTime<Utc>) -> String {
    let date = sent_at.format("%B %-d, %Y");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Application Confirmation</title>
</head>
<body style="font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="background-color: white; padding: 30px; border-radius: 10px;">
    <h1 style="color: #2563eb; text-align: center;">Application Received!</h1>
    <p>Dear {first_name} {last_name},</p>
    <p>Thank you for your interest in joining Horizon Talents! We have successfully received your application and wanted to confirm the details with you.</p>
    <div style="background-color: #eff6ff; padding: 15px; border-left: 4px solid #2563eb; margin: 20px 0;">
      <h3 style="margin-top: 0; color: #2563eb;">Application Summary</h3>
      <p><strong>Position Applied For:</strong> {target_job}</p>
      <p><strong>Availability:</strong> {availability}</p>
      <p><strong>Application Date:</strong> {date}</p>
    </div>
    <h3>What's Next?</h3>
    <ul>
      <li>Our recruitment team will review your application within 3-5 business days</li>
      <li>If your profile matches our requirements, we'll contact you for the next steps</li>
      <li>You'll receive updates via email at this address</li>
    </ul>
    <p><strong>Important:</strong> Please keep this email for your records. If you have any questions, feel free to reply to this email.</p>
    <p style="color: #6b7280; font-size: 14px; text-align: center;">Thank you for choosing us for your career journey!<br><strong>HR Team</strong><br>Horizon Talents</p>
  </div>
</body>
</html>"#,
        first_name = request.first_name,
        last_name = request.last_name,
        target_job = request.target_job,
        availability = request.availability,
        date = date,
    )
}

fn render_text(request: &ConfirmationRequest, sent_at: DateTime<Utc>) -> String {
    format!(
        "Application Confirmation\n\n\
         Dear {first_name} {last_name},\n\n\
         Thank you for your interest in joining Horizon Talents! We have successfully received your application.\n\n\
         APPLICATION SUMMARY:\n\
         - Position Applied For: {target_job}\n\
         - Availability: {availability}\n\
         - Application Date: {date}\n\n\
         WHAT'S NEXT?\n\
         - Our recruitment team will review your application within 3-5 business days\n\
         - If your profile matches our requirements, we'll contact you for the next steps\n\
         - You'll receive updates via email at this address\n\n\
         Please keep this email for your records. If you have any questions, feel free to reply to this email.\n\n\
         Thank you for choosing us for your career journey!\n\n\
         HR Team\n\
         Horizon Talents",
        first_name = request.first_name,
        last_name = request.last_name,
        target_job = request.target_job,
        availability = request.availability,
        date = sent_at.format("%Y-%m-%d"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> ConfirmationRequest {
        ConfirmationRequest {
            first_name: "Ava".to_string(),
            last_name: "Haddad".to_string(),
            email: "ava@example.com".to_string(),
            target_job: "developer".to_string(),
            availability: "0-1 months".to_string(),
        }
    }

    #[test]
    fn renders_both_bodies_with_summary() {
        let sent_at = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();
        let email = render_confirmation(&request(), "careers@horizontalents.example", sent_at);

        assert_eq!(email.to, "ava@example.com");
        assert_eq!(email.subject, SUBJECT);
        assert!(email.html.contains("Dear Ava Haddad"));
        assert!(email.html.contains("Position Applied For:</strong> developer"));
        assert!(email.text.contains("- Availability: 0-1 months"));
        assert!(email.text.contains("Application Date: 2026-08-29"));
    }

    #[test]
    fn request_uses_camel_case_wire_names() {
        let parsed: ConfirmationRequest = serde_json::from_str(
            r#"{"firstName":"Ava","lastName":"Haddad","email":"ava@example.com","targetJob":"qa","availability":"1-3 months"}"#,
        )
        .expect("payload parses");
        assert_eq!(parsed.target_job, "qa");
    }
}
