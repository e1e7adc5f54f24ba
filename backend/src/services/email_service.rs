use crate::config::EmailConfig;
use crate::errors::{ServiceError, ServiceResult};
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::str::FromStr;

pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new EmailService instance
    pub fn new(config: EmailConfig) -> ServiceResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| ServiceError::validation(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, config })
    }

    /// Sends the email-ownership confirmation link to a new or unverified user
    pub async fn send_verification_email(
        &self,
        recipient_email: &str,
        recipient_name: &str,
        verify_url: &str,
    ) -> ServiceResult<()> {
        let subject = "Verify your email address";

        let html_content = self.build_link_html(
            recipient_name,
            "Confirm your email",
            "One more step: confirm this email address belongs to you.",
            "Verify Email",
            verify_url,
        );
        let text_content = self.build_link_text(
            recipient_name,
            "One more step: confirm this email address belongs to you.",
            verify_url,
        );

        self.send_email(recipient_email, subject, &html_content, &text_content)
            .await
    }

    /// Sends a password reset link
    pub async fn send_password_reset_email(
        &self,
        recipient_email: &str,
        recipient_name: &str,
        reset_url: &str,
    ) -> ServiceResult<()> {
        let subject = "Password Reset";

        let html_content = self.build_link_html(
            recipient_name,
            "Reset your password",
            "We received a request to reset your password. If this wasn't you, ignore this email.",
            "Reset Password",
            reset_url,
        );
        let text_content = self.build_link_text(
            recipient_name,
            "We received a request to reset your password. If this wasn't you, ignore this email.",
            reset_url,
        );

        self.send_email(recipient_email, subject, &html_content, &text_content)
            .await
    }

    /// Sends a generic email
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> ServiceResult<()> {
        let from_mailbox = Mailbox::from_str(&format!(
            "{} <{}>",
            self.config.from_name, self.config.from_email
        ))
        .map_err(|e| ServiceError::validation(format!("Invalid from email: {e}")))?;

        let to_mailbox = Mailbox::from_str(to_email)
            .map_err(|e| ServiceError::validation(format!("Invalid recipient email: {e}")))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_content.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_content.to_string()),
                    ),
            )
            .map_err(|e| ServiceError::validation(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| ServiceError::external_service(format!("Failed to send email: {e}")))?;

        Ok(())
    }

    fn build_link_html(
        &self,
        recipient_name: &str,
        heading: &str,
        body: &str,
        button_label: &str,
        url: &str,
    ) -> String {
        format!(
            r#"
            <!DOCTYPE html>
            <html>
            <head>
                <meta charset="UTF-8">
                <title>{}</title>
            </head>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #2c3e50;">{}</h2>

                    <p>Hi {},</p>

                    <p>{}</p>

                    <div style="text-align: center; margin: 30px 0;">
                        <a href="{}"
                           style="background-color: #3498db; color: white; padding: 12px 30px;
                                  text-decoration: none; border-radius: 5px; display: inline-block;">
                            {}
                        </a>
                    </div>

                    <p>Or copy and paste this link into your browser:</p>
                    <p style="word-break: break-all; color: #7f8c8d;">{}</p>
                </div>
            </body>
            </html>
            "#,
            heading, heading, recipient_name, body, url, button_label, url
        )
    }

    fn build_link_text(&self, recipient_name: &str, body: &str, url: &str) -> String {
        format!(
            r#"Hi {},

{}

Open the link below to continue:
{}
            "#,
            recipient_name, body, url
        )
    }
}
