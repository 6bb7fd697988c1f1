//! Outbound mail: SMTP via lettre for booking confirmations.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::config::MailConfig;
use crate::error::MailError;

/// Port that speaks TLS from the first byte; everything else uses STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Anything that can deliver an `OutgoingMail`.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// SMTP mailer. Each send opens a fresh connection.
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, MailError> {
        let from = self
            .config
            .from_address
            .parse()
            .map_err(|e| MailError::InvalidAddress {
                address: self.config.from_address.clone(),
                reason: format!("{e}"),
            })?;
        let to = mail.to.parse().map_err(|e| MailError::InvalidAddress {
            address: mail.to.clone(),
            reason: format!("{e}"),
        })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.as_str())
            .body(mail.body.clone())
            .map_err(|e| MailError::Send(format!("Failed to build email: {e}")))
    }

    fn transport(&self) -> Result<SmtpTransport, MailError> {
        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.expose_secret().to_string(),
        );
        let builder = if self.config.smtp_port == IMPLICIT_TLS_PORT {
            SmtpTransport::relay(&self.config.smtp_host)
        } else {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
        }
        .map_err(|e| MailError::Send(format!("SMTP relay error: {e}")))?;

        Ok(builder
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = self.build_message(mail)?;
        let transport = self.transport()?;

        tracing::info!(
            from = %self.config.from_address,
            to = %mail.to,
            host = %self.config.smtp_host,
            port = self.config.smtp_port,
            "Sending email"
        );

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| MailError::Send(format!("mail task failed: {e}")))?
            .map_err(classify_smtp_error)?;

        tracing::info!(to = %mail.to, "Email sent");
        Ok(())
    }
}

fn classify_smtp_error(e: lettre::transport::smtp::Error) -> MailError {
    let status = e.status().map(|code| code.to_string());
    let connection_level = e.is_timeout() || (!e.is_response() && !e.is_client());
    classify(status.as_deref(), connection_level, e.to_string())
}

/// Map an SMTP failure onto the error taxonomy.
///
/// 530/534/535 are the authentication reply codes; failures with no server
/// reply at all mean the connection dropped or never came up.
fn classify(status: Option<&str>, connection_level: bool, message: String) -> MailError {
    match status {
        Some("530" | "534" | "535") => MailError::Authentication(message),
        None if connection_level => MailError::Disconnected(message),
        _ => MailError::Send(message),
    }
}
