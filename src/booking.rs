//! Booking confirmation: e-mail the student, then record the booking.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MailError;
use crate::mail::{Mailer, OutgoingMail};
use crate::store::DocumentStore;

pub const CONFIRMATION_SUBJECT: &str = "Manobal: Your Therapy Session Booking Confirmation";

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_USER_NAME: &str = "Client";

/// Booking details posted by the front-end after checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub therapist_name: Option<String>,
    #[serde(default)]
    pub session_type: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub user_name: Option<String>,
}

impl BookingRequest {
    /// The recipient, if present and non-blank.
    pub fn recipient(&self) -> Option<&str> {
        self.user_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    fn field(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    fn user_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(DEFAULT_USER_NAME)
    }

    fn price_text(&self) -> String {
        self.price
            .map(|p| p.normalize().to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

/// Persisted booking. Rating fields are only ever initialised here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub booking_id: String,
    pub user_email: String,
    pub therapist_name: String,
    pub session_type: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub price: Option<Decimal>,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub has_rated: bool,
    pub rating_id: Option<String>,
    pub rating_reminder_sent: bool,
    pub last_reminder_date: Option<DateTime<Utc>>,
}

impl BookingRecord {
    /// Build a fresh record for a request whose recipient is `user_email`.
    pub fn from_request(request: &BookingRequest, user_email: &str) -> Self {
        let now = Utc::now();
        Self {
            booking_id: Uuid::new_v4().to_string(),
            user_email: user_email.to_string(),
            therapist_name: BookingRequest::field(&request.therapist_name).to_string(),
            session_type: BookingRequest::field(&request.session_type).to_string(),
            date: BookingRequest::field(&request.date).to_string(),
            time: BookingRequest::field(&request.time).to_string(),
            duration: BookingRequest::field(&request.duration).to_string(),
            price: request.price,
            user_name: request.user_name().to_string(),
            created_at: now,
            updated_at: now,
            has_rated: false,
            rating_id: None,
            rating_reminder_sent: false,
            last_reminder_date: None,
        }
    }
}

/// Subject and plain-text body of the confirmation mail.
pub fn confirmation_email(request: &BookingRequest) -> (String, String) {
    let body = format!(
        "Dear {user_name},\n\
         \n\
         Your therapy session has been successfully booked with Manobal!\n\
         \n\
         Here are your session details:\n\
         Therapist: {therapist}\n\
         Session Type: {session_type}\n\
         Date: {date}\n\
         Time: {time}\n\
         Duration: {duration}\n\
         Total: ${price}\n\
         \n\
         We look forward to supporting you on your journey to mental wellness.\n\
         \n\
         Best regards,\n\
         The Manobal Team\n",
        user_name = request.user_name(),
        therapist = BookingRequest::field(&request.therapist_name),
        session_type = BookingRequest::field(&request.session_type),
        date = BookingRequest::field(&request.date),
        time = BookingRequest::field(&request.time),
        duration = BookingRequest::field(&request.duration),
        price = request.price_text(),
    );
    (CONFIRMATION_SUBJECT.to_string(), body)
}

/// Error text returned to the client when the confirmation mail fails.
pub fn failure_message(err: &MailError) -> String {
    match err {
        MailError::Authentication(detail) => {
            format!("Failed to send confirmation email (authentication error): {detail}")
        }
        MailError::Disconnected(detail) => {
            format!("Failed to send confirmation email (server disconnected): {detail}")
        }
        other => format!("Failed to send confirmation email: {other}"),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("User email not provided for booking confirmation")]
    MissingEmail,

    #[error("{}", failure_message(.0))]
    Mail(#[from] MailError),
}

/// Result of a successful confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub booking_id: String,
    /// False when the mail went out but the record could not be stored.
    pub recorded: bool,
}

pub struct BookingService {
    mailer: Option<Arc<dyn Mailer>>,
    store: Arc<dyn DocumentStore>,
}

impl BookingService {
    /// `mailer` is `None` when SMTP is not configured; every confirm then fails.
    pub fn new(mailer: Option<Arc<dyn Mailer>>, store: Arc<dyn DocumentStore>) -> Self {
        Self { mailer, store }
    }

    pub async fn confirm(&self, request: &BookingRequest) -> Result<Confirmation, BookingError> {
        let recipient = request.recipient().ok_or(BookingError::MissingEmail)?;
        let mailer = self.mailer.as_ref().ok_or(MailError::NotConfigured)?;

        let (subject, body) = confirmation_email(request);
        let mail = OutgoingMail {
            to: recipient.to_string(),
            subject,
            body,
        };

        if let Err(e) = mailer.send(&mail).await {
            tracing::error!(to = %recipient, error = %e, "Confirmation email failed");
            return Err(e.into());
        }
        tracing::info!(to = %recipient, "Confirmation email sent");

        let record = BookingRecord::from_request(request, recipient);
        let recorded = match self.store.insert_booking(&record).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    booking_id = %record.booking_id,
                    error = %e,
                    "Booking email sent but record was not stored"
                );
                false
            }
        };

        Ok(Confirmation {
            booking_id: record.booking_id,
            recorded,
        })
    }
}
