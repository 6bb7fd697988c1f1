//! Firestore REST backend.
//!
//! Documents are written through the public `documents` API with typed
//! `fields`; the caller-chosen id is passed as `documentId` so the booking id
//! and the Firestore document name agree.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::traits::{BOOKINGS_COLLECTION, COMMENTS_COLLECTION, CommentRecord, DocumentStore};
use crate::booking::BookingRecord;
use crate::config::FirestoreConfig;
use crate::error::StoreError;

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// A single typed Firestore value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum FieldValue {
    StringValue(String),
    BooleanValue(bool),
    TimestampValue(DateTime<Utc>),
    NullValue(()),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::StringValue(s.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::BooleanValue(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::TimestampValue(t)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::NullValue(()))
    }
}

type Fields = BTreeMap<String, FieldValue>;

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing)]
    name: Option<String>,
    fields: Fields,
}

fn booking_fields(r: &BookingRecord) -> Fields {
    let price = r.price.map(|p| p.to_string());
    let mut f = Fields::new();
    f.insert("bookingId".into(), r.booking_id.as_str().into());
    f.insert("userEmail".into(), r.user_email.as_str().into());
    f.insert("therapistName".into(), r.therapist_name.as_str().into());
    f.insert("sessionType".into(), r.session_type.as_str().into());
    f.insert("date".into(), r.date.as_str().into());
    f.insert("time".into(), r.time.as_str().into());
    f.insert("duration".into(), r.duration.as_str().into());
    f.insert("price".into(), price.as_deref().into());
    f.insert("userName".into(), r.user_name.as_str().into());
    f.insert("createdAt".into(), r.created_at.into());
    f.insert("updatedAt".into(), r.updated_at.into());
    f.insert("hasRated".into(), r.has_rated.into());
    f.insert("ratingId".into(), r.rating_id.as_deref().into());
    f.insert("ratingReminderSent".into(), r.rating_reminder_sent.into());
    f.insert("lastReminderDate".into(), r.last_reminder_date.into());
    f
}

fn comment_fields(c: &CommentRecord) -> Fields {
    let mut f = Fields::new();
    f.insert("resourceId".into(), c.resource_id.as_str().into());
    f.insert("userId".into(), c.user_id.as_str().into());
    f.insert("userDisplayName".into(), c.user_display_name.as_str().into());
    f.insert("userPhotoURL".into(), c.user_photo_url.as_deref().into());
    f.insert("content".into(), c.content.as_str().into());
    f.insert("createdAt".into(), c.created_at.into());
    f
}

struct FieldReader<'a> {
    fields: &'a Fields,
}

impl FieldReader<'_> {
    fn missing(key: &str) -> StoreError {
        StoreError::Serialization(format!("field {key} missing or mistyped"))
    }

    fn string(&self, key: &str) -> Result<String, StoreError> {
        self.opt_string(key)?.ok_or_else(|| Self::missing(key))
    }

    fn opt_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.fields.get(key) {
            Some(FieldValue::StringValue(s)) => Ok(Some(s.clone())),
            Some(FieldValue::NullValue(())) | None => Ok(None),
            Some(_) => Err(Self::missing(key)),
        }
    }

    fn boolean(&self, key: &str) -> Result<bool, StoreError> {
        match self.fields.get(key) {
            Some(FieldValue::BooleanValue(b)) => Ok(*b),
            _ => Err(Self::missing(key)),
        }
    }

    fn timestamp(&self, key: &str) -> Result<DateTime<Utc>, StoreError> {
        self.opt_timestamp(key)?.ok_or_else(|| Self::missing(key))
    }

    fn opt_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        match self.fields.get(key) {
            Some(FieldValue::TimestampValue(t)) => Ok(Some(*t)),
            Some(FieldValue::NullValue(())) | None => Ok(None),
            Some(_) => Err(Self::missing(key)),
        }
    }
}

fn booking_from_fields(fields: &Fields) -> Result<BookingRecord, StoreError> {
    let r = FieldReader { fields };
    let price = r
        .opt_string("price")?
        .map(|p| p.parse::<Decimal>())
        .transpose()
        .map_err(|e| StoreError::Serialization(format!("price: {e}")))?;

    Ok(BookingRecord {
        booking_id: r.string("bookingId")?,
        user_email: r.string("userEmail")?,
        therapist_name: r.string("therapistName")?,
        session_type: r.string("sessionType")?,
        date: r.string("date")?,
        time: r.string("time")?,
        duration: r.string("duration")?,
        price,
        user_name: r.string("userName")?,
        created_at: r.timestamp("createdAt")?,
        updated_at: r.timestamp("updatedAt")?,
        has_rated: r.boolean("hasRated")?,
        rating_id: r.opt_string("ratingId")?,
        rating_reminder_sent: r.boolean("ratingReminderSent")?,
        last_reminder_date: r.opt_timestamp("lastReminderDate")?,
    })
}

/// Firestore-backed store authenticated with a bearer access token.
pub struct FirestoreStore {
    client: reqwest::Client,
    documents_url: String,
    access_token: SecretString,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig) -> Self {
        let base = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        Self {
            client: reqwest::Client::new(),
            documents_url: format!(
                "{base}/projects/{}/databases/(default)/documents",
                config.project_id
            ),
            access_token: config.access_token.clone(),
        }
    }

    async fn create(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = format!("{}/{collection}", self.documents_url);
        let response = self
            .client
            .post(&url)
            .query(&[("documentId", id)])
            .bearer_auth(self.access_token.expose_secret())
            .json(&Document { name: None, fields })
            .send()
            .await
            .map_err(|e| StoreError::Request {
                collection: collection.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                collection: collection.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(collection, id, "Document created");
        Ok(())
    }

    /// URL of one document, with `id` encoded as a single path segment.
    fn document_url(&self, collection: &str, id: &str) -> Result<reqwest::Url, StoreError> {
        if !is_document_id(id) {
            return Err(StoreError::NotFound {
                entity: "document".to_string(),
                id: id.to_string(),
            });
        }
        let mut url = reqwest::Url::parse(&self.documents_url).map_err(|e| StoreError::Request {
            collection: collection.to_string(),
            reason: e.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|()| StoreError::Request {
                collection: collection.to_string(),
                reason: "base URL cannot carry a path".to_string(),
            })?
            .push(collection)
            .push(id);
        Ok(url)
    }
}

/// Firestore document ids: non-empty, no `/`, not `.` or `..`, at most 1500 bytes.
fn is_document_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 1500 && !id.contains('/') && id != "." && id != ".."
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn insert_booking(&self, record: &BookingRecord) -> Result<(), StoreError> {
        self.create(BOOKINGS_COLLECTION, &record.booking_id, booking_fields(record))
            .await
    }

    async fn get_booking(&self, id: &str) -> Result<BookingRecord, StoreError> {
        let url = self.document_url(BOOKINGS_COLLECTION, id)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| StoreError::Request {
                collection: BOOKINGS_COLLECTION.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                entity: "booking".to_string(),
                id: id.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                collection: BOOKINGS_COLLECTION.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let document: Document = response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        booking_from_fields(&document.fields)
    }

    async fn insert_comment(&self, comment: &CommentRecord) -> Result<(), StoreError> {
        self.create(COMMENTS_COLLECTION, &comment.id, comment_fields(comment))
            .await
    }
}
