//! Document store interface for bookings and community comments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::BookingRecord;
use crate::error::StoreError;

pub const BOOKINGS_COLLECTION: &str = "bookings";
pub const COMMENTS_COLLECTION: &str = "comments";

/// A comment on a community resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: String,
    pub resource_id: String,
    pub user_id: String,
    pub user_display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "userPhotoURL")]
    pub user_photo_url: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl CommentRecord {
    pub fn new(
        resource_id: impl Into<String>,
        user_id: impl Into<String>,
        user_display_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            resource_id: resource_id.into(),
            user_id: user_id.into(),
            user_display_name: user_display_name.into(),
            user_photo_url: None,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Backend-agnostic persistence for the records this service writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // ── Bookings ────────────────────────────────────────────────────

    /// Insert a new booking under its `booking_id`.
    async fn insert_booking(&self, record: &BookingRecord) -> Result<(), StoreError>;

    /// Fetch a booking by id.
    async fn get_booking(&self, id: &str) -> Result<BookingRecord, StoreError>;

    // ── Comments ────────────────────────────────────────────────────

    /// Insert a comment under its `id`.
    async fn insert_comment(&self, comment: &CommentRecord) -> Result<(), StoreError>;
}
