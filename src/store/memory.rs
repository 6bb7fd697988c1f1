//! In-process document store, used when Firestore is not configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{CommentRecord, DocumentStore};
use crate::booking::BookingRecord;
use crate::error::StoreError;

#[derive(Default)]
pub struct MemoryStore {
    bookings: RwLock<HashMap<String, BookingRecord>>,
    comments: RwLock<Vec<CommentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn booking_count(&self) -> usize {
        self.bookings.read().await.len()
    }

    /// Comments on one resource, oldest first.
    pub async fn comments_for(&self, resource_id: &str) -> Vec<CommentRecord> {
        let mut found: Vec<CommentRecord> = self
            .comments
            .read()
            .await
            .iter()
            .filter(|c| c.resource_id == resource_id)
            .cloned()
            .collect();
        found.sort_by_key(|c| c.created_at);
        found
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_booking(&self, record: &BookingRecord) -> Result<(), StoreError> {
        self.bookings
            .write()
            .await
            .insert(record.booking_id.clone(), record.clone());
        Ok(())
    }

    async fn get_booking(&self, id: &str) -> Result<BookingRecord, StoreError> {
        self.bookings
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "booking".to_string(),
                id: id.to_string(),
            })
    }

    async fn insert_comment(&self, comment: &CommentRecord) -> Result<(), StoreError> {
        self.comments.write().await.push(comment.clone());
        Ok(())
    }
}
