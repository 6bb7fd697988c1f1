//! Persistence layer: Firestore over REST, or an in-memory fallback.

pub mod firestore;
pub mod memory;
pub mod traits;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use traits::{BOOKINGS_COLLECTION, COMMENTS_COLLECTION, CommentRecord, DocumentStore};
