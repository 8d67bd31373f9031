//! In-memory stores for sessions, play queues and parsed metadata

mod metadata_store;
mod session_store;

pub use metadata_store::MetadataStore;
pub use session_store::SessionStore;
