//! Metadata cache - parsed tags keyed by user and track

use dashmap::DashMap;

use crate::models::AudioMetadata;

/// Unbounded cache of parsed tag data.
///
/// Entries are never evicted; a track's tags are parsed at most once per
/// process for each user.
#[derive(Default)]
pub struct MetadataStore {
    entries: DashMap<(String, String), AudioMetadata>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str, track_id: &str) -> Option<AudioMetadata> {
        self.entries
            .get(&(user_id.to_string(), track_id.to_string()))
            .map(|m| m.clone())
    }

    pub fn contains(&self, user_id: &str, track_id: &str) -> bool {
        self.entries
            .contains_key(&(user_id.to_string(), track_id.to_string()))
    }

    pub fn insert(&self, user_id: &str, track_id: &str, metadata: AudioMetadata) {
        self.entries
            .insert((user_id.to_string(), track_id.to_string()), metadata);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_scoped_per_user() {
        let store = MetadataStore::new();
        assert!(store.is_empty());

        store.insert("u1", "/a.mp3", AudioMetadata::fallback("a.mp3"));

        assert!(store.get("u1", "/a.mp3").is_some());
        assert!(store.get("u2", "/a.mp3").is_none());
        assert!(store.contains("u1", "/a.mp3"));
        assert!(!store.contains("u2", "/a.mp3"));
        assert_eq!(store.len(), 1);
    }
}
