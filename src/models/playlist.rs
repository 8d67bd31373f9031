//! Playlist model

use serde::{Deserialize, Serialize};

use super::StoredTrack;

/// Row of the `playlists` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
}

/// Insert payload for a new playlist
#[derive(Debug, Clone, Serialize)]
pub struct NewPlaylist {
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update of a playlist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PlaylistUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Row of the `playlist_tracks` join table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub playlist_id: String,
    pub track_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
}

/// Join row with the referenced track embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub track_id: String,
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub tracks: Option<StoredTrack>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_update_serializes_only_set_fields() {
        let update = PlaylistUpdate {
            name: Some("Road trip".into()),
            description: None,
        };
        assert!(!update.is_empty());
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Road trip" }));

        assert!(PlaylistUpdate::default().is_empty());
    }

    #[test]
    fn test_playlist_entry_with_embedded_track() {
        let raw = serde_json::json!({
            "track_id": "t1",
            "added_at": "2024-01-02T00:00:00Z",
            "tracks": {
                "id": "t1",
                "user_id": "u1",
                "dropbox_id": "/a.mp3",
                "title": "A",
                "encrypted_key": "",
                "iv": "",
                "created_at": "2024-01-01T00:00:00Z"
            }
        });
        let entry: PlaylistEntry = serde_json::from_value(raw).unwrap();
        let track = entry.tracks.unwrap();
        assert_eq!(track.dropbox_id, "/a.mp3");
        assert_eq!(track.title.as_deref(), Some("A"));
        assert!(track.artist.is_none());
    }
}
