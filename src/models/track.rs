//! Track models

use serde::{Deserialize, Serialize};

use super::AudioMetadata;

/// A playable file from the user's Dropbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Dropbox display path, doubles as the identifier
    pub id: String,
    pub name: String,
    pub path: String,
    /// Short-lived download URL
    #[serde(default)]
    pub temporary_link: String,
    #[serde(default)]
    pub encrypted_key: String,
    #[serde(default)]
    pub iv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AudioMetadata>,
}

impl Track {
    pub fn new(path: String, name: String, temporary_link: String) -> Self {
        Self {
            id: path.clone(),
            name,
            path,
            temporary_link,
            encrypted_key: String::new(),
            iv: String::new(),
            metadata: None,
        }
    }

    /// Lowercased file extension, used as a format hint for tag parsing
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.name.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }
}

/// Row of the `tracks` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTrack {
    pub id: String,
    pub user_id: String,
    pub dropbox_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub picture: Option<serde_json::Value>,
    #[serde(default)]
    pub encrypted_key: String,
    #[serde(default)]
    pub iv: String,
    pub created_at: String,
}

/// Insert payload for the `tracks` table
#[derive(Debug, Clone, Serialize)]
pub struct NewStoredTrack {
    pub user_id: String,
    pub dropbox_id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub picture: Option<serde_json::Value>,
    pub encrypted_key: String,
    pub iv: String,
}

impl NewStoredTrack {
    /// Row for a library track, filling tag columns from its metadata
    pub fn from_track(user_id: &str, track: &Track) -> Self {
        let meta = track.metadata.as_ref();
        let non_empty = |s: &String| if s.is_empty() { None } else { Some(s.clone()) };

        Self {
            user_id: user_id.to_string(),
            dropbox_id: track.id.clone(),
            title: meta
                .map(|m| m.title.clone())
                .or_else(|| Some(track.name.clone())),
            artist: meta.map(|m| m.artist.clone()),
            album: meta.map(|m| m.album.clone()),
            year: meta.and_then(|m| non_empty(&m.year)),
            genre: meta.and_then(|m| non_empty(&m.genre)),
            picture: meta
                .filter(|m| !m.picture.is_placeholder())
                .and_then(|m| serde_json::to_value(&m.picture).ok()),
            encrypted_key: track.encrypted_key.clone(),
            iv: track.iv.clone(),
        }
    }
}
