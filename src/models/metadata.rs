//! Parsed tag data attached to tracks

use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const FRONT_COVER: &str = "Front Cover";

const PLACEHOLDER_SVG: &str = r##"
    <svg width="200" height="200" viewBox="0 0 200 200" xmlns="http://www.w3.org/2000/svg">
      <rect width="200" height="200" fill="#f3f4f6"/>
      <path d="M100 65c-19.33 0-35 15.67-35 35s15.67 35 35 35 35-15.67 35-35-15.67-35-35-35zm0 60c-13.785 0-25-11.215-25-25s11.215-25 25-25 25 11.215 25 25-11.215 25-25 25z" fill="#9ca3af"/>
      <circle cx="100" cy="100" r="10" fill="#9ca3af"/>
      <path d="M100 40v-10" stroke="#9ca3af" stroke-width="4"/>
      <path d="M100 170v-10" stroke="#9ca3af" stroke-width="4"/>
      <path d="M40 100h-10" stroke="#9ca3af" stroke-width="4"/>
      <path d="M170 100h-10" stroke="#9ca3af" stroke-width="4"/>
    </svg>
  "##;

static PLACEHOLDER_PICTURE: Lazy<Picture> = Lazy::new(|| Picture {
    data: format!(
        "data:image/svg+xml;base64,{}",
        general_purpose::STANDARD.encode(PLACEHOLDER_SVG)
    ),
    format: "image/svg+xml".to_string(),
    kind: FRONT_COVER.to_string(),
    description: "Default Album Art".to_string(),
});

/// Cover art as a data URI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    /// `data:<mime>;base64,<payload>`
    pub data: String,
    pub format: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

impl Picture {
    /// Build a picture from raw image bytes
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        Self {
            data: format!(
                "data:{};base64,{}",
                format,
                general_purpose::STANDARD.encode(bytes)
            ),
            format: format.to_string(),
            kind: FRONT_COVER.to_string(),
            description: "Album Art".to_string(),
        }
    }

    /// The built-in placeholder cover
    pub fn placeholder() -> Self {
        PLACEHOLDER_PICTURE.clone()
    }

    pub fn is_placeholder(&self) -> bool {
        self.data == PLACEHOLDER_PICTURE.data
    }
}

/// Tag data for a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub genre: String,
    pub picture: Picture,
}

impl AudioMetadata {
    /// Metadata used when the file cannot be read
    pub fn fallback(track_name: &str) -> Self {
        Self {
            title: track_name.to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            year: String::new(),
            genre: String::new(),
            picture: Picture::placeholder(),
        }
    }
}
