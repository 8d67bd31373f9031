//! Tag extraction for Dropbox tracks
//!
//! Audio is downloaded through a temporary link issued by Dropbox for the
//! track's path and parsed in memory with lofty. Results, including the
//! defaults used on failure, are cached per user so a file is only
//! downloaded once.

use std::io::Cursor;
use std::time::Duration;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use lofty::file::FileType;
use lofty::picture::{MimeType, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::MetadataSettings;
use crate::models::{AudioMetadata, Picture, Track, FRONT_COVER, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use crate::plugins::DropboxClient;
use crate::stores::MetadataStore;

pub const LOAD_ERROR: &str =
    "Failed to load track data. Please check your internet connection and try again.";
pub const PARSE_ERROR: &str =
    "Failed to read track information. The file might be corrupted or in an unsupported format.";

/// Metadata for one track, with the user-facing error when defaults were used
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataOutcome {
    pub metadata: AudioMetadata,
    pub error: Option<String>,
}

/// Label for an embedded picture's role, front cover when unspecified
fn picture_kind(pic_type: PictureType) -> &'static str {
    match pic_type {
        PictureType::Other => "Other",
        PictureType::Icon => "32x32 pixels 'file icon' (PNG only)",
        PictureType::OtherIcon => "Other file icon",
        PictureType::CoverFront => "Cover (front)",
        PictureType::CoverBack => "Cover (back)",
        PictureType::Leaflet => "Leaflet page",
        PictureType::Media => "Media (e.g. label side of CD)",
        PictureType::LeadArtist => "Lead artist/lead performer/soloist",
        PictureType::Artist => "Artist/performer",
        PictureType::Conductor => "Conductor",
        PictureType::Band => "Band/Orchestra",
        PictureType::Composer => "Composer",
        PictureType::Lyricist => "Lyricist/text writer",
        PictureType::RecordingLocation => "Recording Location",
        PictureType::DuringRecording => "During recording",
        PictureType::DuringPerformance => "During performance",
        PictureType::ScreenCapture => "Movie/video screen capture",
        PictureType::BrightFish => "A bright coloured fish",
        PictureType::Illustration => "Illustration",
        PictureType::BandLogo => "Band/artist logotype",
        PictureType::PublisherLogo => "Publisher/Studio logotype",
        _ => FRONT_COVER,
    }
}

/// Parse tags from an in-memory audio file.
///
/// `ext` is used as a format hint when the content cannot be identified.
pub fn read_tags(bytes: Vec<u8>, track_name: &str, ext: Option<&str>) -> lofty::error::Result<AudioMetadata> {
    let mut probe = Probe::new(Cursor::new(bytes)).guess_file_type()?;
    if probe.file_type().is_none() {
        if let Some(file_type) = ext.and_then(FileType::from_ext) {
            probe = probe.set_file_type(file_type);
        }
    }

    let tagged_file = probe.read()?;
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    let title = tag
        .and_then(|t| t.title().map(|s| s.to_string()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| track_name.to_string());

    let artist = tag
        .and_then(|t| t.artist().map(|s| s.to_string()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    let album = tag
        .and_then(|t| t.album().map(|s| s.to_string()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_ALBUM.to_string());

    // date tags often carry a full date, keep the leading year
    let year = tag
        .and_then(|t| {
            [ItemKey::Year, ItemKey::RecordingDate, ItemKey::OriginalReleaseDate]
                .iter()
                .filter_map(|key| t.get_string(key))
                .map(str::trim)
                .find_map(|s| s.get(..4).filter(|y| y.chars().all(|c| c.is_ascii_digit())))
                .map(str::to_string)
        })
        .unwrap_or_default();

    let genre = tag
        .map(|t| {
            t.get_strings(&ItemKey::Genre)
                .filter(|g| !g.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let picture = tag
        .and_then(|t| t.pictures().first())
        .map(|pic| {
            let mime = match pic.mime_type() {
                Some(MimeType::Png) => "image/png",
                Some(MimeType::Jpeg) | None => "image/jpeg",
                Some(MimeType::Tiff) => "image/tiff",
                Some(MimeType::Bmp) => "image/bmp",
                Some(MimeType::Gif) => "image/gif",
                Some(MimeType::Unknown(other)) => other.as_str(),
                Some(_) => "application/octet-stream",
            };

            let mut picture = Picture::from_bytes(pic.data(), mime);
            picture.kind = picture_kind(pic.pic_type()).to_string();
            if let Some(desc) = pic.description().filter(|d| !d.is_empty()) {
                picture.description = desc.to_string();
            }
            picture
        })
        .unwrap_or_else(Picture::placeholder);

    Ok(AudioMetadata {
        title,
        artist,
        album,
        year,
        genre,
        picture,
    })
}

/// Metadata functions
pub struct MetadataLib;

impl MetadataLib {
    async fn download(http: &Client, url: &str, max_bytes: u64) -> Result<Vec<u8>, String> {
        if url.is_empty() {
            return Err("track has no temporary link".to_string());
        }

        let mut resp = http.get(url).send().await.map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("download returned {}", resp.status()));
        }

        let too_large = || format!("file is larger than {} bytes", max_bytes);
        if resp.content_length().is_some_and(|len| len > max_bytes) {
            return Err(too_large());
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(|e| e.to_string())? {
            if (bytes.len() + chunk.len()) as u64 > max_bytes {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    /// Replace the temporary links of uncached tracks with links issued by
    /// Dropbox for their paths.
    ///
    /// Links sent by clients are never fetched. A track whose link cannot be
    /// issued is left without one and reports the load error.
    pub async fn with_fresh_links(
        client: &DropboxClient,
        access_token: &str,
        cache: &MetadataStore,
        user_id: &str,
        tracks: Vec<Track>,
    ) -> Vec<Track> {
        let concurrency = client.settings().link_concurrency.max(1);

        stream::iter(tracks)
            .map(|mut track| async move {
                if cache.contains(user_id, &track.id) {
                    return track;
                }
                track.temporary_link = match client.get_temporary_link(access_token, &track.path).await {
                    Ok(link) => link,
                    Err(e) => {
                        warn!("Failed to get temporary link for {}: {}", track.path, e);
                        String::new()
                    }
                };
                track
            })
            .buffered(concurrency)
            .collect()
            .await
    }

    /// Tags for a track, from the cache when already parsed
    pub async fn get_metadata(
        http: &Client,
        cache: &MetadataStore,
        settings: &MetadataSettings,
        user_id: &str,
        track: &Track,
    ) -> MetadataOutcome {
        if let Some(metadata) = cache.get(user_id, &track.id) {
            return MetadataOutcome {
                metadata,
                error: None,
            };
        }

        let parsed = match Self::download(http, &track.temporary_link, settings.max_download_bytes).await {
            Ok(bytes) => {
                let name = track.name.clone();
                let ext = track.extension();
                let result = tokio::task::spawn_blocking(move || {
                    read_tags(bytes, &name, ext.as_deref()).map_err(|e| e.to_string())
                })
                .await
                .unwrap_or_else(|e| Err(e.to_string()));

                result.map_err(|e| {
                    error!("Error parsing metadata for {}: {}", track.name, e);
                    PARSE_ERROR
                })
            }
            Err(e) => {
                error!("Failed to fetch audio data for {}: {}", track.name, e);
                Err(LOAD_ERROR)
            }
        };

        let (metadata, error) = match parsed {
            Ok(metadata) => (metadata, None),
            Err(message) => (AudioMetadata::fallback(&track.name), Some(message.to_string())),
        };

        cache.insert(user_id, &track.id, metadata.clone());
        MetadataOutcome { metadata, error }
    }

    /// Tags for many tracks, `batch_size` at a time with a pause between batches
    pub async fn process_metadata(
        http: &Client,
        cache: &MetadataStore,
        settings: &MetadataSettings,
        user_id: &str,
        tracks: &[Track],
    ) -> Vec<MetadataOutcome> {
        let batches: Vec<&[Track]> = tracks.chunks(settings.batch_size.max(1)).collect();
        let mut results = Vec::with_capacity(tracks.len());

        for (i, batch) in batches.iter().enumerate() {
            debug!("Processing metadata batch {}/{}", i + 1, batches.len());
            let outcomes = join_all(
                batch
                    .iter()
                    .map(|track| Self::get_metadata(http, cache, settings, user_id, track)),
            )
            .await;
            results.extend(outcomes);

            if i + 1 < batches.len() {
                tokio::time::sleep(Duration::from_millis(settings.batch_delay_ms)).await;
            }
        }

        results
    }
}
