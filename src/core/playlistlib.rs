//! Playlist library functions
//!
//! Every query runs with the caller's token, so ownership is also enforced by
//! row-level security; the explicit `user_id` filters keep "not yours" and
//! "missing" indistinguishable.

use tracing::info;

use crate::db::tables::{PlaylistTable, PlaylistTrackTable, TrackTable};
use crate::db::DbScope;
use crate::errors::{AppError, AppResult};
use crate::models::{
    NewPlaylist, NewStoredTrack, Playlist, PlaylistEntry, PlaylistTrack, PlaylistUpdate, Track,
};
use crate::stores::MetadataStore;

pub const NOT_FOUND: &str = "Playlist not found or not owned by user";

fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND.to_string())
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Playlist library functions
pub struct PlaylistLib;

impl PlaylistLib {
    /// Get all playlists of the user
    pub async fn get_all(db: &DbScope<'_>, user_id: &str) -> AppResult<Vec<Playlist>> {
        PlaylistTable::all(db, user_id).await
    }

    /// Get an owned playlist
    pub async fn get(db: &DbScope<'_>, id: &str, user_id: &str) -> AppResult<Playlist> {
        PlaylistTable::get(db, id, user_id).await?.ok_or_else(not_found)
    }

    /// Create new playlist
    pub async fn create(
        db: &DbScope<'_>,
        user_id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<Playlist> {
        let name = clean(name).filter(|n| !n.is_empty()).ok_or_else(|| {
            AppError::BadRequest("Playlist name is required".to_string())
        })?;

        let playlist = NewPlaylist {
            user_id: user_id.to_string(),
            name,
            description,
        };

        let created = PlaylistTable::insert(db, &playlist)
            .await?
            .ok_or_else(|| AppError::Upstream("Playlist insert returned no row".into()))?;

        info!("Created playlist {} for {}", created.id, user_id);
        Ok(created)
    }

    /// Update name and/or description
    pub async fn update(
        db: &DbScope<'_>,
        id: &str,
        user_id: &str,
        update: PlaylistUpdate,
    ) -> AppResult<Playlist> {
        if update.is_empty() {
            return Err(AppError::BadRequest(
                "Nothing to update: provide a name or description".to_string(),
            ));
        }

        let update = PlaylistUpdate {
            name: clean(update.name),
            description: update.description,
        };

        if update.name.as_deref() == Some("") {
            return Err(AppError::BadRequest("Playlist name cannot be empty".to_string()));
        }

        PlaylistTable::update(db, id, user_id, &update)
            .await?
            .ok_or_else(not_found)
    }

    /// Delete playlist
    pub async fn delete(db: &DbScope<'_>, id: &str, user_id: &str) -> AppResult<()> {
        if PlaylistTable::delete(db, id, user_id).await? {
            info!("Deleted playlist {}", id);
            Ok(())
        } else {
            Err(not_found())
        }
    }

    /// Get playlist tracks, most recently added first
    pub async fn get_tracks(db: &DbScope<'_>, id: &str, user_id: &str) -> AppResult<Vec<PlaylistEntry>> {
        Self::get(db, id, user_id).await?;
        PlaylistTrackTable::entries(db, id).await
    }

    /// Add a library track to a playlist.
    ///
    /// The `tracks` row is created or refreshed first, using cached tags when
    /// the track carries none of its own.
    pub async fn add_track(
        db: &DbScope<'_>,
        cache: &MetadataStore,
        id: &str,
        user_id: &str,
        mut track: Track,
    ) -> AppResult<PlaylistTrack> {
        Self::get(db, id, user_id).await?;

        if track.metadata.is_none() {
            track.metadata = cache.get(user_id, &track.id);
        }

        let stored = TrackTable::upsert(db, &NewStoredTrack::from_track(user_id, &track)).await?;

        PlaylistTrackTable::add(db, id, &stored.id)
            .await?
            .ok_or_else(|| AppError::Upstream("Playlist track insert returned no row".into()))
    }

    /// Remove a track from a playlist
    pub async fn remove_track(db: &DbScope<'_>, id: &str, user_id: &str, track_id: &str) -> AppResult<()> {
        Self::get(db, id, user_id).await?;

        if PlaylistTrackTable::remove(db, id, track_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Track is not in this playlist".to_string()))
        }
    }
}
