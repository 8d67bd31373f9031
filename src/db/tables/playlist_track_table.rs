//! Playlist track join table operations

use crate::db::{eq, DbScope};
use crate::errors::AppResult;
use crate::models::{PlaylistEntry, PlaylistTrack};

const TABLE: &str = "playlist_tracks";

pub struct PlaylistTrackTable;

impl PlaylistTrackTable {
    /// Join rows of a playlist with the referenced track embedded, newest first
    pub async fn entries(db: &DbScope<'_>, playlist_id: &str) -> AppResult<Vec<PlaylistEntry>> {
        db.select(
            TABLE,
            &[
                ("select", "track_id,added_at,tracks(*)".to_string()),
                ("playlist_id", eq(playlist_id)),
                ("order", "added_at.desc".to_string()),
            ],
        )
        .await
    }

    /// Link a track to a playlist. A duplicate link surfaces as a conflict.
    pub async fn add(db: &DbScope<'_>, playlist_id: &str, track_id: &str) -> AppResult<Option<PlaylistTrack>> {
        let row = PlaylistTrack {
            playlist_id: playlist_id.to_string(),
            track_id: track_id.to_string(),
            added_at: None,
        };

        let rows: Vec<PlaylistTrack> = db.insert(TABLE, &row).await?;
        Ok(rows.into_iter().next())
    }

    /// Unlink a track. Returns false when the link did not exist.
    pub async fn remove(db: &DbScope<'_>, playlist_id: &str, track_id: &str) -> AppResult<bool> {
        let rows: Vec<PlaylistTrack> = db
            .delete(
                TABLE,
                &[("playlist_id", eq(playlist_id)), ("track_id", eq(track_id))],
            )
            .await?;

        Ok(!rows.is_empty())
    }
}
