//! Track table operations

use crate::db::DbScope;
use crate::errors::{AppError, AppResult};
use crate::models::{NewStoredTrack, StoredTrack};

const TABLE: &str = "tracks";

pub struct TrackTable;

impl TrackTable {
    /// Insert or refresh the row for a Dropbox file, keyed by owner and path
    pub async fn upsert(db: &DbScope<'_>, track: &NewStoredTrack) -> AppResult<StoredTrack> {
        let rows: Vec<StoredTrack> = db.upsert(TABLE, "user_id,dropbox_id", track).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Upstream("Track upsert returned no row".into()))
    }
}
