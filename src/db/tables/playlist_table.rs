//! Playlist table operations

use crate::db::{eq, DbScope};
use crate::errors::AppResult;
use crate::models::{NewPlaylist, Playlist, PlaylistUpdate};

const TABLE: &str = "playlists";

/// Playlist table operations
pub struct PlaylistTable;

impl PlaylistTable {
    /// Get all playlists of a user, newest first
    pub async fn all(db: &DbScope<'_>, user_id: &str) -> AppResult<Vec<Playlist>> {
        db.select(
            TABLE,
            &[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    /// Get a playlist owned by the user
    pub async fn get(db: &DbScope<'_>, id: &str, user_id: &str) -> AppResult<Option<Playlist>> {
        let rows: Vec<Playlist> = db
            .select(
                TABLE,
                &[
                    ("select", "*".to_string()),
                    ("id", eq(id)),
                    ("user_id", eq(user_id)),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    /// Insert playlist, returning the stored row
    pub async fn insert(db: &DbScope<'_>, playlist: &NewPlaylist) -> AppResult<Option<Playlist>> {
        let rows: Vec<Playlist> = db.insert(TABLE, playlist).await?;
        Ok(rows.into_iter().next())
    }

    /// Update name and/or description of an owned playlist
    pub async fn update(
        db: &DbScope<'_>,
        id: &str,
        user_id: &str,
        update: &PlaylistUpdate,
    ) -> AppResult<Option<Playlist>> {
        let rows: Vec<Playlist> = db
            .update(TABLE, &[("id", eq(id)), ("user_id", eq(user_id))], update)
            .await?;

        Ok(rows.into_iter().next())
    }

    /// Delete an owned playlist. Returns false when nothing matched.
    pub async fn delete(db: &DbScope<'_>, id: &str, user_id: &str) -> AppResult<bool> {
        let rows: Vec<Playlist> = db
            .delete(TABLE, &[("id", eq(id)), ("user_id", eq(user_id))])
            .await?;

        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SupabaseSettings;
    use crate::db::SupabaseEngine;
    use crate::testing::spawn_upstream;
    use actix_web::{web, HttpRequest, HttpResponse};

    fn row(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "user_id": "u1",
            "name": "Mix",
            "description": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    #[actix_web::test]
    async fn test_all_filters_by_owner_newest_first() {
        let url = spawn_upstream(|cfg| {
            cfg.route(
                "/rest/v1/playlists",
                web::get().to(|req: HttpRequest| async move {
                    let q = req.query_string().to_string();
                    assert!(q.contains("user_id=eq.u1"));
                    assert!(q.contains("order=created_at.desc"));
                    HttpResponse::Ok().json(vec![row("p2"), row("p1")])
                }),
            );
        })
        .await;

        let engine = SupabaseEngine::new(&SupabaseSettings {
            url,
            anon_key: "anon".into(),
            jwt_secret: None,
        });
        let playlists = PlaylistTable::all(&engine.scoped("tok"), "u1").await.unwrap();

        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0].id, "p2");
    }

    #[actix_web::test]
    async fn test_delete_reports_missing_rows() {
        let url = spawn_upstream(|cfg| {
            cfg.route(
                "/rest/v1/playlists",
                web::delete().to(|| async { HttpResponse::Ok().json(Vec::<serde_json::Value>::new()) }),
            );
        })
        .await;

        let engine = SupabaseEngine::new(&SupabaseSettings {
            url,
            anon_key: "anon".into(),
            jwt_secret: None,
        });
        let deleted = PlaylistTable::delete(&engine.scoped("tok"), "p9", "u1").await.unwrap();
        assert!(!deleted);
    }
}
