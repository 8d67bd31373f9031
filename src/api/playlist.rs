//! Playlist routes

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;

use crate::api::AppState;
use crate::core::PlaylistLib;
use crate::errors::AppResult;
use crate::models::{PlaylistUpdate, Track};
use crate::serializers::ApiResponse;
use crate::utils::auth::Caller;

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddTrackBody {
    pub track: Track,
}

/// GET /playlists
#[get("")]
pub async fn get_playlists(state: web::Data<AppState>, caller: Caller) -> AppResult<HttpResponse> {
    let db = state.db.scoped(&caller.token);
    let playlists = PlaylistLib::get_all(&db, &caller.id).await?;
    Ok(ApiResponse::ok(playlists))
}

/// POST /playlists
#[post("")]
pub async fn create_playlist(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<CreatePlaylistBody>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let db = state.db.scoped(&caller.token);
    let playlist = PlaylistLib::create(&db, &caller.id, body.name, body.description).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(playlist)))
}

/// GET /playlists/{id}
#[get("/{id}")]
pub async fn get_playlist(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let db = state.db.scoped(&caller.token);
    let playlist = PlaylistLib::get(&db, &path, &caller.id).await?;
    Ok(ApiResponse::ok(playlist))
}

/// PUT /playlists/{id}
#[put("/{id}")]
pub async fn update_playlist(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
    body: web::Json<PlaylistUpdate>,
) -> AppResult<HttpResponse> {
    let db = state.db.scoped(&caller.token);
    let playlist = PlaylistLib::update(&db, &path, &caller.id, body.into_inner()).await?;
    Ok(ApiResponse::ok(playlist))
}

/// DELETE /playlists/{id}
#[delete("/{id}")]
pub async fn delete_playlist(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let db = state.db.scoped(&caller.token);
    PlaylistLib::delete(&db, &path, &caller.id).await?;
    Ok(ApiResponse::ok_with("Playlist deleted", serde_json::json!({ "id": path.as_str() })))
}

/// GET /playlists/{id}/tracks
#[get("/{id}/tracks")]
pub async fn get_playlist_tracks(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let db = state.db.scoped(&caller.token);
    let entries = PlaylistLib::get_tracks(&db, &path, &caller.id).await?;
    Ok(ApiResponse::ok(entries))
}

/// POST /playlists/{id}/tracks
#[post("/{id}/tracks")]
pub async fn add_playlist_track(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
    body: web::Json<AddTrackBody>,
) -> AppResult<HttpResponse> {
    let db = state.db.scoped(&caller.token);
    let link = PlaylistLib::add_track(
        &db,
        &state.metadata,
        &path,
        &caller.id,
        body.into_inner().track,
    )
    .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(link)))
}

/// DELETE /playlists/{id}/tracks/{track_id}
#[delete("/{id}/tracks/{track_id}")]
pub async fn remove_playlist_track(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (id, track_id) = path.into_inner();
    let db = state.db.scoped(&caller.token);
    PlaylistLib::remove_track(&db, &id, &caller.id, &track_id).await?;
    Ok(ApiResponse::ok_with(
        "Track removed from playlist",
        serde_json::json!({ "playlist_id": id, "track_id": track_id }),
    ))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_playlists)
        .service(create_playlist)
        .service(get_playlist_tracks)
        .service(add_playlist_track)
        .service(remove_playlist_track)
        .service(get_playlist)
        .service(update_playlist)
        .service(delete_playlist);
}
