//! Lyrics search route

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::api::AppState;
use crate::core::LyricsLib;
use crate::errors::{AppError, AppResult};
use crate::serializers::ApiResponse;
use crate::utils::auth::Caller;

#[derive(Debug, Deserialize)]
pub struct LyricsQuery {
    #[serde(default)]
    pub track: String,
    #[serde(default)]
    pub artist: String,
}

/// GET /lyrics/search?track=&artist=
///
/// Not finding lyrics is a normal outcome and answers 200 with
/// `success=false`.
#[get("/search")]
pub async fn search_lyrics(
    state: web::Data<AppState>,
    _caller: Caller,
    query: web::Query<LyricsQuery>,
) -> AppResult<HttpResponse> {
    let track = query.track.trim();
    let artist = query.artist.trim();

    if track.is_empty() {
        return Err(AppError::BadRequest("track is required".into()));
    }

    match LyricsLib::resolve(&state.lyrics, &state.genius, track, artist).await {
        Some(found) => Ok(ApiResponse::ok(found)),
        None => Ok(HttpResponse::Ok().json(ApiResponse::error("Lyrics not found"))),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search_lyrics);
}
