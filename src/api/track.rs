//! Track routes: tag metadata and fresh download links

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use crate::api::AppState;
use crate::core::MetadataLib;
use crate::errors::{AppError, AppResult};
use crate::models::Track;
use crate::serializers::ApiResponse;
use crate::utils::auth::Caller;

#[derive(Debug, Deserialize)]
pub struct LinkQuery {
    pub path: String,
}

/// Swap client-sent links for ones issued by Dropbox. Needs a Dropbox
/// session only when something has to be downloaded.
async fn resolve_links(state: &AppState, caller: &Caller, tracks: Vec<Track>) -> AppResult<Vec<Track>> {
    if tracks.iter().all(|t| state.metadata.contains(&caller.id, &t.id)) {
        return Ok(tracks);
    }

    let token = state.dropbox_token(caller).await?;
    Ok(MetadataLib::with_fresh_links(&state.dropbox, &token, &state.metadata, &caller.id, tracks).await)
}

/// POST /tracks/metadata
///
/// Parses the tags of one track. Failures still answer 200 with default
/// metadata and a user-facing `error`.
#[post("/metadata")]
pub async fn get_metadata(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<Track>,
) -> AppResult<HttpResponse> {
    let mut tracks = resolve_links(&state, &caller, vec![body.into_inner()]).await?;
    let Some(track) = tracks.pop() else {
        return Err(AppError::Internal("track lost while resolving links".into()));
    };
    let outcome = MetadataLib::get_metadata(
        &state.http,
        &state.metadata,
        &state.settings.metadata,
        &caller.id,
        &track,
    )
    .await;

    state
        .sessions
        .queue(&caller.id, |q| q.attach_metadata(&track.id, &outcome.metadata));

    Ok(ApiResponse::ok(outcome))
}

/// POST /tracks/metadata/batch
#[post("/metadata/batch")]
pub async fn get_metadata_batch(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<Vec<Track>>,
) -> AppResult<HttpResponse> {
    let tracks = resolve_links(&state, &caller, body.into_inner()).await?;
    let outcomes = MetadataLib::process_metadata(
        &state.http,
        &state.metadata,
        &state.settings.metadata,
        &caller.id,
        &tracks,
    )
    .await;

    state.sessions.queue(&caller.id, |q| {
        for (track, outcome) in tracks.iter().zip(&outcomes) {
            q.attach_metadata(&track.id, &outcome.metadata);
        }
    });

    Ok(ApiResponse::ok(outcomes))
}

/// GET /tracks/link?path=
#[get("/link")]
pub async fn get_link(
    state: web::Data<AppState>,
    caller: Caller,
    query: web::Query<LinkQuery>,
) -> AppResult<HttpResponse> {
    if query.path.trim().is_empty() {
        return Err(AppError::BadRequest("path is required".into()));
    }

    let token = state.dropbox_token(&caller).await?;
    let link = state.dropbox.get_temporary_link(&token, &query.path).await?;

    Ok(ApiResponse::ok(serde_json::json!({ "link": link })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_metadata_batch)
        .service(get_metadata)
        .service(get_link);
}
