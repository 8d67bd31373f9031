//! Player queue routes
//!
//! Every route answers with the caller's full queue after the change.

use actix_web::{get, post, put, web, HttpResponse};
use serde::Deserialize;

use crate::api::AppState;
use crate::core::PlayQueue;
use crate::models::Track;
use crate::serializers::ApiResponse;
use crate::utils::auth::Caller;

#[derive(Debug, Deserialize)]
pub struct TracksBody {
    pub tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentBody {
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Deserialize)]
pub struct VolumeBody {
    pub volume: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBody {
    pub current_time: f64,
    #[serde(default)]
    pub duration: Option<f64>,
}

fn with_queue(state: &AppState, caller: &Caller, f: impl FnOnce(&mut PlayQueue)) -> HttpResponse {
    let queue = state.sessions.queue(&caller.id, |q| {
        f(q);
        q.clone()
    });
    ApiResponse::ok(queue)
}

/// GET /player
#[get("")]
pub async fn get_queue(state: web::Data<AppState>, caller: Caller) -> HttpResponse {
    with_queue(&state, &caller, |_| {})
}

/// PUT /player/queue
#[put("/queue")]
pub async fn set_queue(state: web::Data<AppState>, caller: Caller, body: web::Json<TracksBody>) -> HttpResponse {
    let tracks = body.into_inner().tracks;
    with_queue(&state, &caller, |q| q.set_tracks(tracks))
}

/// POST /player/queue
#[post("/queue")]
pub async fn append_queue(state: web::Data<AppState>, caller: Caller, body: web::Json<TracksBody>) -> HttpResponse {
    let tracks = body.into_inner().tracks;
    with_queue(&state, &caller, |q| q.append(tracks))
}

/// PUT /player/current
#[put("/current")]
pub async fn set_current(state: web::Data<AppState>, caller: Caller, body: web::Json<CurrentBody>) -> HttpResponse {
    let track = body.into_inner().track;
    with_queue(&state, &caller, |q| q.set_current(track))
}

/// POST /player/play
#[post("/play")]
pub async fn play(state: web::Data<AppState>, caller: Caller) -> HttpResponse {
    with_queue(&state, &caller, |q| q.set_playing(true))
}

/// POST /player/pause
#[post("/pause")]
pub async fn pause(state: web::Data<AppState>, caller: Caller) -> HttpResponse {
    with_queue(&state, &caller, |q| q.set_playing(false))
}

/// PUT /player/volume
#[put("/volume")]
pub async fn set_volume(state: web::Data<AppState>, caller: Caller, body: web::Json<VolumeBody>) -> HttpResponse {
    with_queue(&state, &caller, |q| q.set_volume(body.volume))
}

/// PUT /player/progress
#[put("/progress")]
pub async fn set_progress(state: web::Data<AppState>, caller: Caller, body: web::Json<ProgressBody>) -> HttpResponse {
    with_queue(&state, &caller, |q| {
        q.set_current_time(body.current_time);
        if let Some(duration) = body.duration {
            q.set_duration(duration);
        }
    })
}

/// POST /player/next
#[post("/next")]
pub async fn skip_forward(state: web::Data<AppState>, caller: Caller) -> HttpResponse {
    with_queue(&state, &caller, PlayQueue::skip_forward)
}

/// POST /player/previous
#[post("/previous")]
pub async fn skip_backward(state: web::Data<AppState>, caller: Caller) -> HttpResponse {
    with_queue(&state, &caller, PlayQueue::skip_backward)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_queue)
        .service(set_queue)
        .service(append_queue)
        .service(set_current)
        .service(play)
        .service(pause)
        .service(set_volume)
        .service(set_progress)
        .service(skip_forward)
        .service(skip_backward);
}
