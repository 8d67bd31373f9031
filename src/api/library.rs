//! Library routes: paged listing and uploads

use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse};
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, info};

use crate::api::AppState;
use crate::core::{LibraryLib, LibraryPage};
use crate::errors::{AppError, AppResult};
use crate::serializers::ApiResponse;
use crate::utils::auth::Caller;
use crate::utils::filesystem::file_name;

#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    #[serde(default)]
    pub cursor: Option<String>,
}

fn remember_page(state: &AppState, user_id: &str, page: &LibraryPage) {
    state
        .sessions
        .update(user_id, |s| s.set_page_state(page.has_more, page.cursor.clone()));
}

/// GET /library
///
/// Without a cursor the listing starts over from the first page.
#[get("")]
pub async fn get_library(
    state: web::Data<AppState>,
    caller: Caller,
    query: web::Query<LibraryQuery>,
) -> AppResult<HttpResponse> {
    let token = state.dropbox_token(&caller).await?;

    let page = match query.cursor.as_deref().filter(|c| !c.is_empty()) {
        Some(cursor) => LibraryLib::next_page(&state.dropbox, &token, cursor).await?,
        None => LibraryLib::first_page(&state.dropbox, &token).await?,
    };

    remember_page(&state, &caller.id, &page);
    Ok(ApiResponse::ok(page))
}

/// GET /library/more
///
/// Continues from the cursor stored with the previous page.
#[get("/more")]
pub async fn get_more(state: web::Data<AppState>, caller: Caller) -> AppResult<HttpResponse> {
    let session = state.sessions.get(&caller.id);

    let Some(cursor) = session.cursor.filter(|_| session.has_more) else {
        debug!("No more files to load for {}", caller.id);
        return Ok(ApiResponse::ok(LibraryPage::empty()));
    };

    let token = state.dropbox_token(&caller).await?;
    let page = LibraryLib::next_page(&state.dropbox, &token, &cursor).await?;

    remember_page(&state, &caller.id, &page);
    Ok(ApiResponse::ok(page))
}

/// POST /library/upload
///
/// Takes one multipart `file` field of at most `dropbox.max_upload_bytes`.
/// Answers with the uploaded track, or null when the file is not playable.
#[post("/upload")]
pub async fn upload(
    state: web::Data<AppState>,
    caller: Caller,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let limit = state.settings.dropbox.max_upload_bytes;
    let mut received: Option<(String, Vec<u8>)> = None;

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;

        let disp = field.content_disposition().clone();
        if disp.get_name() != Some("file") {
            continue;
        }

        let name = disp
            .get_filename()
            .map(|f| file_name(f).to_string())
            .filter(|f| !f.is_empty())
            .ok_or_else(|| AppError::BadRequest("Uploaded file has no name".into()))?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;
            if bytes.len() + data.len() > limit {
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds the {} MB upload limit",
                    limit / (1024 * 1024)
                )));
            }
            bytes.extend_from_slice(&data);
        }

        received = Some((name, bytes));
        break;
    }

    let (name, bytes) = received.ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;
    info!("Uploading {} ({} bytes) for {}", name, bytes.len(), caller.id);

    let token = state.dropbox_token(&caller).await?;
    let entry = state.dropbox.upload(&token, &name, bytes).await?;
    let track = LibraryLib::process_entries(&state.dropbox, &token, vec![entry])
        .await?
        .into_iter()
        .next();

    Ok(ApiResponse::ok_with("File uploaded", track))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_library).service(get_more).service(upload);
}
