//! Genius search routes

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::api::AppState;
use crate::errors::{AppError, AppResult};
use crate::serializers::ApiResponse;
use crate::utils::auth::Caller;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// GET /genius/search?query=
#[get("/search")]
pub async fn search(
    state: web::Data<AppState>,
    _caller: Caller,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let q = query.query.trim();
    if q.is_empty() {
        return Err(AppError::BadRequest("query is required".into()));
    }

    let songs = state.genius.search(q).await?;
    Ok(ApiResponse::ok(songs))
}

/// GET /genius/songs/{id}
#[get("/songs/{id}")]
pub async fn get_song(
    state: web::Data<AppState>,
    _caller: Caller,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let song = state.genius.song(path.into_inner()).await?;
    Ok(ApiResponse::ok(song))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search).service(get_song);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{bearer, state_for};
    use crate::testing::spawn_upstream;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_search_passes_through() {
        let upstream = spawn_upstream(|cfg| {
            cfg.route(
                "/genius/search",
                web::get().to(|| async {
                    HttpResponse::Ok().json(serde_json::json!({ "response": { "hits": [
                        { "result": { "id": 1, "title": "T", "primary_artist": { "name": "A" } } }
                    ]}}))
                }),
            );
        })
        .await;
        let app = test::init_service(
            App::new()
                .app_data(state_for(&upstream))
                .service(web::scope("/genius").configure(configure)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/genius/search?query=T%20A")
            .insert_header(bearer("u1"))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["data"][0]["id"], 1);
        assert_eq!(resp["data"][0]["artist"], "A");

        let req = test::TestRequest::get()
            .uri("/genius/search")
            .insert_header(bearer("u1"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }
}
