//! Dropbox connection routes

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use crate::api::AppState;
use crate::core::DropboxLib;
use crate::errors::AppResult;
use crate::serializers::ApiResponse;
use crate::utils::auth::Caller;

#[derive(Debug, Deserialize)]
pub struct CallbackBody {
    pub code: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// GET /dropbox/authorize
#[get("/authorize")]
pub async fn authorize(state: web::Data<AppState>, caller: Caller) -> AppResult<HttpResponse> {
    let url = DropboxLib::start_login(&state.dropbox, &state.sessions, &caller.id)?;
    Ok(ApiResponse::ok(serde_json::json!({ "url": url })))
}

/// POST /dropbox/callback
#[post("/callback")]
pub async fn callback(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<CallbackBody>,
) -> AppResult<HttpResponse> {
    let status = DropboxLib::complete_login(
        &state.dropbox,
        &state.sessions,
        &caller.id,
        &body.code,
        body.state.as_deref(),
    )
    .await?;

    Ok(ApiResponse::ok_with("Connected to Dropbox", status))
}

/// POST /dropbox/refresh
#[post("/refresh")]
pub async fn refresh(state: web::Data<AppState>, caller: Caller) -> AppResult<HttpResponse> {
    let status = DropboxLib::refresh(&state.dropbox, &state.sessions, &caller.id).await?;
    Ok(ApiResponse::ok(status))
}

/// POST /dropbox/revoke
#[post("/revoke")]
pub async fn revoke(state: web::Data<AppState>, caller: Caller) -> AppResult<HttpResponse> {
    DropboxLib::revoke(&state.dropbox, &state.sessions, &caller.id).await?;
    Ok(ApiResponse::ok_with(
        "Disconnected from Dropbox",
        state.sessions.get(&caller.id).status(),
    ))
}

/// GET /dropbox/status
#[get("/status")]
pub async fn get_status(state: web::Data<AppState>, caller: Caller) -> HttpResponse {
    ApiResponse::ok(state.sessions.get(&caller.id).status())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(authorize)
        .service(callback)
        .service(refresh)
        .service(revoke)
        .service(get_status);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{bearer, connect_dropbox, state_for};
    use crate::testing::spawn_upstream;
    use actix_web::{test, App};

    fn fake_dropbox(cfg: &mut web::ServiceConfig) {
        cfg.route(
            "/oauth2/token",
            web::post().to(|| async {
                HttpResponse::Ok().json(serde_json::json!({
                    "access_token": "at",
                    "refresh_token": "rt",
                    "expires_in": 14400,
                }))
            }),
        )
        .route(
            "/2/auth/token/revoke",
            web::post().to(|| async { HttpResponse::Ok().json(serde_json::Value::Null) }),
        );
    }

    #[actix_web::test]
    async fn test_connect_and_disconnect() {
        let upstream = spawn_upstream(fake_dropbox).await;
        let state = state_for(&upstream);
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(web::scope("/dropbox").configure(configure)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/dropbox/authorize")
            .insert_header(bearer("u1"))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(resp["data"]["url"].as_str().unwrap().contains("client_id=key"));

        let issued = state.sessions.get("u1").pending_state.unwrap();
        let req = test::TestRequest::post()
            .uri("/dropbox/callback")
            .insert_header(bearer("u1"))
            .set_json(serde_json::json!({ "code": "c", "state": issued }))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["data"]["isAuthenticated"], true);
        assert!(resp["data"].get("accessToken").is_none());

        let req = test::TestRequest::post()
            .uri("/dropbox/revoke")
            .insert_header(bearer("u1"))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["data"]["isAuthenticated"], false);
    }

    #[actix_web::test]
    async fn test_status_is_per_user() {
        let state = state_for("http://127.0.0.1:9");
        connect_dropbox(&state, "u1");
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(web::scope("/dropbox").configure(configure)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/dropbox/status")
            .insert_header(bearer("u2"))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["data"]["isAuthenticated"], false);
    }
}
