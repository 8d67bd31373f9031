//! Account registration

use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::api::AppState;
use crate::db::tables::ProfileTable;
use crate::errors::{AppError, AppResult};
use crate::models::ProfileUpsert;
use crate::serializers::ApiResponse;
use crate::utils::auth::Caller;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// POST /auth/register
///
/// Creates or refreshes the caller's profile row after sign-in.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<RegisterBody>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    let email = body
        .email
        .filter(|e| !e.trim().is_empty())
        .or_else(|| caller.email.clone())
        .ok_or_else(|| AppError::BadRequest("Email is required".into()))?;

    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    let profile = ProfileUpsert {
        id: caller.id.clone(),
        email,
        name,
        profile_picture: body.profile_picture,
    };

    let db = state.db.scoped(&caller.token);
    let saved = ProfileTable::upsert(&db, &profile)
        .await?
        .ok_or_else(|| AppError::Upstream("Profile upsert returned no row".into()))?;

    info!("Registered profile for {}", caller.id);
    Ok(ApiResponse::ok(saved))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{bearer, state_for};
    use crate::testing::spawn_upstream;
    use actix_web::{test, App, HttpRequest};

    fn fake_profiles(cfg: &mut web::ServiceConfig) {
        cfg.route(
            "/rest/v1/user_profiles",
            web::post().to(|req: HttpRequest, body: web::Json<serde_json::Value>| async move {
                assert_eq!(req.query_string(), "on_conflict=id");
                HttpResponse::Created().json(vec![body.into_inner()])
            }),
        );
    }

    #[actix_web::test]
    async fn test_register_defaults_from_token() {
        let upstream = spawn_upstream(fake_profiles).await;
        let app = test::init_service(
            App::new()
                .app_data(state_for(&upstream))
                .service(web::scope("/auth").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .insert_header(bearer("u1"))
            .set_json(serde_json::json!({ "profilePicture": "http://pic" }))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp["success"], true);
        assert_eq!(resp["data"]["id"], "u1");
        assert_eq!(resp["data"]["email"], "u1@example.com");
        assert_eq!(resp["data"]["name"], "u1");
        assert_eq!(resp["data"]["profile_picture"], "http://pic");
    }

    #[actix_web::test]
    async fn test_register_requires_token() {
        let app = test::init_service(
            App::new()
                .app_data(state_for("http://127.0.0.1:9"))
                .service(web::scope("/auth").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 401);
    }
}
