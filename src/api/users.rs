//! User profile routes

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::api::AppState;
use crate::db::tables::ProfileTable;
use crate::errors::{AppError, AppResult};
use crate::models::KeyPairUpdate;
use crate::serializers::ApiResponse;
use crate::utils::auth::Caller;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveKeysBody {
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub encrypted_private_key: Option<String>,
}

/// GET /users/{id}
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let db = state.db.scoped(&caller.token);

    let profile = ProfileTable::get(&db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(ApiResponse::ok(profile))
}

/// POST /users/{id}/keys
#[post("/{id}/keys")]
pub async fn save_keys(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
    body: web::Json<SaveKeysBody>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let body = body.into_inner();

    let (Some(public_key), Some(encrypted_private_key)) = (
        body.public_key.filter(|k| !k.is_empty()),
        body.encrypted_private_key.filter(|k| !k.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "publicKey and encryptedPrivateKey are required".into(),
        ));
    };

    if id != caller.id {
        return Err(AppError::Forbidden("Cannot update keys of another user".into()));
    }

    let keys = KeyPairUpdate {
        public_key,
        encrypted_private_key,
    };

    let db = state.db.scoped(&caller.token);
    let profile = ProfileTable::save_keys(&db, &id, &keys)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!("Stored key pair for {}", id);
    Ok(ApiResponse::ok_with("Keys saved", profile))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_user).service(save_keys);
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
            web::get().to(|req: HttpRequest| async move {
                if req.query_string().contains("id=eq.u1") {
                    HttpResponse::Ok().json(vec![serde_json::json!({
                        "id": "u1",
                        "email": "u1@example.com",
                        "public_key": "pub",
                        "encrypted_private_key": "wrapped",
                    })])
                } else {
                    HttpResponse::Ok().json(Vec::<serde_json::Value>::new())
                }
            }),
        )
        .route(
            "/rest/v1/user_profiles",
            web::patch().to(|body: web::Json<serde_json::Value>| async move {
                HttpResponse::Ok().json(vec![serde_json::json!({
                    "id": "u1",
                    "public_key": body["public_key"],
                    "encrypted_private_key": body["encrypted_private_key"],
                })])
            }),
        );
    }

    macro_rules! app {
        ($upstream:expr) => {
            test::init_service(
                App::new()
                    .app_data(state_for($upstream))
                    .service(web::scope("/users").configure(configure)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_get_user_hides_private_key() {
        let upstream = spawn_upstream(fake_profiles).await;
        let app = app!(&upstream);

        let req = test::TestRequest::get()
            .uri("/users/u1")
            .insert_header(bearer("u1"))
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["data"]["public_key"], "pub");
        assert!(resp["data"].get("encrypted_private_key").is_none());

        let req = test::TestRequest::get()
            .uri("/users/ghost")
            .insert_header(bearer("u1"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn test_save_keys_rules() {
        let upstream = spawn_upstream(fake_profiles).await;
        let app = app!(&upstream);

        let req = test::TestRequest::post()
            .uri("/users/u1/keys")
            .insert_header(bearer("u1"))
            .set_json(serde_json::json!({ "publicKey": "pub" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let keys = serde_json::json!({ "publicKey": "pub2", "encryptedPrivateKey": "wrapped2" });

        let req = test::TestRequest::post()
            .uri("/users/u2/keys")
            .insert_header(bearer("u1"))
            .set_json(&keys)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);

        let req = test::TestRequest::post()
            .uri("/users/u1/keys")
            .insert_header(bearer("u1"))
            .set_json(&keys)
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["success"], true);
        assert_eq!(resp["data"]["public_key"], "pub2");
    }
}
