//! Web client hosting
//!
//! Serves the prebuilt single-page app. Paths that are not files fall back
//! to `index.html` so client-side routes survive a reload.

use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use std::path::PathBuf;

/// Static files service for the client bundle in `client_dir`
pub fn service(client_dir: PathBuf) -> Files {
    let index = client_dir.join("index.html");

    Files::new("/", client_dir)
        .index_file("index.html")
        .default_handler(fn_service(move |req: ServiceRequest| {
            let index = index.clone();
            async move {
                let (req, _) = req.into_parts();
                let file = NamedFile::open_async(&index).await?;
                let res = file.into_response(&req);
                Ok(ServiceResponse::new(req, res))
            }
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};
    use tempfile::TempDir;

    fn client_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>app</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        dir
    }

    #[actix_web::test]
    async fn test_spa_fallback() {
        let dir = client_dir();
        let app = test::init_service(
            App::new()
                .service(web::scope("/api").route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })))
                .service(service(dir.path().to_path_buf())),
        )
        .await;

        let req = test::TestRequest::get().uri("/app.js").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body.as_ref(), b"console.log(1)");

        let req = test::TestRequest::get().uri("/playlists/123").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body.as_ref(), b"<html>app</html>");

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body.as_ref(), b"<html>app</html>");

        let req = test::TestRequest::get().uri("/api/unknown").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
