//! Test helpers shared across modules

use actix_web::{web, App, HttpServer};

/// Start a throwaway HTTP server on a random local port and return its base url.
///
/// Used to stand in for Dropbox, Supabase and the lyrics providers.
pub async fn spawn_upstream<F>(configure: F) -> String
where
    F: Fn(&mut web::ServiceConfig) + Send + Sync + Clone + 'static,
{
    let server = HttpServer::new(move || App::new().configure(configure.clone()))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind test upstream");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    format!("http://{}", addr)
}
