//! SoundVault - stream your Dropbox music library from the browser
//!
//! Lists audio files from the user's Dropbox, reads their tags, keeps a play
//! queue and stores playlists in Supabase.

mod api;
mod config;
mod core;
mod db;
mod errors;
mod models;
mod plugins;
mod serializers;
mod stores;
mod utils;

#[cfg(test)]
mod testing;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

/// SoundVault - Dropbox music streaming backend
#[derive(Parser, Debug)]
#[command(name = "soundvault")]
#[command(version)]
#[command(about = "Stream your Dropbox music library with Supabase-backed playlists")]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,

    /// Path to config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to web client
    #[arg(long)]
    client: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };

    // tag parsing logs every malformed frame, keep it quiet
    let filter = tracing_subscriber::EnvFilter::new(format!("{},lofty=error", log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("SoundVault v{} starting...", env!("CARGO_PKG_VERSION"));

    let paths = config::Paths::init(args.config, args.client)?;
    info!("Config directory: {:?}", paths.config_dir());

    let settings = config::Settings::load(&paths)?;
    let missing = settings.validate();
    if missing > 0 {
        warn!("{} settings missing, see {:?}", missing, paths.settings_path());
    }

    let sessions = stores::SessionStore::load(paths.sessions_path())
        .context("Failed to load Dropbox sessions")?;

    let state = web::Data::new(api::AppState::new(settings, sessions));
    let client_dir = paths.client_path().to_path_buf();
    if !paths.client_index().exists() {
        warn!("Web client not found at {:?}, only the API is served", client_dir);
    }

    let addr = format!("{}:{}", args.host, args.port);
    info!("Server listening on http://{}", addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .service(web::scope("/api").configure(api::configure))
            .service(api::client::service(client_dir.clone()))
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
