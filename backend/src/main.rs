mod config;
mod db;
mod error;
mod job_controller;
mod services;

use crate::config::AppConfig;
use crate::job_controller::state::JobsState;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{info, warn};
use mime_guess::from_path;
use std::thread;
use std::time::Duration;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        // Client-side routes are resolved by the front end.
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let url = config.url();

    // Fail fast on an unusable database or data directory.
    db::open(&config.db_path).map_err(std::io::Error::other)?;
    std::fs::create_dir_all(&config.data_dir)?;

    if config.open_browser {
        let url_clone = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            if let Err(e) = webbrowser::open(&url_clone) {
                warn!("could not open a browser at {url_clone}: {e}");
            }
        });
    }

    let (jobs_state, rx) = JobsState::new(100);
    tokio::spawn(job_controller::state::start_job_updater(
        jobs_state.jobs.clone(),
        rx,
        config.job_retention,
    ));

    info!("Server running at {}", url);

    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);
    let jobs_state = web::Data::new(jobs_state);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(config.clone())
            .app_data(jobs_state.clone())
            .configure(services::configure)
            .default_service(web::route().to(serve_embedded))
    })
        .bind(bind)?
        .run()
        .await
}
