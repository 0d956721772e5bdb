mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use actix_cors::Cors;
use actix_multipart::form::MultipartFormConfig;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpServer, web};

use application::board_service::BoardService;
use application::rate_limit::{RateLimiter, RateLimits};
use application::view_counter::ViewCounter;
use data::board_repository::MemoryBoardRepository;
use infrastructure::config::AppConfig;
use infrastructure::logging::init_logging;
use infrastructure::media::{FsMediaStore, MediaStore};
use presentation::handlers;
use presentation::middleware::RequestTrace;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let config = AppConfig::from_env().expect("invalid configuration");
    config
        .ensure_dirs()
        .expect("failed to create media directories");

    let repo = Arc::new(MemoryBoardRepository::new());
    let media: Arc<dyn MediaStore> = Arc::new(FsMediaStore::new(
        config.media_path.clone(),
        config.thumbnail_path.clone(),
    ));
    let board = BoardService::new(repo, media, config.require_secret);
    let limiter = web::Data::new(RateLimiter::new(
        RateLimits::default(),
        config.rate_limiting,
    ));
    let views = web::Data::new(ViewCounter::new());

    let config_data = config.clone();

    HttpServer::new(move || {
        let cors = build_cors(&config_data);
        let mut api = web::scope("/api")
            .service(handlers::board::list_posts)
            .service(handlers::board::get_post)
            .service(handlers::board::create_post)
            .service(handlers::board::add_comment)
            .service(handlers::media::serve_media)
            .service(handlers::media::serve_thumbnail)
            .service(handlers::media::media_views);
        if config_data.enable_replies {
            api = api.service(handlers::board::add_reply);
        }
        if config_data.require_secret {
            api = api.service(handlers::board::delete_post);
        }

        App::new()
            .wrap(Logger::default())
            .wrap(RequestTrace)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .app_data(web::Data::new(board.clone()))
            .app_data(limiter.clone())
            .app_data(views.clone())
            .app_data(web::Data::new(config_data.clone()))
            .app_data(MultipartFormConfig::default().total_limit(config_data.max_upload_bytes))
            .service(api)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "DELETE"])
        .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
        .max_age(3600);

    for origin in &config.cors_origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
