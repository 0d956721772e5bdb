use actix_files::NamedFile;
use actix_web::{Error, HttpResponse, error::ErrorNotFound, get, web};
use serde_json::json;
use tracing::debug;

use crate::application::rate_limit::{Action, RateLimiter};
use crate::application::view_counter::ViewCounter;
use crate::infrastructure::config::AppConfig;
use crate::presentation::utils::ClientIdentity;

/// The core stores filenames verbatim, but serving refuses anything with
/// path components so a request cannot walk out of the media directory.
fn reject_traversal(filename: &str) -> Result<(), Error> {
    if filename.is_empty() || filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(ErrorNotFound("no such file"));
    }
    Ok(())
}

#[get("/media/{filename}")]
async fn serve_media(
    client: ClientIdentity,
    limiter: web::Data<RateLimiter>,
    views: web::Data<ViewCounter>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<NamedFile, Error> {
    let filename = path.into_inner();
    limiter.check(&client.0, Action::ViewMedia).await?;
    reject_traversal(&filename)?;

    let file = NamedFile::open_async(config.media_path.join(&filename))
        .await
        .map_err(|_| ErrorNotFound("no such file"))?;

    let count = views.increment(&filename).await;
    debug!(file = %filename, views = count, "media served");
    Ok(file)
}

#[get("/thumbnails/{filename}")]
async fn serve_thumbnail(
    client: ClientIdentity,
    limiter: web::Data<RateLimiter>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<NamedFile, Error> {
    let filename = path.into_inner();
    limiter.check(&client.0, Action::ViewMedia).await?;
    reject_traversal(&filename)?;

    NamedFile::open_async(config.thumbnail_path.join(&filename))
        .await
        .map_err(|_| ErrorNotFound("no such file"))
}

#[get("/views/{filename}")]
async fn media_views(
    views: web::Data<ViewCounter>,
    path: web::Path<String>,
) -> HttpResponse {
    let filename = path.into_inner();
    let count = views.get(&filename).await;
    HttpResponse::Ok().json(json!({ "resource": filename, "views": count }))
}
