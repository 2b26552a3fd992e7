use crate::config::AppConfig;
use crate::db;
use crate::error::ServiceError;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::store::{get_file, load_preview};

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub limit: Option<usize>,
}

/// `GET /api/files/{file_id}`: metadata of a stored file.
pub async fn metadata(
    config: web::Data<AppConfig>,
    file_id: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let conn = db::open(&config.db_path)?;
    Ok(HttpResponse::Ok().json(get_file(&conn, &file_id)?))
}

/// `GET /api/files/{file_id}/preview?limit=N`: the first rows as `FilePreview`.
pub async fn process(
    config: web::Data<AppConfig>,
    file_id: web::Path<String>,
    query: web::Query<PreviewQuery>,
) -> Result<HttpResponse, ServiceError> {
    let limit = query.limit.unwrap_or(config.preview_rows);
    let config = config.get_ref().clone();
    let file_id = file_id.into_inner();
    let preview = web::block(move || {
        let conn = db::open(&config.db_path)?;
        load_preview(&conn, &config.data_dir, &file_id, limit)
    })
    .await??;
    Ok(HttpResponse::Ok().json(preview))
}
