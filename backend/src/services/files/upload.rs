//! `POST /api/files/upload`: stores a contact file.
//!
//! Multipart fields:
//! - `file` (required): the CSV content; the filename must end with `.csv`.
//! - `name` (optional): display name, defaults to the uploaded filename.
//!
//! The content is parsed in full before anything is written, so a file that
//! would later fail the preview never reaches the store.

use crate::config::AppConfig;
use crate::db;
use crate::error::ServiceError;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::contact::StoredFile;
use futures_util::StreamExt;
use std::fs;

use super::parse::parse_contacts;
use super::store::{file_path, insert_file};

pub async fn process(
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> Result<HttpResponse, ServiceError> {
    let stored = upload_contact_file(&config, payload).await?;
    log::info!(
        "stored contact file {} ({} rows, columns {:?})",
        stored.id,
        stored.row_count,
        stored.columns
    );
    Ok(HttpResponse::Ok().json(stored))
}

async fn upload_contact_file(
    config: &AppConfig,
    mut payload: Multipart,
) -> Result<StoredFile, ServiceError> {
    let mut display_name: Option<String> = None;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match field_name.as_deref() {
            Some("file") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                if !filename.to_ascii_lowercase().ends_with(".csv") {
                    return Err(ServiceError::BadRequest(
                        "the file must end with .csv".to_string(),
                    ));
                }

                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk?);
                }
                upload = Some((filename, bytes));
            }
            Some("name") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk?);
                }
                let name = String::from_utf8_lossy(&bytes).trim().to_string();
                if !name.is_empty() {
                    display_name = Some(name);
                }
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        upload.ok_or_else(|| ServiceError::BadRequest("missing file field".to_string()))?;

    let parsed = parse_contacts(&bytes, Some(0))?;
    if parsed.row_count == 0 {
        return Err(ServiceError::BadRequest(
            "the file has a header but no contacts".to_string(),
        ));
    }
    let row_count = u32::try_from(parsed.row_count)
        .map_err(|_| ServiceError::BadRequest("the file has too many rows".to_string()))?;

    let stored = StoredFile {
        id: uuid::Uuid::new_v4().to_string(),
        name: display_name.unwrap_or(filename),
        md5: format!("{:x}", md5::compute(&bytes)),
        columns: parsed.columns,
        row_count,
    };

    fs::create_dir_all(&config.data_dir)?;
    fs::write(file_path(&config.data_dir, &stored), &bytes)?;
    let conn = db::open(&config.db_path)?;
    insert_file(&conn, &stored)?;

    Ok(stored)
}
