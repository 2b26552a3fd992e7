//! Contact file uploads and previews.
//!
//! - `POST /api/files/upload`: multipart upload of a CSV file; answers with the
//!   `StoredFile` metadata (id, columns, row count).
//! - `GET /api/files/{file_id}`: the stored metadata.
//! - `GET /api/files/{file_id}/preview?limit=N`: the first rows of the file as
//!   a `FilePreview`, the shape the field mapping analysis consumes.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

pub mod parse;
mod preview;
pub mod store;
mod upload;

const API_PATH: &str = "/api/files";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/{file_id}", get().to(preview::metadata))
        .route("/{file_id}/preview", get().to(preview::process))
}
