//! # Template Service Module
//!
//! Routes under `/api/templates`:
//!
//! *   **`POST /save`** (`save::process`): creates or replaces a template. The
//!     payload is a `Template` with a non-empty `id`, a `name` and optional
//!     `subject`/`body`.
//! *   **`GET /{template_id}`** (`get::process`): returns the stored template
//!     or `404` when it does not exist.
//!
//! The `store` functions are also used by the campaign services, which need
//! the template text to run the field mapping analysis.

mod get;
mod save;
pub mod store;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/templates";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/save", post().to(save::process))
        .route("/{template_id}", get().to(get::process))
}
