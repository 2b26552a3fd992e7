pub mod campaigns;
pub mod files;
pub mod templates;

use actix_web::web;

/// Registers every API scope. Paths outside these scopes fall through to the
/// embedded front end.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(templates::configure_routes())
        .service(files::configure_routes())
        .service(campaigns::configure_routes());
}
