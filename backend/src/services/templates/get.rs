//! `GET /api/templates/{template_id}`: returns the template as JSON, `404` when
//! it is unknown.

use crate::config::AppConfig;
use crate::db;
use crate::error::ServiceError;
use actix_web::{web, HttpResponse};

use super::store::get_template;

pub async fn process(
    config: web::Data<AppConfig>,
    template_id: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let conn = db::open(&config.db_path)?;
    let template = get_template(&conn, &template_id)?;
    Ok(HttpResponse::Ok().json(template))
}
