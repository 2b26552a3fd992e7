use crate::config::AppConfig;
use crate::db;
use crate::error::ServiceError;
use actix_web::{web, HttpResponse};
use common::model::template::Template;

use super::store::save_template;

pub async fn process(
    config: web::Data<AppConfig>,
    payload: web::Json<Template>,
) -> Result<HttpResponse, ServiceError> {
    let conn = db::open(&config.db_path)?;
    save_template(&conn, &payload)?;
    log::info!("template {} saved", payload.id);
    Ok(HttpResponse::Ok().json(payload.into_inner()))
}
