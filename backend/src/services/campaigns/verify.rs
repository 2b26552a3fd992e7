//! `POST /api/campaigns/verify`: runs the field mapping analysis for a stored
//! template against a stored contact file.

use crate::config::AppConfig;
use crate::db;
use crate::error::ServiceError;
use crate::services::files::store::{get_file, preview_file};
use crate::services::templates::store::get_template;
use actix_web::{web, HttpResponse};
use common::mapping::{analyze_field_mapping, FieldMappingResult};
use common::model::contact::StoredFile;
use common::model::template::Template;
use common::requests::VerifyCampaignRequest;
use rusqlite::Connection;

pub(crate) async fn process(
    config: web::Data<AppConfig>,
    req: web::Json<VerifyCampaignRequest>,
) -> Result<HttpResponse, ServiceError> {
    let req = req.into_inner();
    let config = config.get_ref().clone();
    let (req, result) = web::block(move || {
        let conn = db::open(&config.db_path)?;
        let result = verify_campaign(&conn, &config, &req.template_id, &req.file_id)?;
        Ok::<_, ServiceError>((req, result))
    })
    .await??;
    log::info!(
        "verified template {} against file {}: matched {:?}, missing {:?}",
        req.template_id,
        req.file_id,
        result.matched_fields,
        result.missing_fields
    );
    Ok(HttpResponse::Ok().json(result))
}

/// A template and a contact file, loaded together with their analysis.
pub struct CheckedCampaign {
    pub template: Template,
    pub file: StoredFile,
    pub mapping: FieldMappingResult,
}

/// Loads both sides and analyzes them. Only the first row of the file is
/// parsed, since it alone defines the available columns.
pub fn check_campaign(
    conn: &Connection,
    config: &AppConfig,
    template_id: &str,
    file_id: &str,
) -> Result<CheckedCampaign, ServiceError> {
    let template = get_template(conn, template_id)?;
    let file = get_file(conn, file_id)?;
    let preview = preview_file(&config.data_dir, &file, 1)?;
    let mapping = analyze_field_mapping(Some(&template), Some(&preview));
    Ok(CheckedCampaign {
        template,
        file,
        mapping,
    })
}

pub fn verify_campaign(
    conn: &Connection,
    config: &AppConfig,
    template_id: &str,
    file_id: &str,
) -> Result<FieldMappingResult, ServiceError> {
    Ok(check_campaign(conn, config, template_id, file_id)?.mapping)
}
