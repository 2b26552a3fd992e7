use crate::error::ServiceError;
use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse};

/// `GET /api/campaigns/status/{job_id}`: the latest `CampaignStatus` of a job.
pub(crate) async fn process(
    job_id: web::Path<String>,
    state: web::Data<JobsState>,
) -> Result<HttpResponse, ServiceError> {
    match state.status(&job_id).await {
        Some(status) => Ok(HttpResponse::Ok().json(status)),
        None => Err(ServiceError::not_found("campaign job", &job_id)),
    }
}
