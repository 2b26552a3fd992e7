use serde::{Deserialize, Serialize};

/// Request payload for the campaign verification endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCampaignRequest {
    pub template_id: String,
    pub file_id: String,
}

/// Request payload for starting a campaign.
///
/// `from_email` is the sender identity used as the "From" address of every
/// message of the campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCampaignRequest {
    pub template_id: String,
    pub file_id: String,
    pub from_email: String,
    #[serde(default)]
    pub from_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCampaignResponse {
    pub job_id: String,
}
