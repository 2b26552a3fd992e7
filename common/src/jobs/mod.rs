use serde::{Deserialize, Serialize};

/// Status of a campaign send job, as served by the status endpoint and
/// polled by the progress view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Pending,
    /// `processed` counts every contact handled so far, sent or skipped.
    InProgress { processed: u32, total: u32 },
    Completed { sent: u32, skipped: u32 },
    Failed(String),
}

impl CampaignStatus {
    /// Once terminal, the status never changes again and polling can stop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Completed { .. } | CampaignStatus::Failed(_))
    }

    /// Completion in percent, rounded down. Terminal states report 100.
    pub fn percent(&self) -> u32 {
        match self {
            CampaignStatus::Pending => 0,
            CampaignStatus::InProgress { total: 0, .. } => 0,
            CampaignStatus::InProgress { processed, total } => {
                (u64::from(*processed) * 100 / u64::from(*total)).min(100) as u32
            }
            CampaignStatus::Completed { .. } | CampaignStatus::Failed(_) => 100,
        }
    }
}
