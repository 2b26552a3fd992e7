//! Tracks the state of campaign send jobs running in the background.
//!
//! - `JobsState`: clonable handle on the job map, shared with handlers as
//!   `web::Data`.
//! - `JobUpdate`: a status change reported by a running job.
//! - `start_job_updater`: the only writer of the job map after a job has been
//!   registered; it drains `JobUpdate`s from an mpsc channel.

use common::jobs::CampaignStatus;
use std::time::{Duration, Instant};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Latest status of a job and, once it is terminal, when it got there.
#[derive(Debug, Clone)]
pub struct JobEntry {
    pub status: CampaignStatus,
    finished_at: Option<Instant>,
}

pub type JobMap = Arc<RwLock<HashMap<String, JobEntry>>>;

#[derive(Clone)]
pub struct JobsState {
    /// Job id -> latest status. Read by the status endpoint.
    pub jobs: JobMap,

    /// Background jobs push their progress here instead of locking `jobs`.
    pub tx: mpsc::Sender<JobUpdate>,
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: CampaignStatus,
}

impl JobsState {
    /// Creates the shared state and the receiving end for `start_job_updater`.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(buffer);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Registers a new job as `Pending`.
    pub async fn register(&self, job_id: &str) {
        self.jobs.write().await.insert(
            job_id.to_string(),
            JobEntry {
                status: CampaignStatus::Pending,
                finished_at: None,
            },
        );
    }

    pub async fn status(&self, job_id: &str) -> Option<CampaignStatus> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .map(|entry| entry.status.clone())
    }
}

/// Applies `JobUpdate`s to the job map until every sender is dropped.
///
/// A job that already reached a terminal status keeps it; late progress
/// messages cannot move it back to `InProgress`. Finished jobs are dropped
/// from the map once they are older than `retention`.
pub async fn start_job_updater(
    jobs: JobMap,
    mut rx: mpsc::Receiver<JobUpdate>,
    retention: Duration,
) {
    while let Some(update) = rx.recv().await {
        let now = Instant::now();
        let mut jobs = jobs.write().await;
        apply_update(&mut jobs, update, now);
        let evicted = evict_finished(&mut jobs, now, retention);
        if evicted > 0 {
            log::debug!("evicted {evicted} finished jobs");
        }
    }
}

fn apply_update(jobs: &mut HashMap<String, JobEntry>, update: JobUpdate, now: Instant) {
    let finished = jobs
        .get(&update.job_id)
        .is_some_and(|entry| entry.status.is_terminal());
    if finished {
        log::debug!(
            "ignoring update for finished job {}: {:?}",
            update.job_id,
            update.status
        );
        return;
    }
    let finished_at = update.status.is_terminal().then_some(now);
    jobs.insert(
        update.job_id,
        JobEntry {
            status: update.status,
            finished_at,
        },
    );
}

fn evict_finished(
    jobs: &mut HashMap<String, JobEntry>,
    now: Instant,
    retention: Duration,
) -> usize {
    let before = jobs.len();
    jobs.retain(|_, entry| {
        entry
            .finished_at
            .is_none_or(|at| now.saturating_duration_since(at) < retention)
    });
    before - jobs.len()
}
