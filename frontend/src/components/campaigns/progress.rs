//! Campaign progress view.
//!
//! Polls `/api/campaigns/status/{job_id}` on a fixed interval. The interval is
//! owned by the component as an `Option<Interval>`: dropping it cancels the
//! timer, and it is dropped as soon as a terminal status arrives, when the job
//! id changes, when the session expires, and when the component is destroyed.

use crate::api::{get_json, ApiError};
use crate::helpers::format_count;
use crate::session::SessionContext;
use common::jobs::CampaignStatus;
use gloo_timers::callback::Interval;
use yew::platform::spawn_local;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ProgressProps {
    pub session: SessionContext,
    pub job_id: String,
    #[prop_or(2000)]
    pub interval_ms: u32,
    #[prop_or_default]
    pub on_finished: Callback<CampaignStatus>,
}

pub enum Msg {
    Tick,
    Status {
        generation: u32,
        result: Result<CampaignStatus, ApiError>,
    },
}

/// Request bookkeeping of the poller.
///
/// Every (re)start bumps `generation`; a reply is applied only when it
/// carries the current generation and polling is still active, so answers
/// for a previous job id or after a stop are ignored.
#[derive(Debug, Default)]
struct PollState {
    generation: u32,
    active: bool,
    in_flight: bool,
}

impl PollState {
    fn restart(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.active = true;
        self.in_flight = false;
    }

    fn stop(&mut self) {
        self.active = false;
    }

    /// The generation to tag a new request with, or `None` when no request
    /// should be sent now.
    fn begin_request(&mut self) -> Option<u32> {
        if !self.active || self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(self.generation)
    }

    /// Whether a reply tagged `generation` belongs to the current poll.
    fn accept(&mut self, generation: u32) -> bool {
        if generation != self.generation {
            return false;
        }
        self.in_flight = false;
        self.active
    }
}

pub struct CampaignProgress {
    status: CampaignStatus,
    poll: Option<Interval>,
    state: PollState,
    error: Option<String>,
}

impl CampaignProgress {
    fn start_polling(&mut self, ctx: &Context<Self>) {
        self.state.restart();
        let link = ctx.link().clone();
        self.poll = Some(Interval::new(ctx.props().interval_ms, move || {
            link.send_message(Msg::Tick)
        }));
        ctx.link().send_message(Msg::Tick);
    }

    fn stop_polling(&mut self) {
        // Dropping the interval clears the timer.
        self.poll = None;
        self.state.stop();
    }
}

impl Component for CampaignProgress {
    type Message = Msg;
    type Properties = ProgressProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut component = CampaignProgress {
            status: CampaignStatus::Pending,
            poll: None,
            state: PollState::default(),
            error: None,
        };
        component.start_polling(ctx);
        component
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        let props = ctx.props();
        if props.job_id != old_props.job_id || props.interval_ms != old_props.interval_ms {
            self.stop_polling();
            if props.job_id != old_props.job_id {
                self.status = CampaignStatus::Pending;
                self.error = None;
            }
            if !self.status.is_terminal() {
                self.start_polling(ctx);
            }
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Tick => {
                let Some(generation) = self.state.begin_request() else {
                    return false;
                };
                let session = ctx.props().session.clone();
                let url = format!("/api/campaigns/status/{}", ctx.props().job_id);
                let link = ctx.link().clone();
                spawn_local(async move {
                    let result = get_json::<CampaignStatus>(&session, &url).await;
                    link.send_message(Msg::Status { generation, result });
                });
                false
            }
            Msg::Status { generation, result } => {
                if !self.state.accept(generation) {
                    return false;
                }
                match result {
                    Ok(status) => {
                        self.error = None;
                        if status.is_terminal() {
                            self.stop_polling();
                            ctx.props().on_finished.emit(status.clone());
                        }
                        self.status = status;
                    }
                    Err(ApiError::SessionExpired) => {
                        self.stop_polling();
                        self.error = Some(ApiError::SessionExpired.to_string());
                    }
                    Err(e) => {
                        gloo_console::warn!(format!("status poll failed: {e}"));
                        self.error = Some(e.to_string());
                    }
                }
                true
            }
        }
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        let percent = self.status.percent();
        let label = match &self.status {
            CampaignStatus::Pending => "Waiting to start...".to_string(),
            CampaignStatus::InProgress { processed, total } => format!(
                "{} of {} contacts processed",
                format_count(*processed),
                format_count(*total)
            ),
            CampaignStatus::Completed { sent, skipped } if *skipped > 0 => format!(
                "Done: {} messages queued, {} contacts skipped (no valid email)",
                format_count(*sent),
                format_count(*skipped)
            ),
            CampaignStatus::Completed { sent, .. } => {
                format!("Done: {} messages queued", format_count(*sent))
            }
            CampaignStatus::Failed(reason) => format!("The campaign failed: {reason}"),
        };
        let failed = matches!(self.status, CampaignStatus::Failed(_));

        html! {
            <div class={classes!("campaign-progress", failed.then_some("failed"))}>
                <div class="progress-bar">
                    <div class="progress-fill" style={format!("width: {percent}%;")} />
                </div>
                <div class="progress-label">{ label }</div>
                {
                    match &self.error {
                        Some(error) => html! { <div class="progress-error">{ error }</div> },
                        None => html! {},
                    }
                }
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.stop_polling();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_request_at_a_time() {
        let mut state = PollState::default();
        assert_eq!(state.begin_request(), None);

        state.restart();
        let first = state.begin_request().unwrap();
        assert_eq!(state.begin_request(), None);
        assert!(state.accept(first));
        assert!(state.begin_request().is_some());
    }

    #[test]
    fn replies_for_a_previous_job_are_ignored() {
        let mut state = PollState::default();
        state.restart();
        let old_job = state.begin_request().unwrap();

        // The job id changes while the old request is still pending.
        state.stop();
        state.restart();
        let new_job = state.begin_request().unwrap();
        assert_ne!(old_job, new_job);

        assert!(!state.accept(old_job));
        assert!(state.accept(new_job));
    }

    #[test]
    fn replies_after_stop_are_ignored() {
        let mut state = PollState::default();
        state.restart();
        let generation = state.begin_request().unwrap();
        state.stop();
        assert!(!state.accept(generation));
        assert_eq!(state.begin_request(), None);
    }
}
