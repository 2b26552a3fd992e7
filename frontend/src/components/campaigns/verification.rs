//! Campaign verification panel.
//!
//! Loads the chosen template and the first row of the chosen contact file,
//! runs the field mapping analysis in the browser and shows:
//!
//! - the variable -> column rows (`FieldMappingResult::column_mappings`),
//! - a blocking error listing the missing fields, or
//! - a help panel when the template has no `{VARIABLE}` at all.
//!
//! The "Send campaign" button is enabled only when the analysis is valid. The
//! backend runs the same analysis again before it starts the job.

use crate::api::{get_json, post_json, ApiError};
use crate::helpers::show_toast;
use crate::session::SessionContext;
use common::mapping::{analyze_field_mapping, FieldMappingResult, MappingStatus};
use common::model::contact::FilePreview;
use common::model::template::Template;
use common::requests::{StartCampaignRequest, StartCampaignResponse};
use yew::platform::spawn_local;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct VerificationProps {
    pub session: SessionContext,
    pub template_id: String,
    pub file_id: String,
    pub from_email: String,
    #[prop_or_default]
    pub from_name: Option<String>,
    /// Receives the job id once the backend accepted the campaign.
    pub on_started: Callback<String>,
}

/// The inputs a load was made for. Replies for anything but the current
/// props are dropped, so a slow answer for an earlier template can never
/// replace the analysis of the one on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadKey {
    template_id: String,
    file_id: String,
}

impl LoadKey {
    fn of(props: &VerificationProps) -> Self {
        LoadKey {
            template_id: props.template_id.clone(),
            file_id: props.file_id.clone(),
        }
    }

    fn is_current(&self, props: &VerificationProps) -> bool {
        self.template_id == props.template_id && self.file_id == props.file_id
    }
}

pub enum Msg {
    Loaded(LoadKey, Result<(Template, FilePreview), ApiError>),
    Submit,
    Started(Result<StartCampaignResponse, ApiError>),
}

pub struct CampaignVerification {
    template: Option<Template>,
    preview: Option<FilePreview>,
    loading: bool,
    submitting: bool,
    error: Option<String>,
}

impl CampaignVerification {
    fn load(&mut self, ctx: &Context<Self>) {
        let props = ctx.props();
        self.template = None;
        self.preview = None;
        self.error = None;
        if props.template_id.is_empty() || props.file_id.is_empty() {
            self.loading = false;
            return;
        }

        self.loading = true;
        let key = LoadKey::of(props);
        let session = props.session.clone();
        let template_url = format!("/api/templates/{}", props.template_id);
        let preview_url = format!("/api/files/{}/preview?limit=1", props.file_id);
        let link = ctx.link().clone();
        spawn_local(async move {
            let result = async {
                let template = get_json::<Template>(&session, &template_url).await?;
                let preview = get_json::<FilePreview>(&session, &preview_url).await?;
                Ok::<_, ApiError>((template, preview))
            }
            .await;
            link.send_message(Msg::Loaded(key, result));
        });
    }

    fn mapping(&self) -> FieldMappingResult {
        analyze_field_mapping(self.template.as_ref(), self.preview.as_ref())
    }
}

impl Component for CampaignVerification {
    type Message = Msg;
    type Properties = VerificationProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut component = CampaignVerification {
            template: None,
            preview: None,
            loading: false,
            submitting: false,
            error: None,
        };
        component.load(ctx);
        component
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        let props = ctx.props();
        if props.template_id != old_props.template_id || props.file_id != old_props.file_id {
            self.load(ctx);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Loaded(key, _) if !key.is_current(ctx.props()) => false,
            Msg::Loaded(_, Ok((template, preview))) => {
                self.loading = false;
                self.template = Some(template);
                self.preview = Some(preview);
                true
            }
            Msg::Loaded(_, Err(e)) => {
                self.loading = false;
                self.error = Some(e.to_string());
                true
            }
            Msg::Submit => {
                // The button is disabled in this case; keep the gate here too.
                if !self.mapping().is_valid || self.submitting {
                    return false;
                }
                self.submitting = true;

                let props = ctx.props();
                let session = props.session.clone();
                let request = StartCampaignRequest {
                    template_id: props.template_id.clone(),
                    file_id: props.file_id.clone(),
                    from_email: props.from_email.clone(),
                    from_name: props.from_name.clone(),
                };
                let link = ctx.link().clone();
                spawn_local(async move {
                    let result = post_json::<_, StartCampaignResponse>(
                        &session,
                        "/api/campaigns/start",
                        &request,
                    )
                    .await;
                    link.send_message(Msg::Started(result));
                });
                true
            }
            Msg::Started(Ok(response)) => {
                self.submitting = false;
                show_toast("Campaign started.");
                ctx.props().on_started.emit(response.job_id);
                true
            }
            Msg::Started(Err(e)) => {
                self.submitting = false;
                gloo_console::error!(format!("campaign start failed: {e}"));
                self.error = Some(e.to_string());
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        if self.loading {
            return html! { <div class="verification loading">{"Checking template fields..."}</div> };
        }

        let mapping = self.mapping();
        let can_submit = mapping.is_valid && !self.submitting && !ctx.props().from_email.is_empty();

        html! {
            <div class="verification">
                { status_panel(&mapping) }
                { mapping_table(&mapping) }
                {
                    match &self.error {
                        Some(error) => html! { <div class="verification-error">{ error }</div> },
                        None => html! {},
                    }
                }
                <button
                    class="send-btn"
                    disabled={!can_submit}
                    onclick={ctx.link().callback(|_| Msg::Submit)}
                >
                    { if self.submitting { "Starting..." } else { "Send campaign" } }
                </button>
            </div>
        }
    }
}

fn status_panel(mapping: &FieldMappingResult) -> Html {
    match mapping.status() {
        MappingStatus::NoData => html! {
            <div class="panel info">{"Choose a template and upload a contact file to check the campaign."}</div>
        },
        MappingStatus::NoVariables => html! {
            <div class="panel help">
                <strong>{"This template has no personalization fields."}</strong>
                <p>
                    {"Add at least one placeholder such as "}<code>{"{NAME}"}</code>
                    {" to the subject or body. Placeholder names must match a column of your contact file; case, spaces and punctuation are ignored."}
                </p>
            </div>
        },
        MappingStatus::AllMatched => html! {
            <div class="panel success">
                { format!("All {} template fields were found in the contact file.", mapping.matched_fields.len()) }
            </div>
        },
        MappingStatus::Missing(count) => html! {
            <div class="panel error">
                <strong>{ format!("{count} template field(s) are missing from the contact file:") }</strong>
                <ul>
                    { for mapping.missing_fields.iter().map(|field| html! { <li><code>{ format!("{{{field}}}") }</code></li> }) }
                </ul>
                <p>{"Add the missing columns to the file and upload it again, or change the template wording."}</p>
            </div>
        },
    }
}

fn mapping_table(mapping: &FieldMappingResult) -> Html {
    let rows = mapping.column_mappings();
    if rows.is_empty() {
        return html! {};
    }
    html! {
        <table class="mapping-table">
            <thead>
                <tr><th>{"Template field"}</th><th></th><th>{"File column"}</th></tr>
            </thead>
            <tbody>
                {
                    for rows.into_iter().map(|row| {
                        let matched = row.column.is_some();
                        html! {
                            <tr class={classes!(if matched { "matched" } else { "missing" })}>
                                <td><code>{ format!("{{{}}}", row.variable) }</code></td>
                                <td>{"→"}</td>
                                <td>{ row.column.unwrap_or_else(|| "not found".to_string()) }</td>
                            </tr>
                        }
                    })
                }
            </tbody>
        </table>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::session::Session;

    fn props(template_id: &str, file_id: &str) -> VerificationProps {
        VerificationProps {
            session: SessionContext {
                session: Session::default(),
                on_change: Callback::from(|_| ()),
            },
            template_id: template_id.to_string(),
            file_id: file_id.to_string(),
            from_email: "team@mailsflow.io".to_string(),
            from_name: None,
            on_started: Callback::from(|_| ()),
        }
    }

    #[test]
    fn replies_for_earlier_inputs_are_stale() {
        let key = LoadKey::of(&props("welc", "f-1"));
        assert!(key.is_current(&props("welc", "f-1")));
        assert!(!key.is_current(&props("welcome", "f-1")));
        assert!(!key.is_current(&props("welc", "f-2")));
    }
}
