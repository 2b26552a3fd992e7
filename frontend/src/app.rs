use crate::components::campaigns::progress::CampaignProgress;
use crate::components::campaigns::verification::CampaignVerification;
use crate::components::data_sources::csv::CsvDataSourceComponent;
use crate::helpers::show_toast;
use crate::session::{self, SessionContext, SessionEvent};
use common::jobs::CampaignStatus;
use common::model::contact::StoredFile;
use common::session::{Session, SessionUser};
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub enum Msg {
    Session(SessionEvent),
    TokenInput(String),
    EmailInput(String),
    SignIn,
    TemplateInput(String),
    FromEmailInput(String),
    FromNameInput(String),
    FileUploaded(StoredFile),
    CampaignStarted(String),
    CampaignFinished(CampaignStatus),
}

pub struct App {
    session: Session,
    token_input: String,
    email_input: String,
    template_id: String,
    file: Option<StoredFile>,
    from_email: String,
    from_name: String,
    job_id: Option<String>,
}

impl App {
    fn session_context(&self, ctx: &Context<Self>) -> SessionContext {
        SessionContext {
            session: self.session.clone(),
            on_change: ctx.link().callback(Msg::Session),
        }
    }

    fn sign_in_view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::SignIn
        });
        html! {
            <form class="sign-in" {onsubmit}>
                <h2>{"Sign in"}</h2>
                <input
                    type="email"
                    placeholder="you@company.com"
                    value={self.email_input.clone()}
                    oninput={link.callback(|e: InputEvent| Msg::EmailInput(input_value(e)))}
                />
                <input
                    type="password"
                    placeholder="Access token"
                    value={self.token_input.clone()}
                    oninput={link.callback(|e: InputEvent| Msg::TokenInput(input_value(e)))}
                />
                <button type="submit">{"Continue"}</button>
            </form>
        }
    }

    fn campaign_view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let session = self.session_context(ctx);
        let user = self
            .session
            .user()
            .map(|u| u.name.clone().unwrap_or_else(|| u.email.clone()))
            .unwrap_or_default();
        let file_id = self.file.as_ref().map(|f| f.id.clone()).unwrap_or_default();

        html! {
            <div class="campaign-builder">
                <header class="top-bar">
                    <span class="user">{ user }</span>
                    <button class="icon-btn" title="Sign out" onclick={link.callback(|_| Msg::Session(SessionEvent::SignedOut))}>
                        <i class="material-icons">{"logout"}</i>
                    </button>
                </header>

                <section class="campaign-inputs">
                    <label>{"Template id"}
                        // Committed on blur or Enter; each commit reloads the verification.
                        <input
                            value={self.template_id.clone()}
                            onchange={link.callback(|e: Event| {
                                Msg::TemplateInput(e.target_unchecked_into::<HtmlInputElement>().value())
                            })}
                        />
                    </label>
                    <label>{"Sender address"}
                        <input
                            type="email"
                            value={self.from_email.clone()}
                            oninput={link.callback(|e: InputEvent| Msg::FromEmailInput(input_value(e)))}
                        />
                    </label>
                    <label>{"Sender name"}
                        <input
                            value={self.from_name.clone()}
                            oninput={link.callback(|e: InputEvent| Msg::FromNameInput(input_value(e)))}
                        />
                    </label>
                    <CsvDataSourceComponent
                        session={session.clone()}
                        on_uploaded={link.callback(Msg::FileUploaded)}
                    />
                </section>

                <CampaignVerification
                    session={session.clone()}
                    template_id={self.template_id.clone()}
                    file_id={file_id}
                    from_email={self.from_email.trim().to_string()}
                    from_name={Some(self.from_name.trim().to_string()).filter(|n| !n.is_empty())}
                    on_started={link.callback(Msg::CampaignStarted)}
                />

                {
                    match &self.job_id {
                        Some(job_id) => html! {
                            <CampaignProgress
                                session={session}
                                job_id={job_id.clone()}
                                on_finished={link.callback(Msg::CampaignFinished)}
                            />
                        },
                        None => html! {},
                    }
                }
            </div>
        }
    }
}

fn input_value(e: InputEvent) -> String {
    e.target_unchecked_into::<HtmlInputElement>().value()
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        App {
            session: session::load(),
            token_input: String::new(),
            email_input: String::new(),
            template_id: String::new(),
            file: None,
            from_email: String::new(),
            from_name: String::new(),
            job_id: None,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Session(event) => {
                if !self.session.is_authenticated() {
                    return false;
                }
                self.session.invalidate();
                self.job_id = None;
                session::persist(&self.session);
                match event {
                    SessionEvent::Invalidated => show_toast("Your session expired. Please sign in again."),
                    SessionEvent::SignedOut => show_toast("Signed out."),
                }
                true
            }
            Msg::TokenInput(value) => {
                self.token_input = value;
                false
            }
            Msg::EmailInput(value) => {
                self.email_input = value;
                false
            }
            Msg::SignIn => {
                let email = self.email_input.trim().to_string();
                let user = SessionUser {
                    id: email.clone(),
                    email,
                    name: None,
                };
                self.session.sign_in(self.token_input.trim(), user);
                if !self.session.is_authenticated() {
                    show_toast("Enter your access token.");
                    return false;
                }
                self.token_input.clear();
                session::persist(&self.session);
                true
            }
            Msg::TemplateInput(value) => {
                let value = value.trim().to_string();
                if value == self.template_id {
                    return false;
                }
                self.template_id = value;
                true
            }
            Msg::FromEmailInput(value) => {
                self.from_email = value;
                true
            }
            Msg::FromNameInput(value) => {
                self.from_name = value;
                true
            }
            Msg::FileUploaded(file) => {
                self.file = Some(file);
                true
            }
            Msg::CampaignStarted(job_id) => {
                self.job_id = Some(job_id);
                true
            }
            Msg::CampaignFinished(status) => {
                if let CampaignStatus::Failed(reason) = status {
                    show_toast(&format!("Campaign failed: {reason}"));
                } else {
                    show_toast("Campaign finished.");
                }
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="app">
                {
                    if self.session.is_authenticated() {
                        self.campaign_view(ctx)
                    } else {
                        self.sign_in_view(ctx)
                    }
                }
            </div>
        }
    }
}

