//! Contact file upload.
//!
//! A hidden file input behind an icon button. The chosen file is posted as
//! multipart form data to `/api/files/upload`; the stored file's metadata is
//! handed to the parent through `on_uploaded`.

use crate::api::{post_form, ApiError};
use crate::helpers::{format_count, show_toast};
use crate::session::SessionContext;
use common::model::contact::StoredFile;
use web_sys::{FormData, HtmlInputElement};
use yew::platform::spawn_local;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct CsvDataSourceProps {
    pub session: SessionContext,
    pub on_uploaded: Callback<StoredFile>,
}

pub enum Msg {
    OpenFileDialog,
    FileSelected(web_sys::File),
    Uploaded(Result<StoredFile, ApiError>),
}

pub struct CsvDataSourceComponent {
    file_input_ref: NodeRef,
    uploading: bool,
    last_file: Option<StoredFile>,
}

impl Component for CsvDataSourceComponent {
    type Message = Msg;
    type Properties = CsvDataSourceProps;

    fn create(_ctx: &Context<Self>) -> Self {
        CsvDataSourceComponent {
            file_input_ref: NodeRef::default(),
            uploading: false,
            last_file: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::OpenFileDialog => {
                if let Some(input) = self.file_input_ref.cast::<HtmlInputElement>() {
                    input.click();
                }
                false
            }
            Msg::FileSelected(file) => {
                let form = match FormData::new() {
                    Ok(form) => form,
                    Err(_) => {
                        show_toast("Could not prepare the upload.");
                        return false;
                    }
                };
                if form
                    .append_with_blob_and_filename("file", &file, &file.name())
                    .is_err()
                {
                    show_toast("Could not prepare the upload.");
                    return false;
                }

                self.uploading = true;
                let session = ctx.props().session.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    let result = post_form::<StoredFile>(&session, "/api/files/upload", form).await;
                    link.send_message(Msg::Uploaded(result));
                });
                true
            }
            Msg::Uploaded(result) => {
                self.uploading = false;
                match result {
                    Ok(file) => {
                        show_toast(&format!(
                            "{} uploaded: {} contacts.",
                            file.name,
                            format_count(file.row_count)
                        ));
                        ctx.props().on_uploaded.emit(file.clone());
                        self.last_file = Some(file);
                    }
                    Err(e) => {
                        gloo_console::error!(format!("upload failed: {e}"));
                        show_toast(&format!("Upload failed: {e}"));
                    }
                }
                // Allow picking the same file again.
                if let Some(input) = self.file_input_ref.cast::<HtmlInputElement>() {
                    input.set_value("");
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onchange = link.batch_callback(|e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            input
                .files()
                .and_then(|files| files.get(0))
                .map(Msg::FileSelected)
        });

        html! {
            <div class="csv-data-source">
                <button
                    class="icon-btn"
                    title="Upload contact file"
                    disabled={self.uploading}
                    onclick={link.callback(|_| Msg::OpenFileDialog)}
                >
                    <i class="material-icons">{"table_chart"}</i>
                    <span class="icon-label">{ if self.uploading { "Uploading..." } else { "CSV" } }</span>
                </button>
                <input
                    type="file"
                    accept=".csv,text/csv"
                    style="display: none;"
                    ref={self.file_input_ref.clone()}
                    {onchange}
                />
                {
                    match &self.last_file {
                        Some(file) => html! {
                            <div class="csv-summary">
                                <strong>{ &file.name }</strong>
                                <span>{ format!(" - {} contacts, columns: {}", format_count(file.row_count), file.columns.join(", ")) }</span>
                            </div>
                        },
                        None => html! {},
                    }
                }
            </div>
        }
    }
}
