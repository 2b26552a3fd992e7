//! Browser side of the session.
//!
//! The `common::session::Session` value lives in the `App` component and is
//! handed to every view inside a `SessionContext`. Views never read browser
//! storage themselves: they report changes through `on_change` and `App`
//! applies them and persists the result under a single storage key.

use common::session::Session;
use yew::Callback;

const STORAGE_KEY: &str = "mailsflow.session";

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The backend rejected our credentials.
    Invalidated,
    SignedOut,
}

#[derive(Clone, PartialEq)]
pub struct SessionContext {
    pub session: Session,
    pub on_change: Callback<SessionEvent>,
}

impl SessionContext {
    /// Runs the session's invalidation hook for a response status and tells
    /// the owner when the session was cleared. Returns whether it was.
    pub fn observe_status(&self, status: u16) -> bool {
        let mut session = self.session.clone();
        let invalidated = session.on_response_status(status);
        if invalidated {
            self.on_change.emit(SessionEvent::Invalidated);
        }
        invalidated
    }
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn load() -> Session {
    local_storage()
        .and_then(|storage| storage.get_item(STORAGE_KEY).ok().flatten())
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

pub fn persist(session: &Session) {
    let Some(storage) = local_storage() else {
        return;
    };
    if session.is_authenticated() {
        match serde_json::to_string(session) {
            Ok(json) => {
                let _ = storage.set_item(STORAGE_KEY, &json);
            }
            Err(e) => gloo_console::error!(format!("could not store session: {e}")),
        }
    } else {
        let _ = storage.remove_item(STORAGE_KEY);
    }
}
