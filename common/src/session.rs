//! Authenticated session state.
//!
//! A `Session` is the single source of truth for "who is signed in". It is set
//! once at sign-in and cleared either explicitly (sign-out) or when the backend
//! answers a request with an authentication failure, through
//! [`Session::on_response_status`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: Option<String>,
    user: Option<SessionUser>,
}

impl Session {
    pub fn signed_in(token: impl Into<String>, user: SessionUser) -> Self {
        let mut session = Session::default();
        session.sign_in(token, user);
        session
    }

    pub fn sign_in(&mut self, token: impl Into<String>, user: SessionUser) {
        let token = token.into();
        // A blank token is never a valid credential.
        if token.trim().is_empty() {
            self.invalidate();
            return;
        }
        self.token = Some(token);
        self.user = Some(user);
    }

    /// Clears the token and the user together.
    pub fn invalidate(&mut self) {
        self.token = None;
        self.user = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// Value of the `Authorization` header for authenticated requests.
    pub fn bearer_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    /// Invalidates the session on 401/403. Returns `true` when it did, so the
    /// caller can redirect to sign-in.
    pub fn on_response_status(&mut self, status: u16) -> bool {
        if matches!(status, 401 | 403) && self.is_authenticated() {
            self.invalidate();
            return true;
        }
        false
    }
}
