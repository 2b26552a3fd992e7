use serde::{Deserialize, Serialize};

/// An email template as returned by the template store.
///
/// `subject` and `body` are optional on the wire; an absent field is treated
/// as empty text everywhere placeholders are extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl Template {
    pub fn subject_text(&self) -> &str {
        self.subject.as_deref().unwrap_or("")
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}
