//! Transient notifications surfaced by the session.

use domain::Messages;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A transient message for the user, e.g. a failed lookup.
///
/// Notices never change the draft. The UI shows one and then clears it with
/// [`WizardSession::take_notice`](crate::WizardSession::take_notice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub key: String,
    /// Technical detail for logs; not meant for display.
    pub detail: Option<String>,
}

impl Notice {
    pub fn warning(key: &str, detail: impl Into<Option<String>>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            key: key.to_string(),
            detail: detail.into(),
        }
    }

    pub fn error(key: &str, detail: impl Into<Option<String>>) -> Self {
        Self {
            level: NoticeLevel::Error,
            key: key.to_string(),
            detail: detail.into(),
        }
    }

    /// Display text, falling back to the key when the table lacks it.
    pub fn text<'a>(&'a self, messages: &'a Messages) -> &'a str {
        messages.text_or(&self.key, &self.key)
    }
}
