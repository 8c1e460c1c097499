//! Presentation-side collaborators: notifications, navigation and confirmation.
//!
//! The core never talks to a UI runtime directly. A host implements these
//! traits (a desktop shell, a web bridge, or a test double) and hands them to
//! [`SpeciesDialog`](crate::SpeciesDialog).

use serde::{Deserialize, Serialize};

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), severity: Severity::Success }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), severity: Severity::Error }
    }
}

/// Fire-and-forget delivery of [`Notification`]s.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Route changes.
pub trait Navigator {
    fn go_to(&self, path: &str);

    /// Re-renders any page data that depends on the current record.
    fn refresh(&self);
}

/// A blocking yes/no prompt.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}
