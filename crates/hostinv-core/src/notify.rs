//! User-visible outcome messages for mutating workflows.

use serde::Serialize;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    /// The action succeeded.
    Success,
    /// The action failed.
    Error,
}

/// A message describing the outcome of a mutating action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity.
    pub variant: NotificationVariant,
    /// Short headline.
    pub title: String,
    /// Detail line.
    pub description: String,
}

impl Notification {
    /// Success notification titled "Success".
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            variant: NotificationVariant::Success,
            title: "Success".to_string(),
            description: description.into(),
        }
    }

    /// Error notification titled "Error".
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            variant: NotificationVariant::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }

    /// True for success notifications.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.variant, NotificationVariant::Success)
    }
}

/// Pick the singular or plural noun for `count` items.
pub(crate) fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count > 1 { many } else { one }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_variant_in_lower_case() {
        let value = serde_json::to_value(Notification::error("nope")).expect("serialize");
        assert_eq!(value["variant"], "error");
        assert_eq!(value["title"], "Error");
    }

    #[test]
    fn plural_picks_by_count() {
        assert_eq!(plural(1, "system", "systems"), "system");
        assert_eq!(plural(0, "system", "systems"), "system");
        assert_eq!(plural(3, "system", "systems"), "systems");
    }
}
