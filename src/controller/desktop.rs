use std::str::FromStr;

use serde_json::Value;

use crate::error::ApiError;
use crate::form::{AutomationForm, FieldErrors};
use crate::normalize::{self, JobResult};
use crate::types::{AppName, AutomationRequest, DesktopAction, DesktopRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DesktopField {
    AppName,
    Action,
    Text,
}

/// Raw selections as the user left them; parsed on validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopDraft {
    pub app_name: String,
    pub action: String,
    pub text: String,
}

impl Default for DesktopDraft {
    fn default() -> Self {
        Self {
            app_name: AppName::Notepad.to_string(),
            action: DesktopAction::Type.to_string(),
            text: String::new(),
        }
    }
}

impl DesktopDraft {
    pub fn parsed_action(&self) -> Option<DesktopAction> {
        DesktopAction::from_str(&self.action).ok()
    }

    /// Whether the text field is part of the form at all.
    pub fn shows_text(&self) -> bool {
        self.parsed_action().is_some_and(DesktopAction::takes_text)
    }
}

fn parse_field<T: FromStr>(
    raw: &str,
    field: DesktopField,
    unsupported: &str,
    errors: &mut FieldErrors<DesktopField>,
) -> Option<T> {
    if raw.is_empty() {
        errors.add(field, "Required");
        return None;
    }
    let parsed = T::from_str(raw).ok();
    if parsed.is_none() {
        errors.add(field, unsupported);
    }
    parsed
}

impl AutomationForm for DesktopDraft {
    type Field = DesktopField;
    type Outcome = JobResult;

    fn check(&self) -> Result<AutomationRequest, FieldErrors<DesktopField>> {
        let mut errors = FieldErrors::default();
        let app_name = parse_field::<AppName>(
            &self.app_name,
            DesktopField::AppName,
            "Unsupported application",
            &mut errors,
        );
        let action = parse_field::<DesktopAction>(
            &self.action,
            DesktopField::Action,
            "Unsupported action",
            &mut errors,
        );

        // Cross-field: text only matters for actions that type something.
        let text = match action {
            Some(action) if action.takes_text() => {
                if self.text.is_empty() {
                    errors.add(DesktopField::Text, "Text is required for this action");
                }
                Some(self.text.clone())
            }
            _ => None,
        };

        match (app_name, action) {
            (Some(app_name), Some(action)) if errors.is_empty() => {
                Ok(AutomationRequest::Desktop(DesktopRequest {
                    app_name,
                    action,
                    text,
                }))
            }
            _ => Err(errors),
        }
    }

    fn decode(body: Value) -> Result<JobResult, ApiError> {
        normalize::decode_job(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DesktopController;
    use crate::payload::{self, Payload};
    use serde_json::json;

    fn draft(app: &str, action: &str, text: &str) -> DesktopDraft {
        DesktopDraft {
            app_name: app.into(),
            action: action.into(),
            text: text.into(),
        }
    }

    #[test]
    fn test_defaults() {
        let d = DesktopDraft::default();
        assert_eq!(d.app_name, "notepad");
        assert_eq!(d.action, "type");
        assert!(d.shows_text());
        assert_eq!(
            d.validate().messages(DesktopField::Text),
            ["Text is required for this action"]
        );
    }

    #[test]
    fn test_open_chrome_without_text() {
        let request = draft("chrome", "open", "").check().unwrap();
        let Payload::Json(body) = payload::build(&request).unwrap() else {
            panic!("desktop payload must be json");
        };
        assert_eq!(body, json!({"appName": "chrome", "action": "open"}));
    }

    #[test]
    fn test_type_requires_text() {
        let mut controller = DesktopController::new(draft("notepad", "type", ""));
        assert!(controller.begin_submit().is_none());
        assert_eq!(
            controller.form().visible_errors(DesktopField::Text),
            ["Text is required for this action"]
        );
    }

    #[test]
    fn test_press_requires_text_too() {
        assert!(draft("calculator", "press", "").validate().has(DesktopField::Text));
        assert!(draft("calculator", "press", "ctrl+c").validate().is_empty());
    }

    #[test]
    fn test_stale_text_dropped_for_close() {
        let Ok(AutomationRequest::Desktop(req)) = draft("paint", "close", "leftover").check() else {
            panic!("expected a desktop request");
        };
        assert_eq!(req.text, None);
    }

    #[test]
    fn test_unknown_values() {
        let errors = draft("excel", "", "").validate();
        assert_eq!(errors.messages(DesktopField::AppName), ["Unsupported application"]);
        assert_eq!(errors.messages(DesktopField::Action), ["Required"]);
        // Without a known action the text rule is not evaluated.
        assert!(!errors.has(DesktopField::Text));

        let errors = draft("", "wiggle", "").validate();
        assert_eq!(errors.messages(DesktopField::AppName), ["Required"]);
        assert_eq!(errors.messages(DesktopField::Action), ["Unsupported action"]);
    }

    #[test]
    fn test_validation_is_idempotent() {
        for d in [draft("excel", "type", ""), draft("notepad", "type", ""), draft("", "wiggle", "x")] {
            assert_eq!(d.validate(), d.validate());
        }
    }

    #[test]
    fn test_switching_action_clears_text_error() {
        let mut controller = DesktopController::default();
        controller.blur(DesktopField::Text);
        assert!(!controller.form().visible_errors(DesktopField::Text).is_empty());
        controller.edit(|d| d.action = "open".into());
        assert!(controller.form().visible_errors(DesktopField::Text).is_empty());
    }
}
