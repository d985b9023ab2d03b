use camera::FocusTarget;
use pins::PinMetrics;
use serde::Serialize;

use crate::geocode::PlaceSuggestion;

/// What the visitor told the wizard about themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorDetails {
    pub name: String,
    pub gender: String,
    pub age_range: String,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub place: PlaceSuggestion,
    pub visitor: VisitorDetails,
}

/// Wizard → kiosk.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardMessage {
    LocationSelected(Option<FocusTarget>),
    FormSubmitted(Submission),
}

/// Kiosk → wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum KioskNotification {
    MetricsUpdated(PinMetrics),
    /// The focus deadline expired; `reset_trigger` only ever grows.
    FormReset { reset_trigger: u64 },
}
