use foundation::time::Time;
use pins::PinMetrics;
use serde::Serialize;
use tracing::{debug, info};

use crate::channel::{KioskNotification, Submission, VisitorDetails, WizardMessage};
use crate::geocode::{GeocodeConfig, PlaceSearch, PlaceSuggestion, SuggestionBox};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    /// How long the "pin added" screen stays up before the form clears.
    pub pin_added_ms: u64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self { pin_added_ms: 3_000 }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum WizardStep {
    Location,
    Name,
    Gender,
    Age,
    Contact,
    PinAdded,
}

impl WizardStep {
    fn next(self) -> Self {
        match self {
            WizardStep::Location => WizardStep::Name,
            WizardStep::Name => WizardStep::Gender,
            WizardStep::Gender => WizardStep::Age,
            WizardStep::Age => WizardStep::Contact,
            WizardStep::Contact | WizardStep::PinAdded => WizardStep::PinAdded,
        }
    }
}

/// Headless version of the touchscreen form.
///
/// Only presence of required answers is checked. Outbound messages queue
/// until [`FormWizard::take_messages`].
#[derive(Debug)]
pub struct FormWizard {
    config: WizardConfig,
    step: WizardStep,
    suggestions: SuggestionBox,
    place: Option<PlaceSuggestion>,
    answers: VisitorDetails,
    focus_requested: bool,
    clear_at: Option<Time>,
    reset_trigger: u64,
    metrics: Option<PinMetrics>,
    outbox: Vec<WizardMessage>,
}

impl FormWizard {
    pub fn new(config: WizardConfig, geocode: GeocodeConfig) -> Self {
        Self {
            config,
            step: WizardStep::Location,
            suggestions: SuggestionBox::new(geocode),
            place: None,
            answers: VisitorDetails::default(),
            focus_requested: false,
            clear_at: None,
            reset_trigger: 0,
            metrics: None,
            outbox: Vec::new(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn reset_trigger(&self) -> u64 {
        self.reset_trigger
    }

    /// Latest leaderboard pushed by the kiosk.
    pub fn metrics(&self) -> Option<&PinMetrics> {
        self.metrics.as_ref()
    }

    pub fn suggestions(&self) -> &[PlaceSuggestion] {
        self.suggestions.suggestions()
    }

    pub fn type_location(&mut self, text: &str, now: Time) {
        if self.step == WizardStep::Location {
            self.suggestions.input(text, now);
        }
    }

    /// Picks a suggestion, asks the globe to focus on it and moves on.
    pub fn select_suggestion(&mut self, index: usize) -> bool {
        if self.step != WizardStep::Location {
            return false;
        }
        let Some(place) = self.suggestions.choose(index) else {
            return false;
        };
        debug!(place = %place.name, "location chosen");
        self.outbox
            .push(WizardMessage::LocationSelected(Some(place.focus_target())));
        self.focus_requested = true;
        self.place = Some(place);
        self.step = WizardStep::Name;
        true
    }

    /// Answers the current question.
    pub fn answer(&mut self, value: &str) {
        let value = value.trim().to_string();
        match self.step {
            WizardStep::Name => self.answers.name = value,
            WizardStep::Gender => self.answers.gender = value,
            WizardStep::Age => self.answers.age_range = value,
            WizardStep::Contact => self.answers.contact = Some(value).filter(|v| !v.is_empty()),
            WizardStep::Location | WizardStep::PinAdded => {}
        }
    }

    pub fn can_advance(&self) -> bool {
        match self.step {
            WizardStep::Location => self.place.is_some(),
            WizardStep::Name => !self.answers.name.is_empty(),
            WizardStep::Gender => !self.answers.gender.is_empty(),
            WizardStep::Age => !self.answers.age_range.is_empty(),
            WizardStep::Contact => true,
            WizardStep::PinAdded => false,
        }
    }

    /// Advances one step; submitting on the last question.
    pub fn next(&mut self, now: Time) -> bool {
        if !self.can_advance() {
            return false;
        }
        if self.step == WizardStep::Contact {
            let Some(place) = self.place.clone() else {
                return false;
            };
            info!(place = %place.short_name, visitor = %self.answers.name, "form submitted");
            self.outbox.push(WizardMessage::FormSubmitted(Submission {
                place,
                visitor: self.answers.clone(),
            }));
            self.clear_at = Some(now.after(self.config.pin_added_ms));
        }
        self.step = self.step.next();
        true
    }

    /// Drives the debounced search and the "pin added" timer.
    pub fn poll(&mut self, now: Time, search: &mut dyn PlaceSearch) {
        self.suggestions.poll(now, search);

        let Some(at) = self.clear_at else {
            return;
        };
        if now < at {
            return;
        }
        self.clear();
        if self.focus_requested {
            self.outbox.push(WizardMessage::LocationSelected(None));
        }
        self.focus_requested = false;
    }

    pub fn receive(&mut self, notification: &KioskNotification) {
        match notification {
            KioskNotification::MetricsUpdated(metrics) => self.metrics = Some(metrics.clone()),
            KioskNotification::FormReset { reset_trigger } => {
                if *reset_trigger > self.reset_trigger {
                    info!(reset_trigger, "wizard reset by kiosk");
                    self.reset_trigger = *reset_trigger;
                    self.clear();
                    // The globe is already on its way out.
                    self.focus_requested = false;
                }
            }
        }
    }

    pub fn take_messages(&mut self) -> Vec<WizardMessage> {
        std::mem::take(&mut self.outbox)
    }

    fn clear(&mut self) {
        self.step = WizardStep::Location;
        self.place = None;
        self.answers = VisitorDetails::default();
        self.suggestions.clear();
        self.clear_at = None;
    }
}
