//! Place-search suggestions for the wizard's location step.
//!
//! The search itself is an external service behind [`PlaceSearch`]; this
//! module owns the debounce, the minimum query length, the suggestion cap
//! and the silent recovery when a lookup fails.

use camera::FocusTarget;
use foundation::math::LngLat;
use foundation::time::Time;
use pins::PinLocation;
use runtime::{TaskToken, Timeline};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GeocodeConfig {
    pub debounce_ms: u64,
    pub min_query_chars: usize,
    pub max_suggestions: usize,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_chars: 2,
            max_suggestions: 3,
        }
    }
}

/// One geocoder hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSuggestion {
    pub id: String,
    /// Full place name, e.g. "Dallas, Texas, United States".
    pub name: String,
    /// Just the place itself, e.g. "Dallas".
    pub short_name: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub coordinates: LngLat,
    pub bbox: Option<[f64; 4]>,
}

impl PlaceSuggestion {
    pub fn focus_target(&self) -> FocusTarget {
        FocusTarget {
            name: self.name.clone(),
            center: self.coordinates,
            bbox: self.bbox,
        }
    }

    pub fn pin_location(&self) -> PinLocation {
        let country = self.country.clone().unwrap_or_else(|| "Unknown".to_string());
        let mut location = PinLocation::new(self.short_name.clone(), country, self.coordinates);
        location.state = self.state.clone();
        location.country_code = self.country_code.clone();
        location
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    Status(u16),
    Transport(String),
    Malformed(String),
}

impl std::fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodeError::Status(code) => write!(f, "geocoder returned HTTP {code}"),
            GeocodeError::Transport(msg) => write!(f, "geocoder unreachable: {msg}"),
            GeocodeError::Malformed(msg) => write!(f, "geocoder response malformed: {msg}"),
        }
    }
}

impl std::error::Error for GeocodeError {}

pub trait PlaceSearch {
    fn search(&mut self, query: &str, limit: usize) -> Result<Vec<PlaceSuggestion>, GeocodeError>;
}

/// Debounced autocomplete state.
#[derive(Debug, Default)]
pub struct SuggestionBox {
    config: GeocodeConfig,
    queries: Timeline<String>,
    pending: Option<TaskToken>,
    suggestions: Vec<PlaceSuggestion>,
}

impl SuggestionBox {
    pub fn new(config: GeocodeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Records a keystroke; the lookup runs once typing pauses.
    pub fn input(&mut self, query: &str, now: Time) {
        if let Some(token) = self.pending.take() {
            self.queries.cancel(token);
        }
        let due = now.after(self.config.debounce_ms);
        self.pending = Some(self.queries.schedule_at(due, query.to_string()));
    }

    /// Runs the debounced lookup if it is due. Returns `true` when the
    /// suggestion list changed.
    pub fn poll(&mut self, now: Time, search: &mut dyn PlaceSearch) -> bool {
        let Some(query) = self.queries.drain_due(now).pop().map(|(_, q)| q) else {
            return false;
        };
        self.pending = None;

        if query.trim().chars().count() < self.config.min_query_chars {
            let had = !self.suggestions.is_empty();
            self.suggestions.clear();
            return had;
        }

        match search.search(query.trim(), self.config.max_suggestions) {
            Ok(mut hits) => {
                hits.truncate(self.config.max_suggestions);
                debug!(query = %query, hits = hits.len(), "place suggestions");
                self.suggestions = hits;
            }
            Err(err) => {
                warn!(query = %query, error = %err, "place search failed");
                self.suggestions.clear();
            }
        }
        true
    }

    pub fn suggestions(&self) -> &[PlaceSuggestion] {
        &self.suggestions
    }

    pub fn is_visible(&self) -> bool {
        !self.suggestions.is_empty()
    }

    pub fn choose(&mut self, index: usize) -> Option<PlaceSuggestion> {
        if index >= self.suggestions.len() {
            return None;
        }
        let chosen = self.suggestions.swap_remove(index);
        self.clear();
        Some(chosen)
    }

    pub fn clear(&mut self) {
        if let Some(token) = self.pending.take() {
            self.queries.cancel(token);
        }
        self.suggestions.clear();
    }
}

/// Fixed gazetteer lookup; stands in for the hosted geocoder offline.
#[derive(Debug, Clone, Default)]
pub struct StaticGazetteer {
    places: Vec<PlaceSuggestion>,
}

impl StaticGazetteer {
    pub fn new(places: Vec<PlaceSuggestion>) -> Self {
        Self { places }
    }

    /// Gazetteer built from the seed city list.
    pub fn world_cities() -> Self {
        let places = pins::WORLD_CITIES
            .iter()
            .map(|c| PlaceSuggestion {
                id: format!("place.{}", c.city_name.to_ascii_lowercase().replace(' ', "-")),
                name: format!("{}, {}", c.city_name, c.country),
                short_name: c.city_name.to_string(),
                state: None,
                country: Some(c.country.to_string()),
                country_code: Some(c.country_code.to_string()),
                coordinates: LngLat::wrapped(c.lng, c.lat),
                bbox: None,
            })
            .collect();
        Self { places }
    }
}

impl PlaceSearch for StaticGazetteer {
    fn search(&mut self, query: &str, limit: usize) -> Result<Vec<PlaceSuggestion>, GeocodeError> {
        let needle = query.to_lowercase();
        Ok(self
            .places
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }
}
