use std::collections::BTreeMap;

use foundation::ids::IdAllocator;
use foundation::math::LngLat;
use foundation::time::Time;
use serde::Serialize;
use tracing::debug;

use crate::pin::{CityKey, Pin, PinError, PinId, PinLocation};
use crate::ranking::{CityRanking, PinMetrics, RecentVisitor, rank_groups};

/// Pins closer than this (in degrees, ~11 km) merge into the existing pin.
pub const DEFAULT_PROXIMITY_THRESHOLD_DEG: f64 = 0.1;

/// Cosmetic multiplier from pin count to the "visitors" figure on screen.
pub const DEFAULT_VISITOR_SCALE: u64 = 100;

/// How many entries `MetricsUpdated` carries in each list.
pub const METRICS_LIST_LEN: usize = 3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PinStoreConfig {
    pub proximity_threshold_deg: f64,
    pub visitor_scale: u64,
}

impl Default for PinStoreConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_deg: DEFAULT_PROXIMITY_THRESHOLD_DEG,
            visitor_scale: DEFAULT_VISITOR_SCALE,
        }
    }
}

/// Pins bucketed by [`CityKey`]. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityGroup {
    pub key: CityKey,
    pub count: u32,
    /// Coordinates of the group's most recent pin; markers sit here.
    pub representative: LngLat,
    pub latest: Time,
    pub latest_user: String,
    pub country_code: Option<String>,
    pub pin_ids: Vec<PinId>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Appended,
    Merged { into: PinId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddedPin {
    pub pin: Pin,
    pub outcome: AddOutcome,
    /// `true` when this submission created a city group that did not exist.
    pub is_new_city: bool,
}

/// Single source of truth for every pin on the globe.
///
/// Each city group has a tally that every seed, append and merge bumps;
/// `Pin::total_city_pins` mirrors the tally on every pin of the group.
#[derive(Debug, Clone, Default)]
pub struct PinStore {
    config: PinStoreConfig,
    pins: Vec<Pin>,
    tallies: BTreeMap<CityKey, u32>,
    ids: IdAllocator,
    revision: u64,
}

impl PinStore {
    pub fn new(config: PinStoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &PinStoreConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn get(&self, id: PinId) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    /// Bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn group_count(&self) -> usize {
        self.tallies.len()
    }

    pub fn city_total(&self, key: &CityKey) -> u32 {
        self.tallies.get(key).copied().unwrap_or(0)
    }

    /// Appends a demo pin without proximity merging.
    pub fn seed(
        &mut self,
        location: PinLocation,
        user_name: impl Into<String>,
        now: Time,
    ) -> Result<PinId, PinError> {
        LngLat::new(location.coordinates.lng, location.coordinates.lat)?;
        let key = location.key();
        let id = PinId(self.ids.next_id());
        self.pins
            .push(Pin::from_location(id, location, user_name.into(), now));
        let total = self.bump_tally(&key);
        self.sync_group_totals(&key, total);
        self.revision += 1;
        Ok(id)
    }

    /// Adds a visitor's pin.
    ///
    /// If an existing pin lies within the proximity threshold, that pin takes
    /// the new submitter and timestamp and its group tally grows by one;
    /// otherwise a new pin is appended.
    pub fn add_pin(
        &mut self,
        location: PinLocation,
        submitter: &str,
        now: Time,
    ) -> Result<AddedPin, PinError> {
        let coordinates = LngLat::new(location.coordinates.lng, location.coordinates.lat)?;
        let groups_before = self.tallies.len();

        let (idx, outcome) = match self.nearest_within(coordinates) {
            Some(idx) => {
                let existing = &mut self.pins[idx];
                existing.user_name = submitter.to_string();
                existing.timestamp = now;
                debug!(
                    pin = %existing.id.0,
                    city = %existing.key(),
                    submitter,
                    "merged submission into nearby pin"
                );
                (idx, AddOutcome::Merged { into: existing.id })
            }
            None => {
                let id = PinId(self.ids.next_id());
                self.pins
                    .push(Pin::from_location(id, location, submitter.to_string(), now));
                debug!(pin = %id.0, submitter, "appended new pin");
                (self.pins.len() - 1, AddOutcome::Appended)
            }
        };

        let key = self.pins[idx].key();
        let total = self.bump_tally(&key);
        self.sync_group_totals(&key, total);
        self.revision += 1;

        Ok(AddedPin {
            pin: self.pins[idx].clone(),
            outcome,
            is_new_city: self.tallies.len() > groups_before,
        })
    }

    /// Current city groups, ordered by key.
    pub fn city_groups(&self) -> Vec<CityGroup> {
        let mut groups: BTreeMap<CityKey, CityGroup> = BTreeMap::new();
        for pin in &self.pins {
            let key = pin.key();
            let count = self.city_total(&key);
            let group = groups.entry(key.clone()).or_insert_with(|| CityGroup {
                key,
                count,
                representative: pin.coordinates,
                latest: pin.timestamp,
                latest_user: pin.user_name.clone(),
                country_code: pin.country_code.clone(),
                pin_ids: Vec::new(),
            });
            group.pin_ids.push(pin.id);
            // Later pins win timestamp ties: they were inserted after.
            if pin.timestamp >= group.latest {
                group.representative = pin.coordinates;
                group.latest = pin.timestamp;
                group.latest_user = pin.user_name.clone();
                if pin.country_code.is_some() {
                    group.country_code = pin.country_code.clone();
                }
            }
        }
        groups.into_values().collect()
    }

    /// The `n` largest city groups; see [`rank_groups`] for ordering.
    pub fn top_cities(&self, n: usize) -> Vec<CityRanking> {
        rank_groups(self.city_groups(), n, self.config.visitor_scale)
    }

    /// The `n` most recently created or refreshed pins, newest first.
    pub fn recent_pins(&self, n: usize) -> Vec<Pin> {
        let mut pins: Vec<&Pin> = self.pins.iter().collect();
        pins.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        pins.into_iter().take(n).cloned().collect()
    }

    /// Payload for the wizard's `MetricsUpdated` feed.
    pub fn metrics(&self) -> PinMetrics {
        PinMetrics {
            top_cities: self.top_cities(METRICS_LIST_LEN),
            recent_visitors: self
                .recent_pins(METRICS_LIST_LEN)
                .iter()
                .map(RecentVisitor::from_pin)
                .collect(),
        }
    }

    fn nearest_within(&self, coordinates: LngLat) -> Option<usize> {
        let threshold = self.config.proximity_threshold_deg;
        self.pins
            .iter()
            .enumerate()
            .map(|(idx, p)| (idx, p.coordinates.degree_distance(coordinates)))
            .filter(|(_, d)| *d <= threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
    }

    fn bump_tally(&mut self, key: &CityKey) -> u32 {
        let tally = self.tallies.entry(key.clone()).or_insert(0);
        *tally += 1;
        *tally
    }

    fn sync_group_totals(&mut self, key: &CityKey, total: u32) {
        for pin in self.pins.iter_mut().filter(|p| &p.key() == key) {
            pin.total_city_pins = total;
        }
    }
}
