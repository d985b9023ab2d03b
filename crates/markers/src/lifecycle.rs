//! Keeps rendered markers congruent with the pin store's city groups.
//!
//! `reconcile` diffs the required key set against live markers and starts
//! transitions; `advance` samples them once per frame. Exiting markers leave
//! the key index immediately, so a key never maps to more than one marker.

use std::collections::BTreeMap;

use foundation::easing::Easing;
use foundation::time::{Time, TimeSpan};
use pins::{CityGroup, CityKey};
use serde::Serialize;
use tracing::{debug, trace};

use crate::marker::{Fade, Glide, Marker, MarkerId, MarkerSlots, MarkerVisual};
use crate::surface::MarkerSurface;

/// Scale/opacity a marker enters from and exits to.
pub const HIDDEN: (f64, f64) = (0.3, 0.0);
pub const SHOWN: (f64, f64) = (1.0, 1.0);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerConfig {
    pub enter_ms: u64,
    pub enter_easing: Easing,
    pub exit_ms: u64,
    pub exit_easing: Easing,
    pub move_ms: u64,
    pub move_easing: Easing,
    /// Representative moves at or below this (degrees, per axis) are ignored.
    pub move_epsilon_deg: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            enter_ms: 500,
            enter_easing: Easing::EaseOutBack,
            exit_ms: 300,
            exit_easing: Easing::EaseInCubic,
            move_ms: 800,
            move_easing: Easing::EaseOutCubic,
            move_epsilon_deg: 0.001,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub created: Vec<CityKey>,
    pub moved: Vec<CityKey>,
    pub relabeled: Vec<CityKey>,
    pub removed: Vec<CityKey>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.moved.is_empty()
            && self.relabeled.is_empty()
            && self.removed.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct MarkerLifecycle {
    config: MarkerConfig,
    slots: MarkerSlots,
    by_key: BTreeMap<CityKey, MarkerId>,
}

impl MarkerLifecycle {
    pub fn new(config: MarkerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Markers that represent a live city group (exiting ones excluded).
    pub fn live_count(&self) -> usize {
        self.by_key.len()
    }

    /// All attached markers, including those fading out.
    pub fn attached_count(&self) -> usize {
        self.slots.len()
    }

    pub fn marker_for(&self, key: &CityKey) -> Option<MarkerId> {
        self.by_key.get(key).copied()
    }

    pub fn visual(&self, id: MarkerId) -> Option<&MarkerVisual> {
        self.slots.get(id).map(|m| &m.visual)
    }

    pub fn is_animating(&self) -> bool {
        self.slots.iter().any(Marker::is_animating)
    }

    pub fn reconcile(
        &mut self,
        groups: &[CityGroup],
        now: Time,
        surface: &mut dyn MarkerSurface,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let required: BTreeMap<&CityKey, &CityGroup> = groups.iter().map(|g| (&g.key, g)).collect();

        let stale: Vec<CityKey> = self
            .by_key
            .keys()
            .filter(|k| !required.contains_key(k))
            .cloned()
            .collect();
        for key in stale {
            if let Some(id) = self.by_key.remove(&key) {
                self.begin_exit(id, now);
                report.removed.push(key);
            }
        }

        for (key, group) in required {
            match self.by_key.get(key).copied() {
                Some(id) => self.refresh(id, group, now, surface, &mut report),
                None => {
                    self.create(group, now, surface);
                    report.created.push(key.clone());
                }
            }
        }

        if !report.is_empty() {
            debug!(
                created = report.created.len(),
                moved = report.moved.len(),
                relabeled = report.relabeled.len(),
                removed = report.removed.len(),
                "reconciled markers"
            );
        }
        report
    }

    /// Samples running transitions and pushes the results to `surface`.
    /// Returns how many markers changed this frame.
    pub fn advance(&mut self, now: Time, surface: &mut dyn MarkerSurface) -> usize {
        let mut changed = 0;
        let mut finished_exits = Vec::new();

        for id in self.slots.ids() {
            let Some(marker) = self.slots.get_mut(id) else {
                continue;
            };
            if !marker.is_animating() {
                continue;
            }

            if let Some(exit) = marker.exit {
                (marker.visual.scale, marker.visual.opacity) = exit.sample(now);
                if exit.span.is_finished(now) {
                    finished_exits.push(id);
                    continue;
                }
            }
            if let Some(entrance) = marker.entrance {
                (marker.visual.scale, marker.visual.opacity) = entrance.sample(now);
                if entrance.span.is_finished(now) {
                    marker.entrance = None;
                }
            }
            if let Some(glide) = marker.glide {
                marker.visual.position = glide.sample(now);
                if glide.span.is_finished(now) {
                    marker.visual.position = glide.to;
                    marker.glide = None;
                }
            }
            surface.update(id, &marker.visual);
            changed += 1;
        }

        for id in finished_exits {
            if let Some(marker) = self.slots.remove(id) {
                trace!(%id, key = %marker.key, "marker detached");
                surface.detach(id);
                changed += 1;
            }
        }
        changed
    }

    fn create(&mut self, group: &CityGroup, now: Time, surface: &mut dyn MarkerSurface) {
        self.evict_exiting(&group.key, surface);

        let id = self.slots.allocate();
        let visual = MarkerVisual {
            position: group.representative,
            scale: HIDDEN.0,
            opacity: HIDDEN.1,
            label: group.key.city_name.clone(),
            country_code: group.country_code.clone(),
            count: group.count,
            interactive: false,
        };
        surface.attach(id, &visual);
        self.slots.insert(Marker {
            id,
            key: group.key.clone(),
            visual,
            target: group.representative,
            entrance: Some(Fade {
                span: TimeSpan::starting_at(now, self.config.enter_ms),
                easing: self.config.enter_easing,
                from: HIDDEN,
                to: SHOWN,
            }),
            glide: None,
            exit: None,
        });
        self.by_key.insert(group.key.clone(), id);
        trace!(%id, key = %group.key, "marker attached");
    }

    fn refresh(
        &mut self,
        id: MarkerId,
        group: &CityGroup,
        now: Time,
        surface: &mut dyn MarkerSurface,
        report: &mut ReconcileReport,
    ) {
        let config = self.config;
        let Some(marker) = self.slots.get_mut(id) else {
            return;
        };

        if marker.target.max_axis_delta(group.representative) > config.move_epsilon_deg {
            marker.glide = Some(Glide {
                span: TimeSpan::starting_at(now, config.move_ms),
                easing: config.move_easing,
                from: marker.visual.position,
                to: group.representative,
            });
            marker.target = group.representative;
            report.moved.push(group.key.clone());
        }

        if marker.visual.count != group.count || marker.visual.country_code != group.country_code {
            marker.visual.count = group.count;
            marker.visual.country_code = group.country_code.clone();
            surface.update(id, &marker.visual);
            report.relabeled.push(group.key.clone());
        }
    }

    fn begin_exit(&mut self, id: MarkerId, now: Time) {
        let config = self.config;
        if let Some(marker) = self.slots.get_mut(id) {
            marker.entrance = None;
            marker.exit = Some(Fade {
                span: TimeSpan::starting_at(now, config.exit_ms),
                easing: config.exit_easing,
                from: (marker.visual.scale, marker.visual.opacity),
                to: HIDDEN,
            });
        }
    }

    /// Drops a still-fading marker for `key` so the replacement is the only one.
    fn evict_exiting(&mut self, key: &CityKey, surface: &mut dyn MarkerSurface) {
        let leftovers: Vec<MarkerId> = self
            .slots
            .iter()
            .filter(|m| m.is_exiting() && &m.key == key)
            .map(|m| m.id)
            .collect();
        for id in leftovers {
            if self.slots.remove(id).is_some() {
                surface.detach(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MarkerConfig, MarkerLifecycle};
    use crate::surface::{MarkerCall, RecordingMarkerSurface};
    use foundation::math::LngLat;
    use foundation::time::Time;
    use pins::{CityGroup, CityKey};
    use pretty_assertions::assert_eq;

    fn group(city: &str, lng: f64, lat: f64, count: u32) -> CityGroup {
        CityGroup {
            key: CityKey::new(city, "X"),
            count,
            representative: LngLat::wrapped(lng, lat),
            latest: Time::ZERO,
            latest_user: "v".into(),
            country_code: None,
            pin_ids: Vec::new(),
        }
    }

    #[test]
    fn reconcile_twice_is_a_no_op() {
        let mut markers = MarkerLifecycle::default();
        let mut surface = RecordingMarkerSurface::new();
        let groups = vec![group("A", 0.0, 0.0, 1), group("B", 10.0, 0.0, 2)];

        let first = markers.reconcile(&groups, Time(0), &mut surface);
        assert_eq!(first.created.len(), 2);
        let calls_after_first = surface.calls.len();

        let second = markers.reconcile(&groups, Time(5), &mut surface);
        assert!(second.is_empty());
        assert_eq!(surface.calls.len(), calls_after_first);
    }

    #[test]
    fn new_marker_enters_from_small_and_transparent() {
        let mut markers = MarkerLifecycle::default();
        let mut surface = RecordingMarkerSurface::new();
        markers.reconcile(&[group("A", 0.0, 0.0, 1)], Time(0), &mut surface);

        let MarkerCall::Attach(id, visual) = &surface.calls[0] else {
            panic!("expected attach, got {:?}", surface.calls[0]);
        };
        assert_eq!((visual.scale, visual.opacity), (0.3, 0.0));
        assert!(!visual.interactive);
        let id = *id;

        markers.advance(Time(500), &mut surface);
        let settled = markers.visual(id).unwrap();
        assert!((settled.scale - 1.0).abs() < 1e-9);
        assert!((settled.opacity - 1.0).abs() < 1e-9);
        assert!(!markers.is_animating());
    }

    #[test]
    fn removed_group_fades_then_detaches() {
        let mut markers = MarkerLifecycle::default();
        let mut surface = RecordingMarkerSurface::new();
        markers.reconcile(&[group("A", 0.0, 0.0, 1)], Time(0), &mut surface);
        markers.advance(Time(600), &mut surface);

        let report = markers.reconcile(&[], Time(1000), &mut surface);
        assert_eq!(report.removed, vec![CityKey::new("A", "X")]);
        assert_eq!(markers.live_count(), 0);
        assert_eq!(markers.attached_count(), 1);

        markers.advance(Time(1150), &mut surface);
        assert_eq!(surface.detached(), 0);
        markers.advance(Time(1300), &mut surface);
        assert_eq!(surface.detached(), 1);
        assert_eq!(markers.attached_count(), 0);
    }

    #[test]
    fn moved_representative_glides_instead_of_snapping() {
        let mut markers = MarkerLifecycle::default();
        let mut surface = RecordingMarkerSurface::new();
        markers.reconcile(&[group("A", 0.0, 0.0, 1)], Time(0), &mut surface);
        markers.advance(Time(500), &mut surface);

        let report = markers.reconcile(&[group("A", 1.0, 0.0, 2)], Time(1000), &mut surface);
        assert_eq!(report.moved.len(), 1);
        assert_eq!(report.relabeled.len(), 1);

        let id = markers.marker_for(&CityKey::new("A", "X")).unwrap();
        markers.advance(Time(1400), &mut surface);
        let mid = markers.visual(id).unwrap().position.lng;
        assert!(mid > 0.0 && mid < 1.0, "mid-glide lng {mid}");

        markers.advance(Time(1800), &mut surface);
        assert_eq!(markers.visual(id).unwrap().position, LngLat::wrapped(1.0, 0.0));
    }

    #[test]
    fn sub_epsilon_move_is_ignored() {
        let mut markers = MarkerLifecycle::new(MarkerConfig::default());
        let mut surface = RecordingMarkerSurface::new();
        markers.reconcile(&[group("A", 0.0, 0.0, 1)], Time(0), &mut surface);
        let report = markers.reconcile(&[group("A", 0.0005, 0.0, 1)], Time(10), &mut surface);
        assert!(report.is_empty());
    }

    #[test]
    fn returning_key_replaces_fading_marker() {
        let mut markers = MarkerLifecycle::default();
        let mut surface = RecordingMarkerSurface::new();
        let groups = vec![group("A", 0.0, 0.0, 1)];
        markers.reconcile(&groups, Time(0), &mut surface);
        markers.reconcile(&[], Time(100), &mut surface);
        markers.reconcile(&groups, Time(150), &mut surface);

        assert_eq!(markers.attached_count(), 1);
        assert_eq!(markers.live_count(), 1);
        assert_eq!(surface.attached(), 2);
        assert_eq!(surface.detached(), 1);
    }
}
