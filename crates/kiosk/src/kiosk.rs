//! The kiosk: pin store, markers, camera and map session behind one object.
//!
//! Hosts call in with wizard messages, map lifecycle callbacks and resize
//! observations, then drive everything forward one [`Frame`] at a time.
//! Notifications for the wizard collect on an [`EventBus`].

use camera::{
    CameraController, CameraEvent, CameraPose, CameraSignal, CameraState, ContainerSize,
    ResizeSource,
};
use foundation::time::Time;
use markers::MarkerLifecycle;
use pins::{AddOutcome, AddedPin, PinLocation, PinMetrics, PinStore, SeedCity, seed_store};
use runtime::{Event, EventBus, Frame, Metrics, MetricsSnapshot};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::channel::{KioskNotification, VisitorDetails, WizardMessage};
use crate::config::{KioskConfig, MapOptions};
use crate::display::ResizeFeed;
use crate::error::{KioskError, MapError, Overlay};
use crate::host::GlobeHost;
use crate::map_session::{MapSession, SessionStatus};

/// What one frame did, for hosts that only redraw on change.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub pose: Option<CameraPose>,
    pub markers_changed: usize,
    pub reconciled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskSnapshot {
    pub session: SessionStatus,
    pub camera: CameraState,
    pub pins: usize,
    pub city_groups: usize,
    pub live_markers: usize,
    pub reset_trigger: u64,
    pub leaderboard: PinMetrics,
    pub counters: MetricsSnapshot,
}

#[derive(Debug)]
pub struct Kiosk {
    config: KioskConfig,
    options: MapOptions,
    store: PinStore,
    markers: MarkerLifecycle,
    camera: CameraController,
    session: MapSession,
    resize_feed: ResizeFeed,
    notifications: EventBus<KioskNotification>,
    metrics: Metrics,
    markers_dirty: bool,
    reset_trigger: u64,
    frame_index: u64,
    now: Time,
}

impl Kiosk {
    pub fn new(config: KioskConfig) -> Self {
        Self {
            options: config.map_options(),
            store: PinStore::new(config.pins),
            markers: MarkerLifecycle::new(config.markers),
            camera: CameraController::new(config.camera),
            session: MapSession::new(),
            resize_feed: ResizeFeed::new(config.resize_throttle_ms),
            notifications: EventBus::new(),
            metrics: Metrics::new(),
            markers_dirty: false,
            reset_trigger: 0,
            frame_index: 0,
            now: Time::ZERO,
            config,
        }
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    pub fn map_options(&self) -> &MapOptions {
        &self.options
    }

    pub fn store(&self) -> &PinStore {
        &self.store
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn markers(&self) -> &MarkerLifecycle {
        &self.markers
    }

    pub fn session(&self) -> &MapSession {
        &self.session
    }

    pub fn reset_trigger(&self) -> u64 {
        self.reset_trigger
    }

    /// Loads demo pins. The whole batch is one mutation for the wizard.
    pub fn seed(&mut self, cities: &[SeedCity], rng_seed: u64) -> Result<usize, KioskError> {
        let added = seed_store(&mut self.store, cities, rng_seed, self.now)?;
        self.pins_changed();
        Ok(added)
    }

    pub fn start<H: GlobeHost>(&mut self, host: &mut H) -> Result<(), KioskError> {
        self.session.open(&mut *host, &self.options)?;
        Ok(())
    }

    pub fn on_map_loaded<H: GlobeHost>(&mut self, now: Time, host: &mut H) {
        self.tick_clock(now);
        self.session.loaded(&mut *host, &self.options);
        self.camera.dispatch(CameraEvent::MapLoaded, self.now, &mut *host);
        self.markers_dirty = true;
    }

    pub fn on_map_error(&mut self, err: MapError) {
        self.session.fail(err);
    }

    /// Recreates the map after a failure. Markers and camera start over on
    /// the new instance; the last known container size carries across.
    pub fn retry<H: GlobeHost>(&mut self, now: Time, host: &mut H) -> Result<(), KioskError> {
        self.tick_clock(now);
        self.metrics.merge(self.camera.metrics());
        self.markers = MarkerLifecycle::new(self.config.markers);
        self.camera = CameraController::new(self.config.camera);
        if let Some(size) = self.resize_feed.last() {
            let event = CameraEvent::ContainerResized {
                size,
                source: ResizeSource::Container,
            };
            self.camera.dispatch(event, self.now, &mut *host);
        }
        self.metrics.inc("map.retry");
        self.session.retry(&mut *host, &self.options)?;
        Ok(())
    }

    pub fn handle<H: GlobeHost>(
        &mut self,
        message: WizardMessage,
        now: Time,
        host: &mut H,
    ) -> Result<(), KioskError> {
        self.tick_clock(now);
        match message {
            WizardMessage::LocationSelected(target) => {
                if !self.session.is_ready() {
                    debug!(?target, "map not ready; ignoring location");
                    return Ok(());
                }
                self.camera
                    .dispatch(CameraEvent::LocationSelected(target), self.now, &mut *host);
                Ok(())
            }
            WizardMessage::FormSubmitted(submission) => {
                let location = submission.place.pin_location();
                self.add_new_pin(location, &submission.visitor, self.now)
                    .map(|_| ())
            }
        }
    }

    /// Adds a visitor's pin and schedules marker reconciliation.
    pub fn add_new_pin(
        &mut self,
        location: PinLocation,
        visitor: &VisitorDetails,
        now: Time,
    ) -> Result<AddedPin, KioskError> {
        self.tick_clock(now);
        let added = self
            .store
            .add_pin(location, &visitor.name, self.now)
            .inspect_err(|err| warn!(error = %err, "rejected pin"))?;

        match added.outcome {
            AddOutcome::Appended => self.metrics.inc("pins.appended"),
            AddOutcome::Merged { .. } => self.metrics.inc("pins.merged"),
        }
        if added.is_new_city {
            info!(city = %added.pin.key(), "first pin for city");
        }
        self.pins_changed();
        Ok(added)
    }

    pub fn on_resize<H: GlobeHost>(
        &mut self,
        size: ContainerSize,
        source: ResizeSource,
        now: Time,
        host: &mut H,
    ) {
        self.tick_clock(now);
        if let Some(size) = self.resize_feed.push(size, source, self.now) {
            self.camera
                .dispatch(CameraEvent::ContainerResized { size, source }, self.now, &mut *host);
        }
    }

    pub fn advance<H: GlobeHost>(&mut self, frame: Frame, host: &mut H) -> FrameReport {
        self.frame_index = frame.index;
        self.tick_clock(frame.now);

        if let Some(size) = self.resize_feed.poll(self.now) {
            let event = CameraEvent::ContainerResized {
                size,
                source: ResizeSource::Window,
            };
            self.camera.dispatch(event, self.now, &mut *host);
        }

        let mut report = FrameReport::default();
        if !self.session.is_ready() {
            return report;
        }

        if self.markers_dirty {
            let groups = self.store.city_groups();
            let diff = self.markers.reconcile(&groups, self.now, &mut *host);
            self.metrics.inc_counter("marker.created", diff.created.len() as u64);
            self.metrics.inc_counter("marker.moved", diff.moved.len() as u64);
            self.metrics.inc_counter("marker.relabeled", diff.relabeled.len() as u64);
            self.metrics.inc_counter("marker.removed", diff.removed.len() as u64);
            self.markers_dirty = false;
            report.reconciled = true;
        }
        report.markers_changed = self.markers.advance(self.now, &mut *host);
        report.pose = self.camera.advance(frame, &mut *host);

        for signal in self.camera.take_signals() {
            match signal {
                CameraSignal::FormReset => {
                    self.reset_trigger += 1;
                    info!(reset_trigger = self.reset_trigger, "asking wizard to reset");
                    self.notifications.emit(
                        frame,
                        KioskNotification::FormReset {
                            reset_trigger: self.reset_trigger,
                        },
                    );
                }
            }
        }
        report
    }

    pub fn take_notifications(&mut self) -> Vec<Event<KioskNotification>> {
        self.notifications.drain()
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.session.overlay()
    }

    pub fn snapshot(&self) -> KioskSnapshot {
        let mut metrics = self.metrics.clone();
        metrics.merge(self.camera.metrics());
        metrics.set_gauge("marker.live", self.markers.live_count() as i64);
        KioskSnapshot {
            session: self.session.status().clone(),
            camera: self.camera.state(),
            pins: self.store.len(),
            city_groups: self.store.group_count(),
            live_markers: self.markers.live_count(),
            reset_trigger: self.reset_trigger,
            leaderboard: self.store.metrics(),
            counters: metrics.snapshot(),
        }
    }

    fn pins_changed(&mut self) {
        self.markers_dirty = true;
        self.notifications.emit_at(
            self.frame_index,
            self.now,
            KioskNotification::MetricsUpdated(self.store.metrics()),
        );
    }

    fn tick_clock(&mut self, now: Time) {
        self.now = self.now.max(now);
    }
}

#[cfg(test)]
mod tests {
    use super::Kiosk;
    use crate::channel::{KioskNotification, VisitorDetails, WizardMessage};
    use crate::config::KioskConfig;
    use crate::error::{MapError, OverlayKind};
    use crate::geocode::StaticGazetteer;
    use crate::host::RecordingHost;
    use crate::map_session::SessionStatus;
    use crate::wizard::{FormWizard, WizardStep};
    use camera::{
        ActiveOperation, CameraMode, ContainerSize, EasePurpose, FocusTarget, ResizeSource,
    };
    use foundation::math::LngLat;
    use foundation::time::Time;
    use markers::MarkerCall;
    use pins::{PinLocation, SeedCity};
    use pretty_assertions::assert_eq;
    use runtime::Frame;

    const DALLAS: SeedCity = SeedCity {
        city_name: "Dallas",
        country: "United States",
        country_code: "US",
        lng: -96.797,
        lat: 32.7767,
        pins: 3,
    };

    const TOKYO: SeedCity = SeedCity {
        city_name: "Tokyo",
        country: "Japan",
        country_code: "JP",
        lng: 139.6917,
        lat: 35.6895,
        pins: 1,
    };

    struct Rig {
        kiosk: Kiosk,
        host: RecordingHost,
        frame: Frame,
    }

    impl Rig {
        fn new() -> Self {
            let config = KioskConfig::with_token("pk.test").unwrap();
            Self {
                kiosk: Kiosk::new(config),
                host: RecordingHost::new(),
                frame: Frame::new(0, 16),
            }
        }

        fn loaded() -> Self {
            let mut rig = Self::new();
            rig.kiosk.start(&mut rig.host).unwrap();
            rig.kiosk.on_map_loaded(Time::ZERO, &mut rig.host);
            rig
        }

        fn now(&self) -> Time {
            self.frame.now
        }

        fn send(&mut self, message: WizardMessage) {
            let now = self.now();
            self.kiosk.handle(message, now, &mut self.host).unwrap();
        }

        fn run_until(&mut self, t: u64) {
            while self.frame.now.0 <= t {
                self.kiosk.advance(self.frame, &mut self.host);
                self.frame = self.frame.next();
            }
        }

        fn run_for(&mut self, ms: u64) {
            let end = self.frame.now.0 + ms;
            self.run_until(end);
        }

        fn resets(&mut self) -> Vec<u64> {
            self.kiosk
                .take_notifications()
                .into_iter()
                .filter_map(|e| match e.payload {
                    KioskNotification::FormReset { reset_trigger } => Some(reset_trigger),
                    KioskNotification::MetricsUpdated(_) => None,
                })
                .collect()
        }
    }

    fn visitor(name: &str) -> VisitorDetails {
        VisitorDetails {
            name: name.to_string(),
            ..VisitorDetails::default()
        }
    }

    fn top2(kiosk: &Kiosk) -> Vec<(String, u32)> {
        kiosk
            .store()
            .top_cities(2)
            .into_iter()
            .map(|r| (r.key.city_name, r.count))
            .collect()
    }

    #[test]
    fn dallas_and_tokyo_scenario() {
        let mut rig = Rig::loaded();
        rig.kiosk.seed(&[DALLAS, TOKYO], 42).unwrap();
        assert_eq!(top2(&rig.kiosk), vec![("Dallas".to_string(), 3), ("Tokyo".to_string(), 1)]);

        let dallas = LngLat::wrapped(DALLAS.lng, DALLAS.lat);
        let at_dallas = PinLocation::new("Dallas", "United States", dallas);
        let added = rig
            .kiosk
            .add_new_pin(at_dallas, &visitor("Ada"), rig.now())
            .unwrap();
        assert_eq!(added.pin.total_city_pins, 4);
        assert_eq!(top2(&rig.kiosk), vec![("Dallas".to_string(), 4), ("Tokyo".to_string(), 1)]);

        rig.run_until(2_000);
        assert_eq!(rig.kiosk.camera().active(), ActiveOperation::Spinning);
        let tokyo = FocusTarget::new("Tokyo", LngLat::wrapped(TOKYO.lng, TOKYO.lat));
        rig.send(WizardMessage::LocationSelected(Some(tokyo)));
        assert_eq!(rig.kiosk.camera().mode(), CameraMode::FocusingIn);
        rig.resets();

        rig.run_for(120_000 + 100);
        assert_eq!(rig.resets(), vec![1]);
        rig.run_for(6_000);
        assert!(rig.resets().is_empty());
        assert_eq!(rig.kiosk.camera().mode(), CameraMode::Rotating);
        assert_eq!(rig.kiosk.reset_trigger(), 1);
    }

    #[test]
    fn every_mutation_pushes_metrics() {
        let mut rig = Rig::loaded();
        rig.kiosk.seed(&[DALLAS, TOKYO], 1).unwrap();
        let loc = PinLocation::new("Paris", "France", LngLat::wrapped(2.35, 48.85));
        rig.kiosk.add_new_pin(loc, &visitor("Bo"), Time(10)).unwrap();

        let updates: Vec<_> = rig
            .kiosk
            .take_notifications()
            .into_iter()
            .filter_map(|e| match e.payload {
                KioskNotification::MetricsUpdated(m) => Some(m),
                KioskNotification::FormReset { .. } => None,
            })
            .collect();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].recent_visitors[0].user_name, "Bo");
        assert_eq!(updates[1].top_cities[0].visitors_label, "300");
    }

    #[test]
    fn markers_follow_the_store_and_settle() {
        let mut rig = Rig::loaded();
        rig.kiosk.seed(&[DALLAS, TOKYO], 1).unwrap();
        rig.run_for(1_000);
        assert_eq!(rig.kiosk.markers().live_count(), 2);
        assert!(rig.host.marker_calls().iter().all(|c| match c {
            MarkerCall::Attach(_, v) | MarkerCall::Update(_, v) => !v.interactive,
            MarkerCall::Detach(_) => true,
        }));

        let calls = rig.host.marker_calls().len();
        rig.run_for(1_000);
        assert_eq!(rig.host.marker_calls().len(), calls);
    }

    #[test]
    fn pins_added_before_load_appear_after_load() {
        let mut rig = Rig::new();
        rig.kiosk.seed(&[TOKYO], 1).unwrap();
        rig.kiosk.start(&mut rig.host).unwrap();
        rig.run_for(100);
        assert_eq!(rig.kiosk.markers().live_count(), 0);

        rig.kiosk.on_map_loaded(rig.now(), &mut rig.host);
        rig.run_for(100);
        assert_eq!(rig.kiosk.markers().live_count(), 1);
    }

    #[test]
    fn location_before_load_is_ignored() {
        let mut rig = Rig::new();
        rig.kiosk.start(&mut rig.host).unwrap();
        let tokyo = FocusTarget::new("Tokyo", LngLat::wrapped(TOKYO.lng, TOKYO.lat));
        rig.send(WizardMessage::LocationSelected(Some(tokyo)));
        assert_eq!(rig.kiosk.camera().mode(), CameraMode::Rotating);
        assert!(rig.host.camera.eases().is_empty());
    }

    #[test]
    fn window_resizes_are_throttled_into_one_correction() {
        let mut rig = Rig::loaded();
        rig.run_until(2_000);
        for (i, w) in [1000u32, 1100, 1280].into_iter().enumerate() {
            let now = Time(rig.now().0 + i as u64 * 10);
            rig.kiosk
                .on_resize(ContainerSize::new(w, 1280), ResizeSource::Window, now, &mut rig.host);
        }
        assert!(rig.host.camera.eases().is_empty());

        rig.run_for(200);
        let eases = rig.host.camera.eases();
        assert_eq!(eases.len(), 1);
        assert_eq!(eases[0].purpose, EasePurpose::ResizeCorrection);
        assert_eq!(eases[0].target.zoom, 2.9);
    }

    #[test]
    fn map_failure_shows_retry_and_recovers() {
        let mut rig = Rig::new();
        rig.host.fail_next_create = Some(MapError::Load("401 Unauthorized: access token".into()));
        assert!(rig.kiosk.start(&mut rig.host).is_err());
        let overlay = rig.kiosk.overlay().unwrap();
        assert_eq!(overlay.kind, OverlayKind::Retryable);
        assert_eq!(overlay.message, "Invalid Mapbox token. Please check your token.");

        rig.kiosk.retry(rig.now(), &mut rig.host).unwrap();
        assert_eq!(rig.kiosk.session().status(), &SessionStatus::Loading);
        rig.kiosk.on_map_loaded(rig.now(), &mut rig.host);
        assert!(rig.kiosk.overlay().is_none());
        assert_eq!(rig.host.maps_created, 1);
        assert_eq!(rig.host.maps_destroyed, 1);
        assert_eq!(rig.kiosk.snapshot().counters.counter("map.retry"), 1);
    }

    #[test]
    fn wizard_round_trip_releases_focus_without_reset() {
        let mut rig = Rig::loaded();
        let mut search = StaticGazetteer::world_cities();
        let mut wizard = FormWizard::new(rig.kiosk.config().wizard, rig.kiosk.config().geocode);
        rig.run_until(2_000);

        let t = rig.now();
        wizard.type_location("Tokyo", t);
        wizard.poll(t.after(300), &mut search);
        assert!(wizard.select_suggestion(0));
        for answer in ["Ada", "female", "25-34"] {
            wizard.answer(answer);
            assert!(wizard.next(t));
        }
        assert!(wizard.next(t));
        assert_eq!(wizard.step(), WizardStep::PinAdded);
        for message in wizard.take_messages() {
            rig.send(message);
        }
        assert_eq!(rig.kiosk.camera().mode(), CameraMode::FocusingIn);
        assert_eq!(rig.kiosk.store().len(), 1);

        for event in rig.kiosk.take_notifications() {
            wizard.receive(&event.payload);
        }
        assert_eq!(wizard.metrics().map(|m| m.top_cities.len()), Some(1));

        wizard.poll(t.after(3_000), &mut search);
        assert_eq!(wizard.step(), WizardStep::Location);
        for message in wizard.take_messages() {
            rig.send(message);
        }
        assert_eq!(rig.kiosk.camera().mode(), CameraMode::ZoomingOut);

        rig.run_for(6_000);
        assert!(rig.resets().is_empty());
        assert_eq!(rig.kiosk.camera().mode(), CameraMode::Rotating);
    }

    #[test]
    fn snapshot_serializes() {
        let mut rig = Rig::loaded();
        rig.kiosk.seed(&[DALLAS], 3).unwrap();
        rig.run_for(100);
        let json = serde_json::to_value(rig.kiosk.snapshot()).unwrap();
        assert_eq!(json["session"], "Ready");
        assert_eq!(json["pins"], 3);
        assert_eq!(json["leaderboard"]["topCities"][0]["visitorsLabel"], "300");
        assert_eq!(json["camera"]["mode"], "Rotating");
    }
}
