//! Single arbiter for the globe camera.
//!
//! Every camera mutation goes through one [`ActiveOp`] slot: an idle camera,
//! a self-rescheduling rotation tick, or one eased move. Starting anything
//! new first clears the slot (cancelling the pending tick), so a rotation
//! tick and an ease can never both be live.
//!
//! All waiting is a [`Timeline`] task; each task kind keeps its token and
//! checks it on firing, so a cancelled or superseded task is inert even if
//! it was drained in the same batch that superseded it.

use foundation::easing::Easing;
use foundation::math::LngLat;
use foundation::time::Time;
use runtime::{Frame, Metrics, TaskToken, Timeline};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::pose::CameraPose;
use crate::resize::{ContainerSize, ResizeConfig, ResizeDecision, ResizeResponder, ResizeSource};
use crate::surface::CameraSurface;
use crate::tween::{CameraTween, EaseCommand, EasePurpose};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    /// Longitude added per animation frame while rotating.
    pub rotation_step_deg: f64,
    /// Delay between map load and the first rotation tick.
    pub settle_ms: u64,
    /// Delay between map load and the first container-zoom check.
    pub initial_resize_check_ms: u64,
    pub focus_zoom: f64,
    pub focus_duration_ms: u64,
    pub focus_easing: Easing,
    /// How long a focus may last before the kiosk resets itself.
    pub focus_timeout_ms: u64,
    pub zoom_out_ms: u64,
    pub zoom_out_easing: Easing,
    pub default_view: CameraPose,
    pub auto_rotate: bool,
    pub resize: ResizeConfig,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            rotation_step_deg: 0.1,
            settle_ms: 1_000,
            initial_resize_check_ms: 500,
            focus_zoom: 8.0,
            focus_duration_ms: 20_000,
            focus_easing: Easing::Linear,
            focus_timeout_ms: 120_000,
            zoom_out_ms: 5_000,
            zoom_out_easing: Easing::EaseInOutCubic,
            default_view: CameraPose::DEFAULT_VIEW,
            auto_rotate: true,
            resize: ResizeConfig::default(),
        }
    }
}

/// A place the visitor picked in the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusTarget {
    pub name: String,
    pub center: LngLat,
    /// `[west, south, east, north]`, when the geocoder supplied one.
    pub bbox: Option<[f64; 4]>,
}

impl FocusTarget {
    pub fn new(name: impl Into<String>, center: LngLat) -> Self {
        Self {
            name: name.into(),
            center,
            bbox: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraMode {
    Rotating,
    FocusingIn,
    Focused,
    ZoomingOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    MapLoaded,
    /// `None` means the visitor finished (or the wizard was reset).
    LocationSelected(Option<FocusTarget>),
    ContainerResized { size: ContainerSize, source: ResizeSource },
}

/// Outbound signals for the form wizard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum CameraSignal {
    FormReset,
}

/// Observable view of the arbiter slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ActiveOperation {
    Idle,
    Spinning,
    Easing(EasePurpose),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraState {
    pub mode: CameraMode,
    pub pose: CameraPose,
    pub focus_target: Option<FocusTarget>,
    pub focus_deadline: Option<Time>,
    pub active: ActiveOperation,
    pub container: Option<ContainerSize>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum ActiveOp {
    Idle,
    Spinning(TaskToken),
    Easing { tween: CameraTween, purpose: EasePurpose },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum CameraTask {
    RotateFrame,
    ResumeRotation,
    FocusDeadline,
    ResizeCheck,
}

#[derive(Debug)]
pub struct CameraController {
    config: CameraConfig,
    resize: ResizeResponder,
    mode: CameraMode,
    pose: CameraPose,
    focus_target: Option<FocusTarget>,
    focus_deadline: Option<Time>,
    deadline_token: Option<TaskToken>,
    resume_token: Option<TaskToken>,
    resize_check_token: Option<TaskToken>,
    active: ActiveOp,
    tasks: Timeline<CameraTask>,
    container: Option<ContainerSize>,
    loaded: bool,
    signals: Vec<CameraSignal>,
    metrics: Metrics,
    now: Time,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            resize: ResizeResponder::new(config.resize),
            mode: CameraMode::Rotating,
            pose: config.default_view,
            config,
            focus_target: None,
            focus_deadline: None,
            deadline_token: None,
            resume_token: None,
            resize_check_token: None,
            active: ActiveOp::Idle,
            tasks: Timeline::new(),
            container: None,
            loaded: false,
            signals: Vec::new(),
            metrics: Metrics::new(),
            now: Time::ZERO,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn focus_deadline(&self) -> Option<Time> {
        self.focus_deadline
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn active(&self) -> ActiveOperation {
        match self.active {
            ActiveOp::Idle => ActiveOperation::Idle,
            ActiveOp::Spinning(_) => ActiveOperation::Spinning,
            ActiveOp::Easing { purpose, .. } => ActiveOperation::Easing(purpose),
        }
    }

    pub fn state(&self) -> CameraState {
        CameraState {
            mode: self.mode,
            pose: self.pose,
            focus_target: self.focus_target.clone(),
            focus_deadline: self.focus_deadline,
            active: self.active(),
            container: self.container,
        }
    }

    /// Signals raised since the last call.
    pub fn take_signals(&mut self) -> Vec<CameraSignal> {
        std::mem::take(&mut self.signals)
    }

    /// Earliest pending timer, for hosts that sleep between frames.
    pub fn next_deadline(&self) -> Option<Time> {
        self.tasks.next_deadline()
    }

    /// Single entry point for every externally triggered transition.
    pub fn dispatch(&mut self, event: CameraEvent, now: Time, surface: &mut dyn CameraSurface) {
        self.now = self.now.max(now);
        match event {
            CameraEvent::MapLoaded => self.on_map_loaded(),
            CameraEvent::LocationSelected(Some(target)) => self.start_focus(target, surface),
            CameraEvent::LocationSelected(None) => match self.mode {
                CameraMode::FocusingIn | CameraMode::Focused => {
                    debug!("focus released early");
                    self.start_zoom_out(surface);
                }
                CameraMode::Rotating | CameraMode::ZoomingOut => {
                    trace!(mode = ?self.mode, "ignoring empty location");
                }
            },
            CameraEvent::ContainerResized { size, source } => self.on_resize(size, source, surface),
        }
    }

    /// Runs due tasks and samples the active ease for `frame`.
    /// Returns the new pose if the camera moved.
    pub fn advance(&mut self, frame: Frame, surface: &mut dyn CameraSurface) -> Option<CameraPose> {
        self.now = self.now.max(frame.now);
        let mut moved = false;

        for (token, task) in self.tasks.drain_due(self.now) {
            moved |= self.run_task(token, task, surface);
        }

        if let ActiveOp::Easing { tween, purpose } = self.active {
            self.pose = tween.sample(self.now);
            surface.set_pose(&self.pose);
            moved = true;
            if tween.is_finished(self.now) {
                self.finish_ease(purpose, surface);
            }
        }

        moved.then_some(self.pose)
    }

    fn on_map_loaded(&mut self) {
        if self.loaded {
            debug!("map reloaded; keeping camera state");
            return;
        }
        self.loaded = true;
        self.set_mode(CameraMode::Rotating);
        if self.config.auto_rotate {
            let at = self.now.after(self.config.settle_ms);
            self.resume_token = Some(self.tasks.schedule_at(at, CameraTask::ResumeRotation));
        }
        let at = self.now.after(self.config.initial_resize_check_ms);
        self.resize_check_token = Some(self.tasks.schedule_at(at, CameraTask::ResizeCheck));
        info!(auto_rotate = self.config.auto_rotate, "camera ready");
    }

    fn on_resize(
        &mut self,
        size: ContainerSize,
        source: ResizeSource,
        surface: &mut dyn CameraSurface,
    ) {
        self.container = Some(size);
        if !self.loaded || self.mode != CameraMode::Rotating {
            debug!(
                ?source,
                width = size.width,
                height = size.height,
                mode = ?self.mode,
                "container size recorded"
            );
            return;
        }
        trace!(?source, width = size.width, height = size.height, "container resized");
        self.correct_zoom(surface);
    }

    fn run_task(
        &mut self,
        token: TaskToken,
        task: CameraTask,
        surface: &mut dyn CameraSurface,
    ) -> bool {
        match task {
            CameraTask::RotateFrame => {
                if self.active != ActiveOp::Spinning(token) {
                    return false;
                }
                let center = self.pose.center;
                let lng = center.lng + self.config.rotation_step_deg;
                self.pose.center = LngLat::wrapped(lng, center.lat);
                surface.set_pose(&self.pose);
                self.metrics.inc("camera.rotation.tick");
                let next = self.tasks.schedule_next_frame(CameraTask::RotateFrame);
                self.active = ActiveOp::Spinning(next);
                true
            }
            CameraTask::ResumeRotation => {
                if self.resume_token != Some(token) {
                    return false;
                }
                self.resume_token = None;
                // A running correction resumes rotation itself when done.
                if self.mode == CameraMode::Rotating && self.active == ActiveOp::Idle {
                    self.start_spin();
                }
                false
            }
            CameraTask::FocusDeadline => {
                if self.deadline_token != Some(token) {
                    return false;
                }
                self.deadline_token = None;
                if matches!(self.mode, CameraMode::FocusingIn | CameraMode::Focused) {
                    info!("focus timed out; resetting kiosk");
                    self.signals.push(CameraSignal::FormReset);
                    self.metrics.inc("camera.reset");
                    self.start_zoom_out(surface);
                }
                false
            }
            CameraTask::ResizeCheck => {
                if self.resize_check_token != Some(token) {
                    return false;
                }
                self.resize_check_token = None;
                if self.mode == CameraMode::Rotating {
                    self.correct_zoom(surface);
                }
                false
            }
        }
    }

    fn start_spin(&mut self) {
        if !self.config.auto_rotate || matches!(self.active, ActiveOp::Spinning(_)) {
            return;
        }
        self.stop_active();
        let token = self.tasks.schedule_next_frame(CameraTask::RotateFrame);
        self.active = ActiveOp::Spinning(token);
        debug!("rotation started");
    }

    /// Clears the arbiter slot, cancelling a pending rotation tick.
    fn stop_active(&mut self) {
        match std::mem::replace(&mut self.active, ActiveOp::Idle) {
            ActiveOp::Idle => {}
            ActiveOp::Spinning(token) => {
                self.tasks.cancel(token);
                debug!("rotation stopped");
            }
            ActiveOp::Easing { purpose, .. } => {
                debug!(?purpose, "ease interrupted");
            }
        }
    }

    fn begin_ease(
        &mut self,
        target: CameraPose,
        duration_ms: u64,
        easing: Easing,
        purpose: EasePurpose,
        surface: &mut dyn CameraSurface,
    ) {
        self.stop_active();
        let command = EaseCommand {
            target,
            duration_ms,
            easing,
            purpose,
        };
        surface.begin_ease(&command);
        self.active = ActiveOp::Easing {
            tween: CameraTween::start(self.pose, &command, self.now),
            purpose,
        };
        self.metrics.inc(purpose.metric());
        debug!(?purpose, duration_ms, zoom = target.zoom, "ease started");
    }

    fn start_focus(&mut self, target: FocusTarget, surface: &mut dyn CameraSurface) {
        self.cancel_token(CameraTaskSlot::Resume);
        self.cancel_token(CameraTaskSlot::Deadline);

        let pose = CameraPose {
            center: target.center,
            zoom: self.config.focus_zoom,
            pitch: self.config.default_view.pitch,
            bearing: self.config.default_view.bearing,
        };
        self.begin_ease(
            pose,
            self.config.focus_duration_ms,
            self.config.focus_easing,
            EasePurpose::Focus,
            surface,
        );

        let deadline = self.now.after(self.config.focus_timeout_ms);
        self.focus_deadline = Some(deadline);
        self.deadline_token = Some(self.tasks.schedule_at(deadline, CameraTask::FocusDeadline));
        info!(place = %target.name, lng = target.center.lng, lat = target.center.lat, "focusing");
        self.focus_target = Some(target);
        self.set_mode(CameraMode::FocusingIn);
    }

    fn start_zoom_out(&mut self, surface: &mut dyn CameraSurface) {
        self.cancel_token(CameraTaskSlot::Deadline);
        self.focus_deadline = None;
        self.set_mode(CameraMode::ZoomingOut);
        self.begin_ease(
            self.config.default_view,
            self.config.zoom_out_ms,
            self.config.zoom_out_easing,
            EasePurpose::ZoomOut,
            surface,
        );
    }

    fn finish_ease(&mut self, purpose: EasePurpose, surface: &mut dyn CameraSurface) {
        self.active = ActiveOp::Idle;
        debug!(?purpose, "ease finished");
        match purpose {
            EasePurpose::Focus => self.set_mode(CameraMode::Focused),
            EasePurpose::ZoomOut => {
                self.focus_target = None;
                self.set_mode(CameraMode::Rotating);
                if !self.correct_zoom(surface) {
                    self.start_spin();
                }
            }
            EasePurpose::ResizeCorrection => {
                if self.mode == CameraMode::Rotating && self.loaded && self.resume_token.is_none() {
                    self.start_spin();
                }
            }
        }
    }

    /// Starts a resize correction if the container calls for one.
    fn correct_zoom(&mut self, surface: &mut dyn CameraSurface) -> bool {
        let Some(size) = self.container else {
            return false;
        };
        let reference = match self.active {
            ActiveOp::Easing {
                tween,
                purpose: EasePurpose::ResizeCorrection,
            } => tween.to.zoom,
            _ => self.pose.zoom,
        };
        match self.resize.evaluate(reference, size) {
            ResizeDecision::Skip { zoom } => {
                trace!(current = reference, zoom, "zoom change below threshold");
                false
            }
            ResizeDecision::Apply { zoom } => {
                let config = *self.resize.config();
                self.begin_ease(
                    self.pose.with_zoom(zoom),
                    config.duration_ms,
                    config.easing,
                    EasePurpose::ResizeCorrection,
                    surface,
                );
                true
            }
        }
    }

    fn cancel_token(&mut self, slot: CameraTaskSlot) {
        let token = match slot {
            CameraTaskSlot::Resume => self.resume_token.take(),
            CameraTaskSlot::Deadline => self.deadline_token.take(),
        };
        if let Some(token) = token {
            self.tasks.cancel(token);
        }
    }

    fn set_mode(&mut self, mode: CameraMode) {
        if self.mode != mode {
            info!(from = ?self.mode, to = ?mode, "camera mode");
            self.mode = mode;
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum CameraTaskSlot {
    Resume,
    Deadline,
}

#[cfg(test)]
mod tests {
    use super::{
        ActiveOperation, CameraConfig, CameraController, CameraEvent, CameraMode, CameraSignal,
        FocusTarget,
    };
    use crate::resize::{ContainerSize, ResizeSource};
    use crate::surface::RecordingCameraSurface;
    use crate::tween::EasePurpose;
    use foundation::math::LngLat;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;
    use runtime::Frame;

    struct Rig {
        ctrl: CameraController,
        surface: RecordingCameraSurface,
        frame: Frame,
    }

    impl Rig {
        fn with_config(config: CameraConfig) -> Self {
            let mut rig = Self {
                ctrl: CameraController::new(config),
                surface: RecordingCameraSurface::new(),
                frame: Frame::new(0, 16),
            };
            rig.send(CameraEvent::MapLoaded);
            rig
        }

        fn loaded() -> Self {
            Self::with_config(CameraConfig::default())
        }

        fn send(&mut self, event: CameraEvent) {
            self.ctrl.dispatch(event, self.frame.now, &mut self.surface);
        }

        fn run_until(&mut self, t: u64) {
            while self.frame.now.0 <= t {
                self.ctrl.advance(self.frame, &mut self.surface);
                self.frame = self.frame.next();
            }
        }

        fn run_for(&mut self, ms: u64) {
            let end = self.frame.now.0 + ms;
            self.run_until(end);
        }

        fn ticks(&self) -> u64 {
            self.ctrl.metrics().counter("camera.rotation.tick")
        }
    }

    fn tokyo() -> FocusTarget {
        FocusTarget::new("Tokyo", LngLat::wrapped(139.6917, 35.6895))
    }

    fn resized(w: u32, h: u32) -> CameraEvent {
        CameraEvent::ContainerResized {
            size: ContainerSize::new(w, h),
            source: ResizeSource::Container,
        }
    }

    #[test]
    fn rotation_starts_after_settle_and_steps_each_frame() {
        let mut rig = Rig::loaded();
        rig.run_until(990);
        assert_eq!(rig.ticks(), 0);
        assert_eq!(rig.ctrl.active(), ActiveOperation::Idle);

        rig.run_until(2000);
        let ticks = rig.ticks();
        assert!(ticks > 50, "only {ticks} ticks");
        let expected = ticks as f64 * 0.1;
        assert!((rig.ctrl.pose().center.lng - expected).abs() < 1e-6);
        assert_eq!(rig.ctrl.active(), ActiveOperation::Spinning);
    }

    #[test]
    fn focus_replaces_rotation_with_one_ease() {
        let mut rig = Rig::loaded();
        rig.run_until(2000);
        rig.send(CameraEvent::LocationSelected(Some(tokyo())));

        assert_eq!(rig.ctrl.mode(), CameraMode::FocusingIn);
        assert_eq!(rig.ctrl.active(), ActiveOperation::Easing(EasePurpose::Focus));
        let ticks = rig.ticks();
        rig.run_for(1000);
        assert_eq!(rig.ticks(), ticks);
        assert_eq!(rig.surface.eases().len(), 1);
    }

    #[test]
    fn focus_settles_then_holds() {
        let mut rig = Rig::loaded();
        rig.send(CameraEvent::LocationSelected(Some(tokyo())));
        rig.run_for(20_100);
        assert_eq!(rig.ctrl.mode(), CameraMode::Focused);
        assert_eq!(rig.ctrl.active(), ActiveOperation::Idle);
        assert_eq!(rig.ctrl.pose().zoom, 8.0);
        assert_eq!(rig.ctrl.pose().center, tokyo().center);
    }

    #[test]
    fn early_release_zooms_out_without_reset() {
        let mut rig = Rig::loaded();
        rig.run_until(2000);
        rig.send(CameraEvent::LocationSelected(Some(tokyo())));
        rig.run_for(30_000);
        rig.send(CameraEvent::LocationSelected(None));
        assert_eq!(rig.ctrl.mode(), CameraMode::ZoomingOut);
        assert_eq!(rig.ctrl.focus_deadline(), None);

        rig.run_for(200_000);
        assert!(rig.ctrl.take_signals().is_empty());
        assert_eq!(rig.ctrl.mode(), CameraMode::Rotating);
        assert_eq!(rig.ctrl.active(), ActiveOperation::Spinning);
    }

    #[test]
    fn deadline_resets_exactly_once() {
        let mut rig = Rig::loaded();
        rig.run_until(2000);
        rig.send(CameraEvent::LocationSelected(Some(tokyo())));
        let deadline = rig.ctrl.focus_deadline().unwrap();

        rig.run_until(deadline.0 - 16);
        assert!(rig.ctrl.take_signals().is_empty());
        rig.run_until(deadline.0 + 16);
        assert_eq!(rig.ctrl.take_signals(), vec![CameraSignal::FormReset]);
        assert_eq!(rig.ctrl.mode(), CameraMode::ZoomingOut);

        rig.run_for(6_000);
        assert!(rig.ctrl.take_signals().is_empty());
        assert_eq!(rig.ctrl.mode(), CameraMode::Rotating);
        assert_eq!(rig.ctrl.active(), ActiveOperation::Spinning);
        assert_eq!(rig.ctrl.metrics().counter("camera.reset"), 1);
    }

    #[test]
    fn refocus_rearms_deadline() {
        let mut rig = Rig::loaded();
        rig.send(CameraEvent::LocationSelected(Some(tokyo())));
        let first = rig.ctrl.focus_deadline().unwrap();
        rig.run_for(10_000);
        rig.send(CameraEvent::LocationSelected(Some(FocusTarget::new(
            "Paris",
            LngLat::wrapped(2.3522, 48.8566),
        ))));
        let second = rig.ctrl.focus_deadline().unwrap();
        assert!(second > first);

        rig.run_until(first.0 + 16);
        assert!(rig.ctrl.take_signals().is_empty());
        rig.run_until(second.0 + 16);
        assert_eq!(rig.ctrl.take_signals(), vec![CameraSignal::FormReset]);
    }

    #[test]
    fn empty_selection_while_rotating_is_ignored() {
        let mut rig = Rig::loaded();
        rig.run_until(2000);
        let before = rig.ctrl.state();
        rig.send(CameraEvent::LocationSelected(None));
        assert_eq!(rig.ctrl.state(), before);
    }

    #[test]
    fn small_resize_leaves_camera_alone() {
        let mut rig = Rig::loaded();
        rig.run_until(2000);
        // 794 px maps to zoom 1.80, the default view's zoom.
        rig.send(resized(794, 1000));
        assert!(rig.surface.eases().is_empty());
        assert_eq!(rig.ctrl.active(), ActiveOperation::Spinning);
    }

    #[test]
    fn large_resize_eases_once_then_resumes_rotation() {
        let mut rig = Rig::loaded();
        rig.run_until(2000);
        rig.send(resized(1920, 1280));

        let eases = rig.surface.eases();
        assert_eq!(eases.len(), 1);
        assert_eq!(eases[0].purpose, EasePurpose::ResizeCorrection);
        assert_eq!(eases[0].target.zoom, 2.9);
        assert_eq!(eases[0].duration_ms, 400);

        let ticks = rig.ticks();
        rig.run_for(300);
        assert_eq!(rig.ticks(), ticks);
        rig.run_for(300);
        assert!(rig.ticks() > ticks);
        assert_eq!(rig.ctrl.pose().zoom, 2.9);
    }

    #[test]
    fn resize_during_focus_is_applied_after_zoom_out() {
        let mut rig = Rig::loaded();
        rig.send(CameraEvent::LocationSelected(Some(tokyo())));
        rig.send(resized(1280, 1280));
        assert_eq!(rig.surface.eases().len(), 1);

        rig.run_for(1000);
        rig.send(CameraEvent::LocationSelected(None));
        rig.run_for(5_100);
        let purposes: Vec<_> = rig.surface.eases().iter().map(|e| e.purpose).collect();
        assert_eq!(
            purposes,
            vec![EasePurpose::Focus, EasePurpose::ZoomOut, EasePurpose::ResizeCorrection]
        );
        assert_eq!(rig.ctrl.mode(), CameraMode::Rotating);

        rig.run_for(500);
        assert_eq!(rig.ctrl.active(), ActiveOperation::Spinning);
    }

    #[test]
    fn initial_check_corrects_zoom_before_rotation() {
        let mut rig = Rig::loaded();
        rig.send(resized(1280, 1280));
        // Not yet rotating, but already in Rotating mode: correction runs now.
        assert_eq!(rig.surface.eases().len(), 1);
        rig.run_until(950);
        assert_eq!(rig.ticks(), 0);
        rig.run_until(1100);
        assert!(rig.ticks() > 0);
    }

    #[test]
    fn focus_during_zoom_out_cancels_it() {
        let mut rig = Rig::loaded();
        rig.run_until(2000);
        rig.send(CameraEvent::LocationSelected(Some(tokyo())));
        rig.run_for(1000);
        rig.send(CameraEvent::LocationSelected(None));
        rig.run_for(1000);
        assert_eq!(rig.ctrl.mode(), CameraMode::ZoomingOut);
        assert_eq!(rig.ctrl.focus_deadline(), None);

        let now = rig.frame.now;
        rig.send(CameraEvent::LocationSelected(Some(FocusTarget::new(
            "Paris",
            LngLat::wrapped(2.3522, 48.8566),
        ))));
        assert_eq!(rig.ctrl.mode(), CameraMode::FocusingIn);
        assert_eq!(rig.ctrl.active(), ActiveOperation::Easing(EasePurpose::Focus));
        assert_eq!(rig.ctrl.focus_deadline(), Some(now.after(120_000)));

        // Past the point the zoom-out would have finished.
        rig.run_for(10_000);
        assert_eq!(rig.ctrl.mode(), CameraMode::FocusingIn);
        assert!(rig.ctrl.take_signals().is_empty());
        let purposes: Vec<_> = rig.surface.eases().iter().map(|e| e.purpose).collect();
        assert_eq!(
            purposes,
            vec![EasePurpose::Focus, EasePurpose::ZoomOut, EasePurpose::Focus]
        );
    }

    #[test]
    fn settle_resume_waits_for_running_correction() {
        let mut rig = Rig::loaded();
        rig.run_until(800);
        rig.send(resized(1280, 1280));
        assert_eq!(
            rig.ctrl.active(),
            ActiveOperation::Easing(EasePurpose::ResizeCorrection)
        );

        // The settle delay expires at 1000 ms, mid-correction.
        rig.run_until(1150);
        assert_eq!(rig.ticks(), 0);
        assert_eq!(
            rig.ctrl.active(),
            ActiveOperation::Easing(EasePurpose::ResizeCorrection)
        );

        rig.run_until(1300);
        assert!(rig.ticks() > 0);
        assert_eq!(rig.ctrl.active(), ActiveOperation::Spinning);
        assert_eq!(rig.ctrl.pose().zoom, 2.9);
    }

    #[test]
    fn resize_exactly_at_threshold_is_skipped() {
        let mut rig = Rig::loaded();
        rig.run_until(2000);
        // 817 px maps to zoom 1.85, 0.05 above the default view.
        rig.send(resized(817, 1000));
        assert!(rig.surface.eases().is_empty());
        assert_eq!(rig.ctrl.active(), ActiveOperation::Spinning);
    }

    #[test]
    fn auto_rotate_can_be_disabled() {
        let mut rig = Rig::with_config(CameraConfig {
            auto_rotate: false,
            ..CameraConfig::default()
        });
        rig.run_until(3000);
        assert_eq!(rig.ticks(), 0);
        assert_eq!(rig.ctrl.active(), ActiveOperation::Idle);
        assert_eq!(rig.ctrl.mode(), CameraMode::Rotating);
    }

    #[test]
    fn state_serializes_for_hosts() {
        let mut rig = Rig::loaded();
        rig.send(CameraEvent::LocationSelected(Some(tokyo())));
        let json = serde_json::to_value(rig.ctrl.state()).unwrap();
        assert_eq!(json["mode"], "FocusingIn");
        assert_eq!(json["focusTarget"]["name"], "Tokyo");
        assert_eq!(json["active"]["Easing"], "Focus");
        assert_eq!(json["focusDeadline"], 120_000);
    }

    #[test]
    fn events_before_load_only_record_size() {
        let mut ctrl = CameraController::default();
        let mut surface = RecordingCameraSurface::new();
        ctrl.dispatch(resized(1280, 1280), Time(0), &mut surface);
        assert!(surface.calls.is_empty());
        assert_eq!(ctrl.state().container, Some(ContainerSize::new(1280, 1280)));
    }
}
