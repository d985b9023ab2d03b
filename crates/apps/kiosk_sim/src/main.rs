use std::env;

use camera::{CameraCall, CameraPose, CameraSurface, ContainerSize, EaseCommand, ResizeSource};
use clap::Parser;
use foundation::time::Time;
use kiosk::{
    FormWizard, Kiosk, KioskConfig, MapError, MapHost, MapOptions, Overlay, StaticGazetteer,
};
use markers::{MarkerId, MarkerSurface, MarkerVisual};
use runtime::Frame;
use serde_json::Value;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless kiosk globe with a scripted visitor")]
struct Args {
    /// Frames to simulate
    #[arg(long, default_value_t = 9_000)]
    frames: u64,

    /// Frames per second of the simulated display
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed for the demo pin jitter
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Container width in CSS pixels
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Container height in CSS pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Place the scripted visitor searches for
    #[arg(long, default_value = "Tokyo")]
    visit: String,

    /// Mapbox token (default: MAPBOX_ACCESS_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Fail the first map load to exercise the retry overlay
    #[arg(long)]
    flaky: bool,

    /// Print the final kiosk state as JSON
    #[arg(long)]
    json: bool,
}

/// Host that logs every SDK call instead of drawing.
#[derive(Debug, Default)]
struct LoggingHost {
    fail_next_create: bool,
    camera_calls: Vec<CameraCall>,
}

impl MapHost for LoggingHost {
    fn create_map(&mut self, options: &MapOptions) -> Result<(), MapError> {
        if std::mem::take(&mut self.fail_next_create) {
            return Err(MapError::Load("style request timed out".to_string()));
        }
        info!(style = %options.style, projection = %options.projection, "create map");
        Ok(())
    }

    fn destroy_map(&mut self) {
        info!("destroy map");
    }

    fn set_config_property(
        &mut self,
        scope: &str,
        key: &str,
        value: Value,
    ) -> Result<(), MapError> {
        debug!(scope, key, %value, "set config property");
        Ok(())
    }
}

impl MarkerSurface for LoggingHost {
    fn attach(&mut self, id: MarkerId, visual: &MarkerVisual) {
        debug!(%id, label = %visual.label, count = visual.count, "attach marker");
    }

    fn update(&mut self, id: MarkerId, visual: &MarkerVisual) {
        trace!(%id, scale = visual.scale, opacity = visual.opacity, "update marker");
    }

    fn detach(&mut self, id: MarkerId) {
        debug!(%id, "detach marker");
    }
}

impl CameraSurface for LoggingHost {
    fn begin_ease(&mut self, command: &EaseCommand) {
        info!(
            purpose = ?command.purpose,
            zoom = command.target.zoom,
            duration_ms = command.duration_ms,
            "ease camera"
        );
        self.camera_calls.push(CameraCall::BeginEase(*command));
    }

    fn set_pose(&mut self, pose: &CameraPose) {
        trace!(lng = pose.center.lng, zoom = pose.zoom, "set pose");
    }
}

/// Scripted visitor: types, picks the first suggestion and answers every
/// question a few seconds after the globe settles.
const VISITOR_ARRIVES_MS: u64 = 3_000;
const ANSWERS: [&str; 4] = ["Sim Visitor", "prefer not to say", "25-34", ""];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match args.token.clone() {
        Some(token) => KioskConfig::from_lookup(|key: &str| {
            if key == kiosk::config::TOKEN_ENV {
                Some(token.clone())
            } else {
                env::var(key).ok()
            }
        }),
        None => KioskConfig::from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            let overlay = Overlay::for_config(&err);
            error!(error = %err, "cannot start kiosk");
            eprintln!("{}: {}", overlay.title, overlay.message);
            return Err(err.into());
        }
    };

    let mut host = LoggingHost {
        fail_next_create: args.flaky,
        ..LoggingHost::default()
    };
    let mut kiosk = Kiosk::new(config);
    let seeded = kiosk.seed(pins::WORLD_CITIES, args.seed)?;
    info!(seeded, "demo pins loaded");

    let mut frame = Frame::with_fps(0, args.fps);
    if let Err(err) = kiosk.start(&mut host) {
        if let Some(overlay) = kiosk.overlay() {
            warn!(
                title = %overlay.title,
                message = %overlay.message,
                error = %err,
                "showing retry overlay"
            );
        }
        kiosk.retry(frame.now, &mut host)?;
    }
    kiosk.on_map_loaded(frame.now, &mut host);
    kiosk.on_resize(
        ContainerSize::new(args.width, args.height),
        ResizeSource::Container,
        frame.now,
        &mut host,
    );

    let mut search = StaticGazetteer::world_cities();
    let mut wizard = FormWizard::new(kiosk.config().wizard, kiosk.config().geocode);
    let arrives = Time(VISITOR_ARRIVES_MS);
    let mut typed = false;
    let mut answered = false;

    for _ in 0..args.frames {
        if !typed && frame.now >= arrives {
            wizard.type_location(&args.visit, frame.now);
            typed = true;
        }
        wizard.poll(frame.now, &mut search);
        if typed && !answered && !wizard.suggestions().is_empty() {
            answered = run_visitor(&mut wizard, frame.now);
            if !answered {
                warn!(visit = %args.visit, "visitor gave up");
            }
        }

        for message in wizard.take_messages() {
            kiosk.handle(message, frame.now, &mut host)?;
        }
        kiosk.advance(frame, &mut host);
        for event in kiosk.take_notifications() {
            wizard.receive(&event.payload);
        }
        frame = frame.next();
    }

    if typed && !answered {
        warn!(visit = %args.visit, "no suggestions for visitor");
    }

    let snapshot = kiosk.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for city in &snapshot.leaderboard.top_cities {
            println!("{:>2}. {:<28} {:>6}", city.rank, city.key.to_string(), city.visitors_label);
        }
        println!(
            "camera {:?} at zoom {:.2}, {} eases, {} markers",
            snapshot.camera.mode,
            snapshot.camera.pose.zoom,
            host.camera_calls.len(),
            snapshot.live_markers
        );
    }
    Ok(())
}

fn run_visitor(wizard: &mut FormWizard, now: Time) -> bool {
    if !wizard.select_suggestion(0) {
        return false;
    }
    for answer in ANSWERS {
        wizard.answer(answer);
        if !wizard.next(now) {
            return false;
        }
    }
    true
}
