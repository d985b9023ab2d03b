pub mod channel;
pub mod config;
pub mod display;
pub mod error;
pub mod geocode;
pub mod host;
pub mod kiosk;
pub mod map_session;
pub mod wizard;

pub use channel::*;
pub use config::{ConfigError, KioskConfig, MapOptions};
pub use error::*;
pub use geocode::*;
pub use host::*;
pub use kiosk::*;
pub use map_session::*;
pub use wizard::*;
