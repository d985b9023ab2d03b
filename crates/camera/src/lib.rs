pub mod controller;
pub mod pose;
pub mod resize;
pub mod surface;
pub mod tween;

pub use controller::*;
pub use pose::*;
pub use resize::*;
pub use surface::*;
pub use tween::*;
