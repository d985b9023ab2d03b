pub mod lifecycle;
pub mod marker;
pub mod surface;

pub use lifecycle::*;
pub use marker::*;
pub use surface::*;
