pub mod pin;
pub mod ranking;
pub mod seed;
pub mod store;

pub use pin::*;
pub use ranking::*;
pub use seed::{SeedCity, WORLD_CITIES, seed_store};
pub use store::*;
