// Distance resolution against an external directions service
mod types;
mod parser;
mod client;

pub use types::*;
pub use client::GoogleMapsClient;
pub use parser::shortest_leg_duration;

/// Path of the directions endpoint on the maps host
pub const DIRECTIONS_PATH: &str = "/maps/api/directions/json";

/// Default maps host
pub const DEFAULT_GOOGLE_HOST: &str = "https://maps.googleapis.com";
