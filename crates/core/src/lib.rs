pub mod body;
pub mod config;
pub mod error;
pub mod filters;
pub mod integrator;
pub mod persist;
pub mod raster;
pub mod render;
pub mod stats;

pub use body::{initial_bodies, initial_bodies_seeded, Bodies, Body, N_BODIES};
pub use config::{load_dotenv, OutputConfig};
pub use error::{OrbitError, Result};
pub use filters::{gaussian_blur, grayscale};
pub use integrator::{simulate, DT, G};
pub use persist::{save_png, StatsWriter};
pub use raster::Image;
pub use render::render;
pub use stats::{compute_stats, ImageStats};
