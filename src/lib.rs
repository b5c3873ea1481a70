//! Marker trail - fiducial marker overlays for still images and video.
//!
//! Detection is delegated to a [`MarkerDetector`]; this crate owns the overlay:
//! marker outlines and labels, marker centers, and the trail drawn from the bottom
//! center of each frame through every detected marker.

pub mod args;
pub mod backend;
pub mod config;
pub mod detector;
pub mod dictionary;
pub mod error;
pub mod font;
pub mod layout;
pub mod output;
pub mod overlay;
pub mod session;
pub mod still;
pub mod trail;
pub mod ttf;
pub mod types;
pub mod video;

pub use detector::{MarkerDetector, ScriptedDetector};
pub use dictionary::Dictionary;
pub use error::{AnnotateError, Result};
pub use types::{Detections, Marker, PixelPoint, Point2f, Segment, Trail};

/// Installs the `tracing` subscriber used by the binaries. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
}
