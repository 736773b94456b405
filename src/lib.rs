//! Be My Valentine - a prompt whose "No" button refuses to be clicked
//!
//! Core modules:
//! - `sim`: Deterministic session logic (state machine, placement, confetti, timers)
//! - `platform`: Browser geometry and clock behind the session's seams
//! - `settings`: Data-driven copy and tuning, loaded from the page

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{PlanDetails, Settings};
pub use sim::{Phase, Session, SessionEvent};

/// Widget configuration constants
pub mod consts {
    /// Candidate positions tried before accepting the last one
    pub const PLACEMENT_MAX_ATTEMPTS: u32 = 50;
    /// Clearance kept around protected elements (px)
    pub const OVERLAP_PADDING: f32 = 10.0;
    /// Clearance kept from the viewport edges (px)
    pub const EDGE_MARGIN: f32 = 20.0;
    /// Evasive button size used before it has been laid out (px)
    pub const FALLBACK_BUTTON_WIDTH: f32 = 150.0;
    pub const FALLBACK_BUTTON_HEIGHT: f32 = 50.0;

    /// Particles per confetti batch
    pub const CONFETTI_BATCH_SIZE: usize = 150;
    /// Seconds a batch stays on screen
    pub const CONFETTI_BATCH_LIFETIME: f64 = 5.0;
    /// Seconds between batches while the effect is emitting
    pub const CONFETTI_EMIT_INTERVAL: f64 = 2.0;
    /// Seconds after start when emission stops
    pub const CONFETTI_EMIT_DURATION: f64 = 10.0;

    /// Upper bound accepted from config for batch size
    pub const CONFETTI_MAX_BATCH_SIZE: usize = 500;
    /// Shortest emission interval accepted from config (seconds)
    pub const CONFETTI_MIN_EMIT_INTERVAL: f64 = 0.1;
    /// Longest batch lifetime or emission duration accepted from config (seconds)
    pub const CONFETTI_MAX_TIMING: f64 = 60.0;

    /// Particle size range (px)
    pub const CONFETTI_MIN_SIZE: f32 = 5.0;
    pub const CONFETTI_MAX_SIZE: f32 = 15.0;
    /// Fall animation duration range (seconds)
    pub const CONFETTI_MIN_FALL: f32 = 2.0;
    pub const CONFETTI_MAX_FALL: f32 = 5.0;
    /// Animation start delay range (seconds)
    pub const CONFETTI_MAX_DELAY: f32 = 0.5;

    /// Pink confetti palette
    pub const CONFETTI_PALETTE: [&str; 10] = [
        "#ff6b9d", "#ff8fab", "#ffa8c5", "#ffb8d4", "#ffc5e1", "#ffd1e8", "#ffe5f1", "#e91e63",
        "#ff9bb8", "#ffbfd8",
    ];
}

/// Linear interpolation between `min` and `max` by `t` in [0, 1)
#[inline]
pub fn lerp(min: f32, max: f32, t: f32) -> f32 {
    min + (max - min) * t
}
