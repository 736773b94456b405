//! Deterministic session module
//!
//! All interaction logic lives here. This module must be pure and deterministic:
//! - Time is passed in, never read
//! - Randomness comes from an injected source
//! - Geometry is read through `LayoutProbe`, never cached across events
//! - No DOM or platform dependencies

pub mod confetti;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod placement;
pub mod scheduler;

pub use confetti::{BatchId, ConfettiBatch, ConfettiEffect, ConfettiParticle, EffectEvent};
pub use geometry::{Rect, Viewport};
pub use interaction::{
    ImageStatus, InteractionState, MessageSequence, Phase, Positioning, Session, SessionEvent,
    Transition,
};
pub use layout::{LayoutProbe, LayoutSnapshot};
pub use placement::{
    Placement, PlacementBounds, PlacementParams, ScriptedSource, UnitSource, choose_position,
    is_position_clear,
};
pub use scheduler::{Fired, Scheduler, TaskId};
