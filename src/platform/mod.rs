//! Platform abstraction layer
//!
//! Browser implementations of the session's seams:
//! - Live element geometry (`DomLayout`)
//! - Frame clock in seconds
//! - Element ids shared with `index.html`

pub mod ids;

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::{DomLayout, now_secs};
