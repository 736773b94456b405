//! Live layout geometry consumed by the session
//!
//! The rendering surface is an untyped collaborator; the session only needs
//! rectangles from it, read fresh at each decision.

use glam::Vec2;

use super::geometry::{Rect, Viewport};
use crate::consts::{FALLBACK_BUTTON_HEIGHT, FALLBACK_BUTTON_WIDTH};

/// Source of element rectangles at decision time
///
/// `None` means the element is not rendered (yet, or any more).
pub trait LayoutProbe {
    fn viewport(&self) -> Viewport;
    fn affirmative_rect(&self) -> Option<Rect>;
    fn prompt_rect(&self) -> Option<Rect>;
    fn evasive_rect(&self) -> Option<Rect>;

    /// Evasive button size, falling back to the default when unmeasured
    fn evasive_size(&self) -> Vec2 {
        match self.evasive_rect() {
            Some(rect) if !rect.is_empty() => rect.size(),
            _ => Vec2::new(FALLBACK_BUTTON_WIDTH, FALLBACK_BUTTON_HEIGHT),
        }
    }

    /// Rectangles the evasive button must stay clear of
    fn protected_rects(&self) -> Vec<Rect> {
        [self.affirmative_rect(), self.prompt_rect()]
            .into_iter()
            .flatten()
            .filter(|r| !r.is_empty())
            .collect()
    }
}

/// Fixed geometry, for tests and headless runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSnapshot {
    pub viewport: Viewport,
    pub affirmative: Option<Rect>,
    pub prompt: Option<Rect>,
    pub evasive: Option<Rect>,
}

impl LayoutSnapshot {
    /// Empty page of the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            affirmative: None,
            prompt: None,
            evasive: None,
        }
    }

    /// The page as it first renders: prompt on top, buttons side by side below
    pub fn centered(width: f32, height: f32) -> Self {
        let cx = width / 2.0;
        let cy = height / 2.0;
        Self {
            viewport: Viewport::new(width, height),
            prompt: Some(Rect::new(cx - 250.0, cy - 120.0, 500.0, 60.0)),
            affirmative: Some(Rect::new(cx - 170.0, cy, 150.0, 50.0)),
            evasive: Some(Rect::new(cx + 20.0, cy, 150.0, 50.0)),
        }
    }

    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Viewport::new(width, height);
        self
    }

    /// Move the evasive button, keeping its size
    pub fn with_evasive_at(mut self, pos: Vec2) -> Self {
        let size = self.evasive_size();
        self.evasive = Some(Rect::from_origin_size(pos, size));
        self
    }
}

impl LayoutProbe for LayoutSnapshot {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn affirmative_rect(&self) -> Option<Rect> {
        self.affirmative
    }

    fn prompt_rect(&self) -> Option<Rect> {
        self.prompt
    }

    fn evasive_rect(&self) -> Option<Rect> {
        self.evasive
    }
}
