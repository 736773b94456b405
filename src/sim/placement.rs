//! Evasion placement engine
//!
//! Picks a new spot for the evasive button by rejection sampling inside the
//! viewport. The search is bounded: after `max_attempts` rejected candidates
//! the last one is accepted as-is, so every call terminates with a position
//! even when the viewport leaves no clear space.

use glam::Vec2;

use super::geometry::{Rect, Viewport};
use crate::consts::{EDGE_MARGIN, OVERLAP_PADDING, PLACEMENT_MAX_ATTEMPTS};

/// Source of uniform samples in [0, 1)
///
/// Any `rand::Rng` works; tests substitute a scripted sequence.
pub trait UnitSource {
    fn next_unit(&mut self) -> f32;
}

impl<R: rand::Rng> UnitSource for R {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Replays a fixed list of samples, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Samples handed out so far
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl UnitSource for ScriptedSource {
    fn next_unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v.clamp(0.0, 1.0)
    }
}

/// Search tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementParams {
    /// Clearance from the viewport edges
    pub margin: f32,
    /// Clearance around each protected rectangle
    pub padding: f32,
    /// Candidates sampled before falling back
    pub max_attempts: u32,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            margin: EDGE_MARGIN,
            padding: OVERLAP_PADDING,
            max_attempts: PLACEMENT_MAX_ATTEMPTS,
        }
    }
}

/// Range of allowed top-left corners for the button
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl PlacementBounds {
    /// Corners keeping a `button`-sized box `margin` away from every edge.
    /// When the viewport is too small on an axis, that axis pins to `margin`.
    pub fn new(viewport: Viewport, button: Vec2, margin: f32) -> Self {
        let min = Vec2::splat(margin);
        let max = Vec2::new(
            viewport.width - button.x - margin,
            viewport.height - button.y - margin,
        );
        Self {
            min,
            max: max.max(min),
        }
    }

    /// True when only a single corner is allowed on both axes
    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    /// Uniform point in the allowed range
    pub fn sample<S: UnitSource + ?Sized>(&self, rng: &mut S) -> Vec2 {
        let x = crate::lerp(self.min.x, self.max.x, rng.next_unit());
        let y = crate::lerp(self.min.y, self.max.y, rng.next_unit());
        Vec2::new(x, y)
    }

    /// Pull `pos` back inside the allowed range
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        pos.clamp(self.min, self.max)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.cmpge(self.min).all() && pos.cmple(self.max).all()
    }
}

/// Outcome of a placement search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// New top-left corner of the button
    pub position: Vec2,
    /// Candidates sampled
    pub attempts: u32,
    /// True when no clear candidate was found and the last sample was kept
    pub fallback: bool,
}

/// Whether a button at `pos` stays clear of every protected rectangle
pub fn is_position_clear(pos: Vec2, button: Vec2, protected: &[Rect], padding: f32) -> bool {
    let candidate = Rect::from_origin_size(pos, button);
    !protected
        .iter()
        .any(|other| candidate.intersects_padded(other, padding))
}

/// Choose a new position for a `button`-sized box
///
/// Samples up to `params.max_attempts` corners uniformly within `bounds` and
/// returns the first that clears all `protected` rectangles (grown by
/// `params.padding`). If none does, the last sample is returned with
/// `fallback` set.
pub fn choose_position<S: UnitSource + ?Sized>(
    button: Vec2,
    protected: &[Rect],
    bounds: &PlacementBounds,
    params: &PlacementParams,
    rng: &mut S,
) -> Placement {
    let max_attempts = params.max_attempts.max(1);
    let mut last = bounds.min;

    for attempt in 1..=max_attempts {
        let candidate = bounds.sample(rng);
        if is_position_clear(candidate, button, protected, params.padding) {
            return Placement {
                position: candidate,
                attempts: attempt,
                fallback: false,
            };
        }
        last = candidate;
    }

    log::warn!(
        "No clear spot after {} attempts, keeping last candidate ({:.0}, {:.0})",
        max_attempts,
        last.x,
        last.y
    );
    Placement {
        position: last,
        attempts: max_attempts,
        fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds_800x600() -> PlacementBounds {
        PlacementBounds::new(Viewport::new(800.0, 600.0), Vec2::new(150.0, 50.0), 20.0)
    }

    #[test]
    fn test_bounds_from_viewport() {
        let bounds = bounds_800x600();
        assert_eq!(bounds.min, Vec2::new(20.0, 20.0));
        assert_eq!(bounds.max, Vec2::new(630.0, 530.0));
        assert!(!bounds.is_degenerate());
    }

    #[test]
    fn test_tiny_viewport_pins_to_margin() {
        let bounds =
            PlacementBounds::new(Viewport::new(100.0, 40.0), Vec2::new(150.0, 50.0), 20.0);
        assert!(bounds.is_degenerate());
        let mut rng = ScriptedSource::new([0.9, 0.1]);
        assert_eq!(bounds.sample(&mut rng), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_first_clear_candidate_wins() {
        let bounds = bounds_800x600();
        // Protected box covers the top-left corner region
        let protected = [Rect::new(0.0, 0.0, 300.0, 200.0)];
        // First candidate (20, 20) is blocked, second (630, 530) is clear
        let mut rng = ScriptedSource::new([0.0, 0.0, 1.0, 1.0]);
        let placement = choose_position(
            Vec2::new(150.0, 50.0),
            &protected,
            &bounds,
            &PlacementParams::default(),
            &mut rng,
        );
        assert!(!placement.fallback);
        assert_eq!(placement.attempts, 2);
        assert_eq!(placement.position, Vec2::new(630.0, 530.0));
    }

    #[test]
    fn test_exhausted_search_keeps_last_sample() {
        let bounds = bounds_800x600();
        // Protected box covers the whole viewport
        let protected = [Rect::new(0.0, 0.0, 800.0, 600.0)];
        let mut rng = ScriptedSource::new([0.25, 0.5]);
        let params = PlacementParams::default();
        let placement =
            choose_position(Vec2::new(150.0, 50.0), &protected, &bounds, &params, &mut rng);
        assert!(placement.fallback);
        assert_eq!(placement.attempts, 50);
        // Two samples per attempt, no extra sample after giving up
        assert_eq!(rng.drawn(), 100);
        assert_eq!(placement.position, Vec2::new(20.0 + 610.0 * 0.25, 20.0 + 510.0 * 0.5));
    }

    #[test]
    fn test_zero_attempts_still_samples_once() {
        let bounds = bounds_800x600();
        let params = PlacementParams {
            max_attempts: 0,
            ..Default::default()
        };
        let mut rng = ScriptedSource::new([0.5]);
        let placement = choose_position(Vec2::new(150.0, 50.0), &[], &bounds, &params, &mut rng);
        assert_eq!(placement.attempts, 1);
        assert!(!placement.fallback);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let bounds = bounds_800x600();
        let once = bounds.clamp(Vec2::new(900.0, -40.0));
        assert_eq!(once, Vec2::new(630.0, 20.0));
        assert_eq!(bounds.clamp(once), once);
    }

    #[test]
    fn test_padding_is_respected() {
        let protected = [Rect::new(100.0, 100.0, 100.0, 100.0)];
        let button = Vec2::new(50.0, 20.0);
        // 5px right of the box: inside the 10px padding
        assert!(!is_position_clear(Vec2::new(205.0, 120.0), button, &protected, 10.0));
        // 10px right of the box: exactly on the padded edge
        assert!(is_position_clear(Vec2::new(210.0, 120.0), button, &protected, 10.0));
    }

    #[test]
    fn test_rng_source_stays_in_bounds() {
        use rand::SeedableRng;
        let bounds = bounds_800x600();
        let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            assert!(bounds.contains(bounds.sample(&mut rng)));
        }
    }
}
