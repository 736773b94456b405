//! Interaction state machine
//!
//! `Session` owns every piece of mutable page state and is the only thing
//! allowed to change it. Each input maps to one transition; the events it
//! returns tell the renderer what changed.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::confetti::{BatchId, ConfettiEffect, ConfettiParticle, EffectEvent};
use super::layout::LayoutProbe;
use super::placement::{PlacementBounds, PlacementParams, UnitSource, choose_position};
use crate::settings::Settings;

/// Which part of the page is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Question asked, both buttons live
    Idle,
    /// Yes was pressed
    Celebrating,
    /// Date plan modal open over the celebration
    PlanDetailOpen,
}

/// How the evasive button is positioned
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Positioning {
    /// Laid out next to the Yes button by the page
    Flow,
    /// Pinned at a viewport position (top-left corner, px)
    Fixed(Vec2),
}

/// Plain state owned by the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionState {
    pub phase: Phase,
    /// Times the evasive button was activated; never decreases
    pub evasive_clicks: u32,
    pub positioning: Positioning,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            evasive_clicks: 0,
            positioning: Positioning::Flow,
        }
    }
}

/// Taunts indexed cyclically by click count
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageSequence {
    messages: Vec<String>,
}

impl MessageSequence {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Index shown after `clicks` activations; none before the first
    pub fn index_for(&self, clicks: u32) -> Option<usize> {
        if clicks == 0 || self.messages.is_empty() {
            return None;
        }
        Some((clicks as usize - 1) % self.messages.len())
    }

    pub fn message_for(&self, clicks: u32) -> Option<&str> {
        self.index_for(clicks).map(|i| self.messages[i].as_str())
    }
}

/// Load state of the celebration image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Pending,
    Loaded,
    /// Replaced by the fallback text
    Failed,
}

/// Something the renderer should reflect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    PhaseChanged(Phase),
    EvasiveMoved { position: Vec2, fallback: bool },
    MessageChanged(usize),
    BatchEmitted(BatchId),
    BatchExpired(BatchId),
    EmissionStopped,
    ImageFellBack,
}

impl From<EffectEvent> for SessionEvent {
    fn from(e: EffectEvent) -> Self {
        match e {
            EffectEvent::BatchEmitted(id) => SessionEvent::BatchEmitted(id),
            EffectEvent::BatchExpired(id) => SessionEvent::BatchExpired(id),
            EffectEvent::EmissionStopped => SessionEvent::EmissionStopped,
        }
    }
}

/// Result of feeding one input to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Applied(Vec<SessionEvent>),
    /// Input not valid in the current phase; nothing changed
    Ignored,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }

    pub fn events(&self) -> &[SessionEvent] {
        match self {
            Transition::Applied(events) => events,
            Transition::Ignored => &[],
        }
    }
}

/// One page view: state, tuning, RNG and the confetti timers
#[derive(Debug, Clone)]
pub struct Session<R = Pcg32> {
    state: InteractionState,
    settings: Settings,
    messages: MessageSequence,
    params: PlacementParams,
    effect: ConfettiEffect,
    image: ImageStatus,
    rng: R,
    torn_down: bool,
}

impl Session<Pcg32> {
    /// Session with a seeded PCG generator
    pub fn with_seed(settings: Settings, seed: u64) -> Self {
        Self::new(settings, Pcg32::seed_from_u64(seed))
    }
}

impl<R: UnitSource> Session<R> {
    pub fn new(settings: Settings, rng: R) -> Self {
        Self {
            state: InteractionState::default(),
            messages: MessageSequence::new(settings.messages.clone()),
            params: settings.placement_params(),
            effect: ConfettiEffect::new(settings.confetti.clone()),
            image: ImageStatus::Pending,
            settings,
            rng,
            torn_down: false,
        }
    }

    // === Queries ===

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn evasive_clicks(&self) -> u32 {
        self.state.evasive_clicks
    }

    pub fn positioning(&self) -> Positioning {
        self.state.positioning
    }

    /// Taunt for the current click count
    pub fn current_message(&self) -> Option<&str> {
        if self.state.phase != Phase::Idle {
            return None;
        }
        self.messages.message_for(self.state.evasive_clicks)
    }

    /// Yes and No are only shown while the question is open
    pub fn buttons_visible(&self) -> bool {
        self.state.phase == Phase::Idle
    }

    pub fn celebration_visible(&self) -> bool {
        self.state.phase != Phase::Idle
    }

    pub fn plan_open(&self) -> bool {
        self.state.phase == Phase::PlanDetailOpen
    }

    pub fn image_status(&self) -> ImageStatus {
        self.image
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn prompt_text(&self) -> String {
        self.settings.prompt_text()
    }

    pub fn effect(&self) -> &ConfettiEffect {
        &self.effect
    }

    pub fn active_particles(&self) -> impl Iterator<Item = &ConfettiParticle> {
        self.effect.active_particles()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // === Transitions ===

    /// Yes pressed. Starts the celebration once; stray repeats are ignored.
    pub fn on_affirmative_activate(&mut self, now: f64) -> Transition {
        if self.torn_down || self.state.phase != Phase::Idle {
            log::debug!("Affirmative ignored in {:?}", self.state.phase);
            return Transition::Ignored;
        }

        self.state.phase = Phase::Celebrating;
        log::info!(
            "Yes after {} evasive attempts, celebrating",
            self.state.evasive_clicks
        );

        let mut events = vec![SessionEvent::PhaseChanged(Phase::Celebrating)];
        events.extend(
            self.effect
                .start(now, &mut self.rng)
                .into_iter()
                .map(SessionEvent::from),
        );
        Transition::Applied(events)
    }

    /// No pressed or touched. Counts the attempt and moves the button.
    pub fn on_evasive_activate(&mut self, layout: &impl LayoutProbe) -> Transition {
        if self.torn_down || self.state.phase != Phase::Idle {
            log::debug!("Evasive ignored in {:?}", self.state.phase);
            return Transition::Ignored;
        }

        self.state.evasive_clicks = self.state.evasive_clicks.saturating_add(1);

        if self.state.positioning == Positioning::Flow {
            let start = layout
                .evasive_rect()
                .filter(|r| !r.is_empty())
                .map(|r| r.origin())
                .unwrap_or(Vec2::splat(self.params.margin));
            self.state.positioning = Positioning::Fixed(start);
            log::info!("Evasive button pinned at ({:.0}, {:.0})", start.x, start.y);
        }

        let button = layout.evasive_size();
        let bounds = PlacementBounds::new(layout.viewport(), button, self.params.margin);
        let placement = choose_position(
            button,
            &layout.protected_rects(),
            &bounds,
            &self.params,
            &mut self.rng,
        );
        self.state.positioning = Positioning::Fixed(placement.position);
        log::debug!(
            "Evasive #{} -> ({:.0}, {:.0}) after {} attempts",
            self.state.evasive_clicks,
            placement.position.x,
            placement.position.y,
            placement.attempts
        );

        let mut events = vec![SessionEvent::EvasiveMoved {
            position: placement.position,
            fallback: placement.fallback,
        }];
        if let Some(idx) = self.messages.index_for(self.state.evasive_clicks) {
            events.push(SessionEvent::MessageChanged(idx));
        }
        Transition::Applied(events)
    }

    /// Open the plan modal over the celebration
    pub fn on_show_plan(&mut self) -> Transition {
        if self.torn_down || self.state.phase != Phase::Celebrating {
            log::debug!("Show plan ignored in {:?}", self.state.phase);
            return Transition::Ignored;
        }
        self.state.phase = Phase::PlanDetailOpen;
        Transition::Applied(vec![SessionEvent::PhaseChanged(Phase::PlanDetailOpen)])
    }

    /// Close the plan modal, back to the celebration
    pub fn on_close_plan(&mut self) -> Transition {
        if self.torn_down || self.state.phase != Phase::PlanDetailOpen {
            log::debug!("Close plan ignored in {:?}", self.state.phase);
            return Transition::Ignored;
        }
        self.state.phase = Phase::Celebrating;
        Transition::Applied(vec![SessionEvent::PhaseChanged(Phase::Celebrating)])
    }

    /// Viewport changed. A pinned button is clamped back on screen.
    pub fn on_resize(&mut self, layout: &impl LayoutProbe) -> Transition {
        if self.torn_down || self.state.phase != Phase::Idle {
            return Transition::Ignored;
        }
        let Positioning::Fixed(pos) = self.state.positioning else {
            return Transition::Ignored;
        };

        let bounds =
            PlacementBounds::new(layout.viewport(), layout.evasive_size(), self.params.margin);
        let clamped = bounds.clamp(pos);
        if clamped == pos {
            return Transition::Applied(Vec::new());
        }

        self.state.positioning = Positioning::Fixed(clamped);
        log::debug!("Resize clamped evasive to ({:.0}, {:.0})", clamped.x, clamped.y);
        Transition::Applied(vec![SessionEvent::EvasiveMoved {
            position: clamped,
            fallback: false,
        }])
    }

    /// Celebration image failed; show the fallback instead
    pub fn on_celebration_image_error(&mut self) -> Transition {
        if self.torn_down || self.image == ImageStatus::Failed {
            return Transition::Ignored;
        }
        log::warn!(
            "Celebration image failed to load, showing fallback {:?}",
            self.settings.celebration.fallback_text
        );
        self.image = ImageStatus::Failed;
        Transition::Applied(vec![SessionEvent::ImageFellBack])
    }

    pub fn on_celebration_image_loaded(&mut self) -> Transition {
        if self.torn_down || self.image != ImageStatus::Pending {
            return Transition::Ignored;
        }
        self.image = ImageStatus::Loaded;
        Transition::Applied(Vec::new())
    }

    /// When the next confetti timer fires; `None` when idle or torn down
    pub fn next_timer_due(&self) -> Option<f64> {
        if self.torn_down {
            return None;
        }
        self.effect.next_due()
    }

    /// Fire confetti timers due at or before `now` (seconds)
    pub fn tick(&mut self, now: f64) -> Vec<SessionEvent> {
        if self.torn_down {
            return Vec::new();
        }
        self.effect
            .advance(now, &mut self.rng)
            .into_iter()
            .map(SessionEvent::from)
            .collect()
    }

    /// The view is going away: cancel every pending timer
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        log::info!(
            "Session torn down with {} pending timers",
            self.effect.pending_tasks()
        );
        self.effect.cancel_all();
        self.torn_down = true;
    }

    /// The page was hidden. A page kept in the back/forward cache can be
    /// shown again, so only a final unload tears the session down.
    pub fn on_page_hide(&mut self, persisted: bool) -> Transition {
        if self.torn_down {
            return Transition::Ignored;
        }
        if persisted {
            log::info!("Page cached for back/forward navigation, keeping session");
            return Transition::Ignored;
        }
        self.teardown();
        Transition::Applied(Vec::new())
    }
}
