//! Celebration confetti
//!
//! Particles are emitted in batches. Each batch expires on its own timer, so
//! overlapping batches come and go independently and the active set is simply
//! the union of live batches. Emission repeats on an interval until a stop
//! task cancels it; expiries already scheduled still fire after that.

use super::placement::UnitSource;
use super::scheduler::{Scheduler, TaskId};
use crate::lerp;
use crate::settings::ConfettiSettings;

/// Identifier of one emitted batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(pub u32);

/// A single confetti piece; the renderer animates it, the core only times it
#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiParticle {
    /// Unique across the session
    pub id: u64,
    pub batch: BatchId,
    /// Horizontal position, percent of viewport width in [0, 100)
    pub left_percent: f32,
    /// CSS color from the palette
    pub color: String,
    /// Edge length (px)
    pub size: f32,
    pub fall_duration_secs: f32,
    pub start_delay_secs: f32,
}

/// Particles sharing one creation and one expiry
#[derive(Debug, Clone)]
pub struct ConfettiBatch {
    pub id: BatchId,
    /// Seconds on the session clock
    pub created_at: f64,
    pub expires_at: f64,
    pub particles: Vec<ConfettiParticle>,
}

/// What changed during a start or advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectEvent {
    BatchEmitted(BatchId),
    BatchExpired(BatchId),
    /// The repeating emitter was cancelled; live batches still run out
    EmissionStopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EffectTask {
    Emit,
    Expire(BatchId),
    Stop,
}

/// Batch emitter with its own timers
#[derive(Debug, Clone)]
pub struct ConfettiEffect {
    settings: ConfettiSettings,
    scheduler: Scheduler<EffectTask>,
    batches: Vec<ConfettiBatch>,
    /// Repeating emission task, while emitting
    emitter: Option<TaskId>,
    next_batch: u32,
    next_particle: u64,
}

impl ConfettiEffect {
    pub fn new(settings: ConfettiSettings) -> Self {
        Self {
            settings,
            scheduler: Scheduler::new(),
            batches: Vec::new(),
            emitter: None,
            next_batch: 1,
            next_particle: 1,
        }
    }

    /// True while batches are still being emitted
    pub fn is_emitting(&self) -> bool {
        self.emitter.is_some()
    }

    /// True while emitting or while any batch is on screen
    pub fn is_active(&self) -> bool {
        self.is_emitting() || !self.batches.is_empty()
    }

    /// Live batches, oldest first
    pub fn batches(&self) -> &[ConfettiBatch] {
        &self.batches
    }

    pub fn batch(&self, id: BatchId) -> Option<&ConfettiBatch> {
        self.batches.iter().find(|b| b.id == id)
    }

    /// Union of all live batches
    pub fn active_particles(&self) -> impl Iterator<Item = &ConfettiParticle> {
        self.batches.iter().flat_map(|b| b.particles.iter())
    }

    pub fn active_count(&self) -> usize {
        self.batches.iter().map(|b| b.particles.len()).sum()
    }

    /// Timers still waiting to fire
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// When the next timer fires, if any
    pub fn next_due(&self) -> Option<f64> {
        self.scheduler.next_due()
    }

    /// Begin a celebration cycle at `now`
    ///
    /// Emits the first batch immediately. Ignored while a cycle is active.
    pub fn start<S: UnitSource + ?Sized>(&mut self, now: f64, rng: &mut S) -> Vec<EffectEvent> {
        if self.is_active() {
            log::debug!("Confetti already running, ignoring start");
            return Vec::new();
        }

        let interval = self.settings.emit_interval;
        self.emitter = Some(
            self.scheduler
                .schedule_repeating(now + interval, interval, EffectTask::Emit),
        );
        self.scheduler
            .schedule_once(now + self.settings.emit_duration, EffectTask::Stop);
        log::info!(
            "Confetti started: every {}s for {}s",
            interval,
            self.settings.emit_duration
        );

        vec![self.emit_batch(now, rng)]
    }

    /// Fire every timer due at or before `now`
    pub fn advance<S: UnitSource + ?Sized>(&mut self, now: f64, rng: &mut S) -> Vec<EffectEvent> {
        let mut events = Vec::new();
        while let Some(fired) = self.scheduler.pop_due(now) {
            match fired.task {
                EffectTask::Emit => events.push(self.emit_batch(fired.due, rng)),
                EffectTask::Expire(id) => {
                    self.batches.retain(|b| b.id != id);
                    log::debug!("Confetti batch {} expired", id.0);
                    events.push(EffectEvent::BatchExpired(id));
                }
                EffectTask::Stop => {
                    if let Some(emitter) = self.emitter.take() {
                        self.scheduler.cancel(emitter);
                    }
                    log::info!("Confetti emission stopped");
                    events.push(EffectEvent::EmissionStopped);
                }
            }
        }
        events
    }

    /// Drop every pending timer and every live batch
    pub fn cancel_all(&mut self) {
        self.scheduler.cancel_all();
        self.emitter = None;
        self.batches.clear();
    }

    fn emit_batch<S: UnitSource + ?Sized>(&mut self, now: f64, rng: &mut S) -> EffectEvent {
        let id = BatchId(self.next_batch);
        self.next_batch += 1;

        let cfg = &self.settings;
        let mut particles = Vec::with_capacity(cfg.batch_size);
        for _ in 0..cfg.batch_size {
            let particle_id = self.next_particle;
            self.next_particle += 1;
            particles.push(ConfettiParticle {
                id: particle_id,
                batch: id,
                left_percent: lerp(0.0, 100.0, rng.next_unit()).min(99.999),
                color: pick(&cfg.palette, rng.next_unit()),
                size: lerp(cfg.min_size, cfg.max_size, rng.next_unit()),
                fall_duration_secs: lerp(cfg.min_fall, cfg.max_fall, rng.next_unit()),
                start_delay_secs: lerp(0.0, cfg.max_delay, rng.next_unit()),
            });
        }

        let expires_at = now + cfg.batch_lifetime;
        self.scheduler.schedule_once(expires_at, EffectTask::Expire(id));
        self.batches.push(ConfettiBatch {
            id,
            created_at: now,
            expires_at,
            particles,
        });
        log::debug!("Confetti batch {} emitted at {:.2}s", id.0, now);
        EffectEvent::BatchEmitted(id)
    }
}

fn pick(palette: &[String], t: f32) -> String {
    if palette.is_empty() {
        return "#ff6b9d".to_string();
    }
    let idx = ((t * palette.len() as f32) as usize).min(palette.len() - 1);
    palette[idx].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn effect() -> (ConfettiEffect, Pcg32) {
        (
            ConfettiEffect::new(ConfettiSettings::default()),
            Pcg32::seed_from_u64(42),
        )
    }

    fn emitted(events: &[EffectEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, EffectEvent::BatchEmitted(_)))
            .count()
    }

    #[test]
    fn test_start_emits_one_batch_immediately() {
        let (mut fx, mut rng) = effect();
        let events = fx.start(0.0, &mut rng);
        assert_eq!(events, vec![EffectEvent::BatchEmitted(BatchId(1))]);
        assert_eq!(fx.active_count(), 150);
        assert!(fx.is_emitting());
    }

    #[test]
    fn test_particles_within_ranges() {
        let (mut fx, mut rng) = effect();
        fx.start(0.0, &mut rng);
        let palette = &ConfettiSettings::default().palette;
        for p in fx.active_particles() {
            assert!((0.0..100.0).contains(&p.left_percent));
            assert!((5.0..=15.0).contains(&p.size));
            assert!((2.0..=5.0).contains(&p.fall_duration_secs));
            assert!((0.0..=0.5).contains(&p.start_delay_secs));
            assert!(palette.contains(&p.color));
        }
    }

    #[test]
    fn test_particle_ids_unique_across_batches() {
        let (mut fx, mut rng) = effect();
        fx.start(0.0, &mut rng);
        fx.advance(2.0, &mut rng);
        let mut ids: Vec<u64> = fx.active_particles().map(|p| p.id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(total, 300);
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_batch_lifetime() {
        let (mut fx, mut rng) = effect();
        fx.start(0.0, &mut rng);
        fx.advance(4.999, &mut rng);
        assert!(fx.batch(BatchId(1)).is_some());
        let events = fx.advance(5.0, &mut rng);
        assert!(events.contains(&EffectEvent::BatchExpired(BatchId(1))));
        assert!(fx.batch(BatchId(1)).is_none());
        assert!(fx.active_particles().all(|p| p.batch != BatchId(1)));
    }

    #[test]
    fn test_batches_expire_independently() {
        let (mut fx, mut rng) = effect();
        fx.start(0.0, &mut rng);
        fx.advance(2.0, &mut rng);
        fx.advance(4.0, &mut rng);
        assert_eq!(fx.batches().len(), 3);

        fx.advance(5.0, &mut rng);
        let ids: Vec<_> = fx.batches().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![BatchId(2), BatchId(3)]);

        fx.advance(7.0, &mut rng);
        let ids: Vec<_> = fx.batches().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![BatchId(3), BatchId(4)]);
    }

    #[test]
    fn test_emission_stops_after_duration() {
        let (mut fx, mut rng) = effect();
        let mut total = emitted(&fx.start(0.0, &mut rng));
        let mut t = 0.0;
        let mut stopped = false;
        while t < 20.0 {
            t += 0.25;
            let events = fx.advance(t, &mut rng);
            total += emitted(&events);
            stopped |= events.contains(&EffectEvent::EmissionStopped);
        }
        // Batches at 0, 2, 4, 6, 8; the stop at 10 wins the tie
        assert_eq!(total, 5);
        assert!(stopped);
        assert!(!fx.is_active());
        assert_eq!(fx.pending_tasks(), 0);
    }

    #[test]
    fn test_large_time_jump_matches_stepping() {
        let (mut fx, mut rng) = effect();
        let mut total = emitted(&fx.start(0.0, &mut rng));
        let events = fx.advance(30.0, &mut rng);
        total += emitted(&events);
        assert_eq!(total, 5);
        assert_eq!(fx.batches().len(), 0);
        assert_eq!(fx.pending_tasks(), 0);
    }

    #[test]
    fn test_expiries_fire_after_stop() {
        let (mut fx, mut rng) = effect();
        fx.start(0.0, &mut rng);
        fx.advance(10.0, &mut rng);
        assert!(!fx.is_emitting());
        // Batches from t=6 and t=8 are still on screen
        assert_eq!(fx.batches().len(), 2);
        let events = fx.advance(13.0, &mut rng);
        assert_eq!(
            events,
            vec![
                EffectEvent::BatchExpired(BatchId(4)),
                EffectEvent::BatchExpired(BatchId(5))
            ]
        );
    }

    #[test]
    fn test_double_start_is_ignored() {
        let (mut fx, mut rng) = effect();
        fx.start(0.0, &mut rng);
        assert!(fx.start(0.5, &mut rng).is_empty());
        assert_eq!(fx.batches().len(), 1);
        // One emitter, one stop, one expiry
        assert_eq!(fx.pending_tasks(), 3);
    }

    #[test]
    fn test_cancel_all_silences_timers() {
        let (mut fx, mut rng) = effect();
        fx.start(0.0, &mut rng);
        fx.cancel_all();
        assert!(fx.advance(100.0, &mut rng).is_empty());
        assert_eq!(fx.active_count(), 0);
    }
}
