//! Deferred tasks on a virtual clock
//!
//! Replaces ad-hoc timer callbacks with explicit entries that carry a
//! cancellation token. The owner drives time forward with `pop_due`, handling
//! each fired task before the next one is picked, so a task may cancel others
//! that fall due at the same instant.

/// Cancellation token for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TaskId,
    /// Seconds on the scheduler clock
    due: f64,
    /// Tie-breaker for equal due times: scheduling order
    seq: u64,
    /// Re-arm period for repeating tasks
    interval: Option<f64>,
    task: T,
}

/// A task that fell due
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    pub id: TaskId,
    /// When it was due, which may be earlier than the clock that fired it
    pub due: f64,
    pub task: T,
}

/// Pending one-shot and repeating tasks, fired in (due, scheduling order)
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
    next_seq: u64,
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            next_seq: 0,
        }
    }

    fn push(&mut self, due: f64, interval: Option<f64>, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.entries.push(Entry {
            id,
            due,
            seq,
            interval,
            task,
        });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Run `task` once at `at`
    pub fn schedule_once(&mut self, at: f64, task: T) -> TaskId {
        self.push(at, None, task)
    }

    /// Run `task` at `first_at` and every `interval` after that until cancelled
    pub fn schedule_repeating(&mut self, first_at: f64, interval: f64, task: T) -> TaskId {
        if !(interval > 0.0 && interval.is_finite()) {
            log::warn!("Invalid repeat interval {interval}, scheduling once");
            return self.push(first_at, None, task);
        }
        self.push(first_at, Some(interval), task)
    }

    /// Drop a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drop every pending task
    pub fn cancel_all(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Cancelling {} pending tasks", self.entries.len());
        }
        self.entries.clear();
    }

    /// Number of pending tasks
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Due time of the earliest pending task
    pub fn next_due(&self) -> Option<f64> {
        self.entries.iter().map(|e| e.due).min_by(f64::total_cmp)
    }

    /// Fire the earliest task due at or before `now`
    ///
    /// Repeating tasks are re-armed one interval later and queue behind
    /// anything already scheduled for that instant.
    pub fn pop_due(&mut self, now: f64) -> Option<Fired<T>> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
            .map(|(i, _)| i)?;

        match self.entries[idx].interval {
            Some(interval) => {
                let seq = self.bump_seq();
                let entry = &mut self.entries[idx];
                let fired = Fired {
                    id: entry.id,
                    due: entry.due,
                    task: entry.task.clone(),
                };
                entry.due += interval;
                entry.seq = seq;
                Some(fired)
            }
            None => {
                let entry = self.entries.swap_remove(idx);
                Some(Fired {
                    id: entry.id,
                    due: entry.due,
                    task: entry.task,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<T: Clone>(sched: &mut Scheduler<T>, now: f64) -> Vec<Fired<T>> {
        std::iter::from_fn(|| sched.pop_due(now)).collect()
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut sched = Scheduler::new();
        sched.schedule_once(3.0, "c");
        sched.schedule_once(1.0, "a");
        sched.schedule_once(2.0, "b");

        let fired: Vec<_> = drain(&mut sched, 2.5).into_iter().map(|f| f.task).collect();
        assert_eq!(fired, vec!["a", "b"]);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_equal_due_fires_in_scheduling_order() {
        let mut sched = Scheduler::new();
        sched.schedule_once(1.0, 1);
        sched.schedule_once(1.0, 2);
        sched.schedule_once(1.0, 3);
        let fired: Vec<_> = drain(&mut sched, 1.0).into_iter().map(|f| f.task).collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn test_repeating_rearms() {
        let mut sched = Scheduler::new();
        let id = sched.schedule_repeating(2.0, 2.0, "tick");
        assert!(drain(&mut sched, 1.9).is_empty());
        let dues: Vec<f64> = drain(&mut sched, 6.0).into_iter().map(|f| f.due).collect();
        assert_eq!(dues, vec![2.0, 4.0, 6.0]);
        assert_eq!(sched.pending(), 1);
        assert_eq!(sched.next_due(), Some(8.0));
        assert!(sched.cancel(id));
        assert_eq!(sched.next_due(), None);
    }

    #[test]
    fn test_rearmed_task_queues_behind_existing() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(2.0, 2.0, "emit");
        sched.schedule_once(4.0, "stop");
        let fired: Vec<_> = drain(&mut sched, 4.0).into_iter().map(|f| f.task).collect();
        assert_eq!(fired, vec!["emit", "stop", "emit"]);
    }

    #[test]
    fn test_cancel() {
        let mut sched = Scheduler::new();
        let a = sched.schedule_once(1.0, "a");
        let b = sched.schedule_repeating(1.0, 1.0, "b");
        assert!(sched.cancel(b));
        assert!(!sched.cancel(b));
        let fired = drain(&mut sched, 5.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, a);
        assert_eq!(fired[0].due, 1.0);
        assert!(!sched.cancel(a));
    }

    #[test]
    fn test_cancel_all() {
        let mut sched = Scheduler::new();
        sched.schedule_once(1.0, ());
        sched.schedule_repeating(1.0, 0.5, ());
        sched.cancel_all();
        assert_eq!(sched.pending(), 0);
        assert!(drain(&mut sched, 100.0).is_empty());
    }

    #[test]
    fn test_invalid_interval_runs_once() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(1.0, 0.0, ());
        assert_eq!(drain(&mut sched, 10.0).len(), 1);
        assert_eq!(sched.pending(), 0);
    }
}
