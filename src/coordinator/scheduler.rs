//! Cancellable deadline timers
//!
//! There is no background thread. The owner arms a timer with a deadline and
//! calls `take_due` from its event loop. Each kind has one slot, so re-arming
//! replaces the old deadline and cancelling empties the slot.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Source of "now" for the coordinator.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timers
// ─────────────────────────────────────────────────────────────────────────────

/// The two deferred jobs the coordinator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Full re-render after the source pane goes quiet
    Rerender,
    /// Re-render after a block loses focus, unless another block takes it
    FinishEditing,
}

/// At most one outstanding deadline per kind.
#[derive(Debug, Default)]
pub struct Scheduler {
    rerender: Option<Instant>,
    finish_editing: Option<Instant>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<Instant> {
        match kind {
            TimerKind::Rerender => &mut self.rerender,
            TimerKind::FinishEditing => &mut self.finish_editing,
        }
    }

    fn peek(&self, kind: TimerKind) -> Option<Instant> {
        match kind {
            TimerKind::Rerender => self.rerender,
            TimerKind::FinishEditing => self.finish_editing,
        }
    }

    /// Arm `kind` to fire `delay` after `now`, replacing any earlier arming.
    pub fn schedule(&mut self, kind: TimerKind, delay: Duration, now: Instant) {
        *self.slot(kind) = Some(now + delay);
    }

    /// Disarm `kind`. Returns whether anything was pending.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.slot(kind).take().is_some()
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.peek(kind).is_some()
    }

    /// When `kind` comes due, if armed.
    pub fn deadline(&self, kind: TimerKind) -> Option<Instant> {
        self.peek(kind)
    }

    /// Earliest deadline, for an event loop deciding how long to sleep.
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.finish_editing, self.rerender].into_iter().flatten().min()
    }

    /// Disarm and return every timer due at `now`; blur handling first.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due = Vec::new();
        for kind in [TimerKind::FinishEditing, TimerKind::Rerender] {
            let slot = self.slot(kind);
            if slot.is_some_and(|deadline| deadline <= now) {
                *slot = None;
                due.push(kind);
            }
        }
        due
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(200);

    #[test]
    fn test_timer_fires_after_deadline() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TimerKind::Rerender, DEBOUNCE, clock.now());

        clock.advance(Duration::from_millis(199));
        assert!(scheduler.take_due(clock.now()).is_empty());

        clock.advance(Duration::from_millis(1));
        assert_eq!(scheduler.take_due(clock.now()), vec![TimerKind::Rerender]);
        assert!(!scheduler.is_pending(TimerKind::Rerender));
        assert!(scheduler.take_due(clock.now()).is_empty());
    }

    #[test]
    fn test_reschedule_pushes_deadline() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TimerKind::Rerender, DEBOUNCE, clock.now());
        clock.advance(Duration::from_millis(150));
        scheduler.schedule(TimerKind::Rerender, DEBOUNCE, clock.now());
        assert_eq!(scheduler.deadline(TimerKind::Rerender), Some(clock.now() + DEBOUNCE));

        clock.advance(Duration::from_millis(100));
        assert!(scheduler.take_due(clock.now()).is_empty());
        clock.advance(Duration::from_millis(100));
        assert_eq!(scheduler.take_due(clock.now()), vec![TimerKind::Rerender]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TimerKind::FinishEditing, Duration::ZERO, clock.now());
        assert!(scheduler.cancel(TimerKind::FinishEditing));
        assert!(!scheduler.cancel(TimerKind::FinishEditing));
        assert!(scheduler.take_due(clock.now()).is_empty());
    }

    #[test]
    fn test_zero_delay_is_due_on_next_poll() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TimerKind::Rerender, DEBOUNCE, clock.now());
        scheduler.schedule(TimerKind::FinishEditing, Duration::ZERO, clock.now());
        assert_eq!(scheduler.next_deadline(), Some(clock.now()));
        assert_eq!(scheduler.take_due(clock.now()), vec![TimerKind::FinishEditing]);
        assert!(scheduler.is_pending(TimerKind::Rerender));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = clock.now();
        other.advance(Duration::from_secs(1));
        assert_eq!(clock.now() - start, Duration::from_secs(1));
    }
}
