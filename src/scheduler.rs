//! The cooperative, round-robin scheduler that times-slices every live
//! connection's response pump off one periodic tick.
//!
//! Modeled as an owned object with an explicit `tick()` rather than a
//! hidden global singleton: the embedding event loop owns one `Scheduler`
//! and drives it from its own timer.

/// Suggested tick interval for the embedding event loop's timer.
pub const SCHED_RES_MS: u32 = 10;

/// Number of consecutive empty ticks (nothing in the ring did any work)
/// before `is_idle()` reports true and the caller may disarm its timer.
/// Expressed as a saturating counter compared against a threshold,
/// rather than relying on wraparound, so idleness is detected exactly
/// once and doesn't require the counter to overflow first.
pub const IDLE_TICKS_BEFORE_DISARM: u32 = 50;

/// One scheduled entry: typically a `Request` paired with its transport.
/// `pump` should perform at most one bounded unit of work per call (one
/// transport write) and report whether it made progress.
pub trait SchedulerEntry {
    fn pump(&mut self, heap_ok: bool) -> bool;
    fn is_finished(&self) -> bool;
}

pub struct Scheduler<E: SchedulerEntry> {
    entries: Vec<Option<E>>,
    cursor: usize,
    idle_ticks: u32,
}

impl<E: SchedulerEntry> Scheduler<E> {
    pub fn new() -> Scheduler<E> {
        Scheduler { entries: Vec::new(), cursor: 0, idle_ticks: 0 }
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the live entries in slot order (not tick order). Intended
    /// for introspection — metrics, tests — not for driving work; use
    /// `tick` for that.
    pub fn entries(&self) -> impl Iterator<Item = &E> {
        self.entries.iter().filter_map(|e| e.as_ref())
    }

    /// Register a new live entry, returning a stable slot id for later
    /// removal. Reuses a vacated slot when one exists so the ring doesn't
    /// grow without bound across churn.
    pub fn insert(&mut self, entry: E) -> usize {
        for (i, slot) in self.entries.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(entry);
                return i;
            }
        }
        self.entries.push(Some(entry));
        self.entries.len() - 1
    }

    /// Remove an entry by slot id. If the cursor pointed at this slot,
    /// it's advanced so a removal mid-walk never leaves it dangling.
    pub fn remove(&mut self, id: usize) -> Option<E> {
        if id >= self.entries.len() {
            return None;
        }
        let removed = self.entries[id].take();
        if self.cursor == id {
            self.advance_cursor();
        }
        removed
    }

    fn advance_cursor(&mut self) {
        if self.entries.is_empty() {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor + 1) % self.entries.len();
    }

    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    pub fn is_idle(&self) -> bool {
        self.idle_ticks >= IDLE_TICKS_BEFORE_DISARM
    }

    /// One scheduler tick: walk the ring once starting at the cursor,
    /// giving each live entry one pump call, honoring `heap_ok` as the
    /// free-heap gate the real embedding checks before each fill. Removes
    /// any entry that reports finished. Tracks consecutive idle ticks for
    /// `is_idle()`.
    pub fn tick(&mut self, heap_ok: bool) {
        if self.entries.is_empty() {
            self.idle_ticks = self.idle_ticks.saturating_add(1);
            return;
        }
        let len = self.entries.len();
        let mut any_progress = false;
        let mut to_remove = Vec::new();

        for step in 0..len {
            let idx = (self.cursor + step) % len;
            if let Some(entry) = self.entries[idx].as_mut() {
                if !heap_ok {
                    break;
                }
                if entry.pump(heap_ok) {
                    any_progress = true;
                }
                if entry.is_finished() {
                    to_remove.push(idx);
                }
            }
        }
        for idx in to_remove {
            self.remove(idx);
        }
        self.advance_cursor();

        if any_progress {
            self.idle_ticks = 0;
        } else {
            self.idle_ticks = self.idle_ticks.saturating_add(1);
        }
    }
}

impl<E: SchedulerEntry> Default for Scheduler<E> {
    fn default() -> Scheduler<E> {
        Scheduler::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Counter {
        remaining: u32,
    }

    impl SchedulerEntry for Counter {
        fn pump(&mut self, _heap_ok: bool) -> bool {
            if self.remaining > 0 {
                self.remaining -= 1;
                true
            } else {
                false
            }
        }

        fn is_finished(&self) -> bool {
            self.remaining == 0
        }
    }

    #[test]
    fn each_live_entry_gets_one_write_per_tick() {
        let mut sched = Scheduler::new();
        sched.insert(Counter { remaining: 3 });
        sched.insert(Counter { remaining: 3 });
        sched.tick(true);
        assert_eq!(sched.len(), 2);
    }

    #[test]
    fn finished_entries_are_removed_after_the_tick_that_finishes_them() {
        let mut sched = Scheduler::new();
        sched.insert(Counter { remaining: 1 });
        assert_eq!(sched.len(), 1);
        sched.tick(true);
        assert_eq!(sched.len(), 0);
    }

    #[test]
    fn removal_mid_walk_advances_a_dangling_cursor() {
        let mut sched = Scheduler::new();
        let a = sched.insert(Counter { remaining: 5 });
        sched.insert(Counter { remaining: 5 });
        // force the cursor to point at `a`, then remove it
        sched.remove(a);
        assert_eq!(sched.len(), 1);
        // subsequent tick must not panic or touch a freed slot
        sched.tick(true);
    }

    #[test]
    fn idle_ticks_accumulate_and_threshold_without_wraparound() {
        let mut sched: Scheduler<Counter> = Scheduler::new();
        for _ in 0..(IDLE_TICKS_BEFORE_DISARM + 5) {
            sched.tick(true);
        }
        assert!(sched.is_idle());
        assert!(sched.idle_ticks() >= IDLE_TICKS_BEFORE_DISARM);
    }

    #[test]
    fn progress_resets_idle_counter() {
        let mut sched = Scheduler::new();
        sched.insert(Counter { remaining: 1000 });
        for _ in 0..(IDLE_TICKS_BEFORE_DISARM - 1) {
            sched.tick(true);
        }
        assert!(!sched.is_idle());
    }
}
