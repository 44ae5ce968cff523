//! Lazy visibility refresh. Mutations only mark the scheduler dirty; the
//! event loop runs at most one refresh pass per cycle, however many marks
//! arrived.
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Counters {
    dirty: Cell<bool>,
    mark_requests: Cell<u64>,
    passes: Cell<u64>,
}

/// Cloneable handle to one engine's dirty flag. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    inner: Rc<Counters>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&self) {
        let inner = &self.inner;
        inner.mark_requests.set(inner.mark_requests.get() + 1);
        inner.dirty.set(true);
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// Starts a refresh pass. Returns `false` if there is nothing to do.
    /// The flag is cleared here so marks raised while the pass runs survive
    /// for the next one.
    pub(crate) fn begin_pass(&self) -> bool {
        let inner = &self.inner;
        if !inner.dirty.replace(false) {
            return false;
        }
        inner.passes.set(inner.passes.get() + 1);
        true
    }

    /// Number of `mark_dirty` calls so far.
    #[must_use]
    pub fn mark_requests(&self) -> u64 {
        self.inner.mark_requests.get()
    }

    /// Number of refresh passes that did work.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.inner.passes.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_twice_is_the_same_as_marking_once() {
        let scheduler = Scheduler::new();
        scheduler.mark_dirty();
        scheduler.mark_dirty();
        assert!(scheduler.begin_pass());
        assert!(!scheduler.begin_pass());
        assert_eq!(scheduler.passes(), 1);
        assert_eq!(scheduler.mark_requests(), 2);
    }

    #[test]
    fn clean_scheduler_skips_the_pass() {
        let scheduler = Scheduler::new();
        assert!(!scheduler.begin_pass());
        assert_eq!(scheduler.passes(), 0);
    }

    #[test]
    fn marks_during_a_pass_are_kept_for_the_next_one() {
        let scheduler = Scheduler::new();
        let handle = scheduler.clone();
        scheduler.mark_dirty();
        assert!(scheduler.begin_pass());
        handle.mark_dirty();
        assert!(scheduler.is_dirty());
        assert!(scheduler.begin_pass());
    }

    #[test]
    fn independent_schedulers_do_not_share_state() {
        let a = Scheduler::new();
        let b = Scheduler::new();
        a.mark_dirty();
        assert!(!b.is_dirty());
    }
}
