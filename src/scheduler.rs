use std::time::{Duration, Instant};

/// Identifies one arming of a [`DeferredPulse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseHandle(u64);

#[derive(Debug)]
struct Pending<A> {
    handle: PulseHandle,
    due: Instant,
    armed_tick: u64,
    action: A,
}

/// Single-slot deferred action timer.
///
/// Arming while an action is pending replaces it (last write wins). Nothing
/// fires on its own: the owner calls [`DeferredPulse::tick`] once per loop
/// cycle and performs whatever action comes back. An action never fires in
/// the tick of the cycle that armed it, even with a zero delay.
#[derive(Debug)]
pub struct DeferredPulse<A> {
    pending: Option<Pending<A>>,
    ticks: u64,
    next_handle: u64,
}

impl<A> Default for DeferredPulse<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> DeferredPulse<A> {
    pub fn new() -> Self {
        DeferredPulse {
            pending: None,
            ticks: 0,
            next_handle: 0,
        }
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, action: A) -> PulseHandle {
        let handle = PulseHandle(self.next_handle);
        self.next_handle += 1;
        self.pending = Some(Pending {
            handle,
            due: now + delay,
            armed_tick: self.ticks,
            action,
        });
        handle
    }

    /// Returns the pending action if it is due at `now`
    pub fn tick(&mut self, now: Instant) -> Option<A> {
        let ticks = self.ticks;
        self.ticks += 1;

        let due = matches!(
            &self.pending,
            Some(p) if p.armed_tick < ticks && p.due <= now
        );
        if due {
            self.pending.take().map(|p| p.action)
        } else {
            None
        }
    }

    pub fn is_pending(&self, handle: PulseHandle) -> bool {
        matches!(&self.pending, Some(p) if p.handle == handle)
    }

    pub fn pending_action(&self) -> Option<&A> {
        self.pending.as_ref().map(|p| &p.action)
    }

    #[cfg(test)]
    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_once_after_delay() {
        let t0 = Instant::now();
        let mut slot = DeferredPulse::new();
        slot.schedule(t0, ms(10), "inject");

        assert_eq!(slot.tick(t0), None);
        assert_eq!(slot.tick(t0 + ms(9)), None);
        assert_eq!(slot.tick(t0 + ms(10)), Some("inject"));
        assert_eq!(slot.tick(t0 + ms(20)), None);
        assert_eq!(slot.pending_action(), None);
    }

    #[test]
    fn test_zero_delay_waits_for_a_later_tick() {
        let t0 = Instant::now();
        let mut slot = DeferredPulse::new();
        slot.tick(t0);

        slot.schedule(t0, Duration::ZERO, 1);
        assert_eq!(slot.tick(t0), None, "same-cycle tick must not fire");
        assert_eq!(slot.tick(t0), Some(1));
    }

    #[test]
    fn test_rescheduling_replaces_pending_action() {
        let t0 = Instant::now();
        let mut slot = DeferredPulse::new();
        let first = slot.schedule(t0, ms(10), 'a');
        let second = slot.schedule(t0 + ms(5), ms(10), 'b');

        assert!(!slot.is_pending(first));
        assert!(slot.is_pending(second));
        assert_eq!(slot.pending_action(), Some(&'b'));

        assert_eq!(slot.tick(t0 + ms(10)), None);
        assert_eq!(slot.tick(t0 + ms(15)), Some('b'));
        assert_eq!(slot.tick(t0 + ms(100)), None);
    }

    #[test]
    fn test_due_at_tracks_latest_arming() {
        let t0 = Instant::now();
        let mut slot = DeferredPulse::new();
        assert_eq!(slot.due_at(), None);
        slot.schedule(t0, ms(51), ());
        assert_eq!(slot.due_at(), Some(t0 + ms(51)));
    }
}
