//! Cooperative scheduling for timer-driven UI updates.
//!
//! The event loop owns the clock: registrations queue plain event values and
//! [`Scheduler::drain_due`] hands back whichever are due at the instant the
//! loop passes in. Nothing runs concurrently; callbacks are dispatched
//! synchronously by the caller between input polls.

use std::time::{Duration, Instant};

/// Opaque handle identifying one scheduled registration.
///
/// Handles are never reused within a scheduler's lifetime, so a stale handle
/// cancels nothing instead of cancelling a stranger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy)]
enum Due {
    /// Due at the next drain, whenever that happens.
    NextFrame,
    /// Due once the drain instant reaches this deadline.
    At(Instant),
}

#[derive(Debug)]
struct Registration<E> {
    handle: TaskHandle,
    due: Due,
    event: E,
}

/// Single-threaded registry of frame callbacks and one-shot timers.
#[derive(Debug)]
pub struct Scheduler<E> {
    next_handle: u64,
    queue: Vec<Registration<E>>,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Scheduler {
            next_handle: 0,
            queue: Vec::new(),
        }
    }

    fn push(&mut self, due: Due, event: E) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        self.queue.push(Registration { handle, due, event });
        handle
    }

    /// Registers `event` to fire at the next drain ("before next repaint").
    pub fn request_frame(&mut self, event: E) -> TaskHandle {
        self.push(Due::NextFrame, event)
    }

    /// Registers `event` to fire once `delay` has elapsed past `now`.
    pub fn set_timeout(&mut self, now: Instant, delay: Duration, event: E) -> TaskHandle {
        self.push(Due::At(now + delay), event)
    }

    /// Releases a registration. Cancelling a handle that already fired or was
    /// already cancelled is a safe no-op.
    ///
    /// Returns whether a registration was actually removed.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.queue.len();
        self.queue.retain(|reg| reg.handle != handle);
        self.queue.len() != before
    }

    /// Whether `handle` still refers to a queued registration.
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.queue.iter().any(|reg| reg.handle == handle)
    }

    /// Number of outstanding registrations.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Removes and returns every event due at `now`, in registration order.
    ///
    /// Frame registrations are always due; timers are due once their deadline
    /// has passed. Events registered while the caller dispatches the returned
    /// batch land in the following drain, never the current one.
    pub fn drain_due(&mut self, now: Instant) -> Vec<E> {
        let queue = std::mem::take(&mut self.queue);
        let mut ready = Vec::new();

        for registration in queue {
            let due = match registration.due {
                Due::NextFrame => true,
                Due::At(deadline) => deadline <= now,
            };
            if due {
                ready.push(registration.event);
            } else {
                self.queue.push(registration);
            }
        }

        ready
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_registration_fires_on_next_drain() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        scheduler.request_frame("tick");

        let now = Instant::now();
        assert_eq!(scheduler.drain_due(now), vec!["tick"]);
        assert!(scheduler.drain_due(now).is_empty());
    }

    #[test]
    fn test_timeout_waits_for_deadline() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        let now = Instant::now();
        scheduler.set_timeout(now, Duration::from_secs(30), "elapsed");

        assert!(scheduler.drain_due(now).is_empty());
        assert!(scheduler
            .drain_due(now + Duration::from_secs(29))
            .is_empty());
        assert_eq!(
            scheduler.drain_due(now + Duration::from_secs(30)),
            vec!["elapsed"]
        );
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancel_removes_registration() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        let handle = scheduler.request_frame("tick");
        assert!(scheduler.is_scheduled(handle));

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.is_scheduled(handle));
        assert!(scheduler.drain_due(Instant::now()).is_empty());
    }

    #[test]
    fn test_double_cancel_is_noop() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        let handle = scheduler.request_frame("tick");

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
    }

    #[test]
    fn test_cancel_leaves_other_registrations_alone() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        let first = scheduler.request_frame("a");
        scheduler.request_frame("b");

        scheduler.cancel(first);
        assert_eq!(scheduler.drain_due(Instant::now()), vec!["b"]);
    }

    #[test]
    fn test_drain_preserves_registration_order() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        let now = Instant::now();
        scheduler.request_frame("first");
        scheduler.set_timeout(now, Duration::from_millis(10), "second");
        scheduler.request_frame("third");

        assert_eq!(
            scheduler.drain_due(now + Duration::from_millis(10)),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_handles_are_unique() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        let a = scheduler.request_frame("a");
        scheduler.drain_due(Instant::now());
        let b = scheduler.request_frame("b");
        assert_ne!(a, b);
    }
}
