// Frame and interval scheduling
//
// The animation loop requests one-shot frames (like an animation-frame
// callback) and the poller registers a repeating interval. Both are driven
// by a single Scheduler that the main loop polls once per iteration, so
// the stepping logic never needs a real event loop and tests can advance a
// ManualClock by hand.

#[cfg(test)]
use std::cell::Cell;
#[cfg(test)]
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Time source for the scheduler
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced clock for tests
///
/// Clones share the same time, so a test can keep one handle and move the
/// clock the scheduler reads from.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    /// Move the clock forward by whole milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

#[cfg(test)]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

/// Handle for a pending one-shot frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

/// Handle for a registered repeating interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalId(u64);

/// A timer that came due during `poll`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// A requested frame; `at` is the frame timestamp
    Frame { id: FrameId, at: Instant },
    /// An interval tick
    Interval { id: IntervalId, at: Instant },
}

/// Frame/interval scheduling interface
pub trait Scheduler {
    /// Request a single frame on the next poll
    fn schedule_frame(&mut self) -> FrameId;

    /// Cancel a pending frame; unknown or already-fired ids are ignored
    fn cancel_frame(&mut self, id: FrameId);

    /// Register a repeating interval whose first tick is one period away
    fn schedule_interval(&mut self, period: Duration) -> IntervalId;

    /// Cancel an interval; unknown ids are ignored
    fn cancel_interval(&mut self, id: IntervalId);

    /// Collect every timer due at the current clock reading
    fn poll(&mut self) -> Vec<Wake>;

    /// Current clock reading
    fn now(&self) -> Instant;

    /// Whether no frames or intervals are registered
    fn is_idle(&self) -> bool;
}

#[derive(Debug, Clone)]
struct IntervalTimer {
    id: IntervalId,
    period: Duration,
    next_due: Instant,
}

/// Scheduler over any Clock
pub struct TimerScheduler<C: Clock> {
    clock: C,
    next_id: u64,
    frames: Vec<FrameId>,
    intervals: Vec<IntervalTimer>,
}

impl<C: Clock> TimerScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            next_id: 1,
            frames: Vec::new(),
            intervals: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Number of pending frames (test visibility)
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of registered intervals (test visibility)
    pub fn active_intervals(&self) -> usize {
        self.intervals.len()
    }
}

impl<C: Clock> Scheduler for TimerScheduler<C> {
    fn schedule_frame(&mut self) -> FrameId {
        let id = FrameId(self.allocate_id());
        self.frames.push(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.frames.retain(|f| *f != id);
    }

    fn schedule_interval(&mut self, period: Duration) -> IntervalId {
        let id = IntervalId(self.allocate_id());
        // A zero period would fire on every poll
        let period = period.max(Duration::from_millis(1));
        self.intervals.push(IntervalTimer {
            id,
            period,
            next_due: self.clock.now() + period,
        });
        id
    }

    fn cancel_interval(&mut self, id: IntervalId) {
        self.intervals.retain(|t| t.id != id);
    }

    fn poll(&mut self) -> Vec<Wake> {
        let now = self.clock.now();
        let mut due: Vec<Wake> = self
            .frames
            .drain(..)
            .map(|id| Wake::Frame { id, at: now })
            .collect();

        for timer in &mut self.intervals {
            if now >= timer.next_due {
                due.push(Wake::Interval { id: timer.id, at: now });
                // Missed ticks collapse into one; no catch-up burst
                timer.next_due += timer.period;
                if timer.next_due <= now {
                    timer.next_due = now + timer.period;
                }
            }
        }

        due
    }

    fn now(&self) -> Instant {
        self.clock.now()
    }

    fn is_idle(&self) -> bool {
        self.frames.is_empty() && self.intervals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual() -> (ManualClock, TimerScheduler<ManualClock>) {
        let clock = ManualClock::new();
        let scheduler = TimerScheduler::new(clock.clone());
        (clock, scheduler)
    }

    #[test]
    fn test_frame_fires_once() {
        let (_clock, mut scheduler) = manual();
        let id = scheduler.schedule_frame();

        let wakes = scheduler.poll();
        assert_eq!(wakes.len(), 1);
        assert!(matches!(wakes[0], Wake::Frame { id: fired, .. } if fired == id));

        assert!(scheduler.poll().is_empty());
    }

    #[test]
    fn test_cancelled_frame_never_fires() {
        let (_clock, mut scheduler) = manual();
        let id = scheduler.schedule_frame();
        scheduler.cancel_frame(id);

        assert!(scheduler.poll().is_empty());
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_interval_fires_each_period() {
        let (clock, mut scheduler) = manual();
        let id = scheduler.schedule_interval(Duration::from_secs(10));

        clock.advance_ms(9_999);
        assert!(scheduler.poll().is_empty());

        clock.advance_ms(1);
        let wakes = scheduler.poll();
        assert!(matches!(wakes.as_slice(), [Wake::Interval { id: fired, .. }] if *fired == id));

        clock.advance_ms(10_000);
        assert_eq!(scheduler.poll().len(), 1);
    }

    #[test]
    fn test_interval_missed_ticks_collapse() {
        let (clock, mut scheduler) = manual();
        scheduler.schedule_interval(Duration::from_secs(1));

        clock.advance(Duration::from_secs(5));
        assert_eq!(scheduler.poll().len(), 1);
        assert!(scheduler.poll().is_empty());

        clock.advance(Duration::from_secs(1));
        assert_eq!(scheduler.poll().len(), 1);
    }

    #[test]
    fn test_cancel_interval() {
        let (clock, mut scheduler) = manual();
        let id = scheduler.schedule_interval(Duration::from_millis(100));
        scheduler.cancel_interval(id);

        clock.advance_ms(1_000);
        assert!(scheduler.poll().is_empty());
        assert_eq!(scheduler.active_intervals(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let (_clock, mut scheduler) = manual();
        let a = scheduler.schedule_frame();
        let b = scheduler.schedule_frame();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending_frames(), 2);
    }
}
