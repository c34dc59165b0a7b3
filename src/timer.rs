//! Non-blocking interval timers for the measurement scheduler.
//!
//! A timer answers "has my period elapsed since I last fired?" against a
//! caller-supplied millisecond counter. The counter is expected to wrap (a
//! 32-bit `millis()` rolls over after ~49.7 days), so elapsed time is always
//! computed with wrapping subtraction.

/// Milliseconds per second.
pub const MS_PER_SECOND: u32 = 1000;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: u32 = 3600;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u32 = MS_PER_SECOND * SECONDS_PER_HOUR;

/// What happens to the reference timestamp when [`IntervalTimer::is_over`]
/// reports an elapsed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// The timer restarts itself at `now` whenever it reports `true`.
    Auto,
    /// The timer keeps reporting `true` until [`IntervalTimer::start`] is called.
    Manual,
}

/// Restart-on-demand countdown.
///
/// A period of `0` disables the timer: [`is_over`](Self::is_over) never
/// returns `true` and [`remaining`](Self::remaining) returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    period_ms: u32,
    started_at: u32,
    policy: RestartPolicy,
}

impl IntervalTimer {
    /// Create a timer whose first period starts at `now_ms`.
    pub const fn new(period_ms: u32, now_ms: u32, policy: RestartPolicy) -> Self {
        Self {
            period_ms,
            started_at: now_ms,
            policy,
        }
    }

    /// Auto-restarting timer with a period given in seconds.
    pub const fn from_secs(secs: u16, now_ms: u32) -> Self {
        Self::new(secs as u32 * MS_PER_SECOND, now_ms, RestartPolicy::Auto)
    }

    /// Timer with a period given in hours.
    pub const fn from_hours(hours: u8, now_ms: u32, policy: RestartPolicy) -> Self {
        Self::new(hours as u32 * MS_PER_HOUR, now_ms, policy)
    }

    /// Whether this timer can ever fire.
    pub const fn is_enabled(&self) -> bool {
        self.period_ms != 0
    }

    pub const fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub const fn policy(&self) -> RestartPolicy {
        self.policy
    }

    /// Reset the reference timestamp to `now_ms`.
    pub fn start(&mut self, now_ms: u32) {
        self.started_at = now_ms;
    }

    /// Returns `true` when at least one full period has elapsed since the
    /// last (re)start. Auto-restarting timers restart at `now_ms` as a side
    /// effect; manual ones wait for [`start`](Self::start).
    pub fn is_over(&mut self, now_ms: u32) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let over = self.elapsed(now_ms) >= self.period_ms;
        if over && self.policy == RestartPolicy::Auto {
            self.started_at = now_ms;
        }
        over
    }

    /// Milliseconds left until the timer fires, `Some(0)` if it is already
    /// over, `None` if the timer is disabled.
    pub fn remaining(&self, now_ms: u32) -> Option<u32> {
        if !self.is_enabled() {
            return None;
        }
        Some(self.period_ms.saturating_sub(self.elapsed(now_ms)))
    }

    fn elapsed(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_timer_never_fires() {
        let mut timer = IntervalTimer::new(0, 0, RestartPolicy::Auto);
        assert!(!timer.is_over(0));
        assert!(!timer.is_over(1));
        assert!(!timer.is_over(u32::MAX));
        assert_eq!(timer.remaining(10), None);

        let mut manual = IntervalTimer::from_hours(0, 500, RestartPolicy::Manual);
        assert!(!manual.is_over(500));
        assert!(!manual.is_over(u32::MAX));
    }

    #[test]
    fn test_auto_timer_fires_once_per_period() {
        let mut timer = IntervalTimer::new(1000, 0, RestartPolicy::Auto);
        assert!(!timer.is_over(0));
        assert!(!timer.is_over(999));
        assert!(timer.is_over(1000));
        // Restarted at 1000, so the next window closes at 2000.
        assert!(!timer.is_over(1000));
        assert!(!timer.is_over(1999));
        assert!(timer.is_over(2000));
    }

    #[test]
    fn test_auto_timer_at_most_once_per_window() {
        let mut timer = IntervalTimer::new(250, 0, RestartPolicy::Auto);
        let fired = (0..=10_000u32)
            .step_by(10)
            .filter(|now| timer.is_over(*now))
            .count();
        assert_eq!(fired, 40);
    }

    #[test]
    fn test_manual_timer_waits_for_start() {
        let mut timer = IntervalTimer::new(100, 0, RestartPolicy::Manual);
        assert!(!timer.is_over(50));
        assert!(timer.is_over(100));
        assert!(timer.is_over(150), "manual timer must stay over until started");
        timer.start(150);
        assert!(!timer.is_over(249));
        assert!(timer.is_over(250));
    }

    #[test]
    fn test_wraparound_uses_unsigned_distance() {
        let start = u32::MAX - 100;
        let mut timer = IntervalTimer::new(500, start, RestartPolicy::Auto);
        // 200 ms elapsed across the rollover
        assert!(!timer.is_over(99));
        // 500 ms elapsed across the rollover
        assert!(timer.is_over(399));
        assert_eq!(timer.remaining(399), Some(500));
    }

    #[test]
    fn test_remaining() {
        let timer = IntervalTimer::from_secs(10, 1_000);
        assert_eq!(timer.remaining(1_000), Some(10_000));
        assert_eq!(timer.remaining(6_000), Some(5_000));
        assert_eq!(timer.remaining(20_000), Some(0));
    }

    #[test]
    fn test_unit_constructors() {
        assert_eq!(IntervalTimer::from_secs(10, 0).period_ms(), 10_000);
        assert_eq!(
            IntervalTimer::from_hours(24, 0, RestartPolicy::Auto).period_ms(),
            86_400_000
        );
        assert_eq!(
            IntervalTimer::from_hours(255, 0, RestartPolicy::Manual).period_ms(),
            918_000_000
        );
    }
}
