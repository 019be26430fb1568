use chrono::{DateTime, Utc};

/// Time source for deadline computation. Injected so tests can pin the
/// clock instead of sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Countdown used while the OTP step is active. The timer never drives
/// itself; the owner calls `tick()` once per elapsed second (the binary
/// wires this to a tokio interval). Invariant: `expired` is true exactly
/// when `remaining_seconds` is zero while running.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    remaining_seconds: u64,
    expired: bool,
    running: bool,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self {
            remaining_seconds: 0,
            expired: false,
            running: false,
        }
    }

    pub fn start(&mut self, duration_secs: u64) {
        self.remaining_seconds = duration_secs;
        self.expired = duration_secs == 0;
        self.running = duration_secs > 0;
    }

    /// Advance by one second. Does nothing once stopped or expired.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            self.expired = true;
            self.running = false;
        }
    }

    /// Force-expire, used when the deadline is found to have passed
    /// outside the tick cadence (e.g. after a slow remote call).
    pub fn expire(&mut self) {
        self.remaining_seconds = 0;
        self.expired = true;
        self.running = false;
    }

    /// Cancels the countdown without marking it expired. Called when the
    /// flow leaves the OTP step so a stale timer can't act on a
    /// discarded session.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Below one minute the front-end renders the countdown in its
    /// urgent color. Cosmetic only.
    pub fn is_urgent(&self) -> bool {
        self.remaining_seconds < 60
    }

    /// Zero-padded MM:SS, e.g. 599 -> "09:59".
    pub fn format_mmss(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticked(start: u64, ticks: u64) -> CountdownTimer {
        let mut timer = CountdownTimer::new();
        timer.start(start);
        for _ in 0..ticks {
            timer.tick();
        }
        timer
    }

    #[test]
    fn full_countdown_expires_and_stops() {
        let mut timer = ticked(600, 600);
        assert_eq!(timer.remaining_seconds(), 0);
        assert!(timer.is_expired());
        assert!(!timer.is_running());

        // Further ticks are no-ops.
        timer.tick();
        timer.tick();
        assert_eq!(timer.remaining_seconds(), 0);
        assert!(timer.is_expired());
    }

    #[test]
    fn one_second_short_of_expiry() {
        let timer = ticked(600, 599);
        assert_eq!(timer.remaining_seconds(), 1);
        assert!(!timer.is_expired());
        assert!(timer.is_running());
    }

    #[test]
    fn restart_clears_expiry() {
        let mut timer = ticked(2, 2);
        assert!(timer.is_expired());

        timer.start(600);
        assert!(!timer.is_expired());
        assert_eq!(timer.remaining_seconds(), 600);
    }

    #[test]
    fn stop_halts_without_expiring() {
        let mut timer = ticked(600, 10);
        timer.stop();
        timer.tick();
        assert_eq!(timer.remaining_seconds(), 590);
        assert!(!timer.is_expired());
    }

    #[test]
    fn mmss_formatting() {
        assert_eq!(ticked(600, 1).format_mmss(), "09:59");
        assert_eq!(ticked(600, 0).format_mmss(), "10:00");
        assert_eq!(ticked(600, 600).format_mmss(), "00:00");
        assert_eq!(ticked(65, 0).format_mmss(), "01:05");
    }

    #[test]
    fn urgency_flips_below_one_minute() {
        assert!(!ticked(600, 540).is_urgent());
        assert!(ticked(600, 541).is_urgent());
    }
}
