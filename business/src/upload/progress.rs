//! Byte-count to percent mapping for a single transfer.

/// Tracks the percent reported for the current transfer.
///
/// The percent only moves forward: events that would lower it, or that arrive
/// without a usable total, leave it where it is.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTracker {
    percent: u8,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn reset(&mut self) {
        self.percent = 0;
    }

    /// Feed one progress event. Returns the new percent when it increased.
    pub fn observe(&mut self, bytes_sent: u64, total_bytes: Option<u64>) -> Option<u8> {
        let percent = percent_of(bytes_sent, total_bytes?)?;
        if percent > self.percent {
            self.percent = percent;
            Some(percent)
        } else {
            None
        }
    }
}

/// `floor(sent / total * 100)`, clamped to 100. A zero total is not computable.
pub fn percent_of(bytes_sent: u64, total_bytes: u64) -> Option<u8> {
    if total_bytes == 0 {
        return None;
    }
    let percent = (u128::from(bytes_sent) * 100 / u128::from(total_bytes)).min(100);
    u8::try_from(percent).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_and_full() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.observe(250_000, Some(1_000_000)), Some(25));
        assert_eq!(tracker.observe(1_000_000, Some(1_000_000)), Some(100));
        assert_eq!(tracker.percent(), 100);
    }

    #[test]
    fn rounds_down() {
        assert_eq!(percent_of(999, 1000), Some(99));
        assert_eq!(percent_of(1, 3), Some(33));
        assert_eq!(percent_of(2, 3), Some(66));
    }

    #[test]
    fn clamps_overshoot() {
        assert_eq!(percent_of(5_000, 1_000), Some(100));
        assert_eq!(percent_of(u64::MAX, 1), Some(100));
    }

    #[test]
    fn unknown_total_keeps_last_value() {
        let mut tracker = ProgressTracker::new();
        tracker.observe(40, Some(100));
        assert_eq!(tracker.observe(90, None), None);
        assert_eq!(tracker.observe(90, Some(0)), None);
        assert_eq!(tracker.percent(), 40);
    }

    #[test]
    fn never_decreases() {
        let mut tracker = ProgressTracker::new();
        let events = [
            (10, Some(100)),
            (60, Some(100)),
            (30, Some(100)),
            (60, Some(100)),
            (70, None),
            (80, Some(100)),
            (20, Some(100)),
        ];

        let mut seen = Vec::new();
        for (sent, total) in events {
            tracker.observe(sent, total);
            seen.push(tracker.percent());
        }

        assert_eq!(seen, vec![10, 60, 60, 60, 60, 80, 80]);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(seen.iter().all(|p| *p <= 100));
    }

    #[test]
    fn repeated_percent_is_not_reported_twice() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.observe(500, Some(1000)), Some(50));
        assert_eq!(tracker.observe(505, Some(1000)), None);
    }

    #[test]
    fn reset_starts_over() {
        let mut tracker = ProgressTracker::new();
        tracker.observe(100, Some(100));
        tracker.reset();
        assert_eq!(tracker.percent(), 0);
        assert_eq!(tracker.observe(10, Some(100)), Some(10));
    }
}
