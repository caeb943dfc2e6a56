use std::time::Duration;

use tokio::time::Instant;

/// Stability timer: tracks whether a condition has held continuously for a
/// configured interval.
///
/// The window is armed with [`reset`](Self::reset) when the condition turns
/// true and dropped with [`clear`](Self::clear) when it turns false again;
/// [`has_finished`](Self::has_finished) reports whether the interval fully
/// elapsed since the last arm.
#[derive(Debug)]
pub struct Threshold {
    interval: Duration,
    start: Option<Instant>,
    reset_counter: u32,
}

impl Threshold {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            start: None,
            reset_counter: 0,
        }
    }

    /// Arm the window starting now.
    pub fn reset(&mut self) {
        self.start = Some(Instant::now());
        self.reset_counter += 1;
    }

    /// Drop the window without counting a reset.
    pub fn clear(&mut self) {
        self.start = None;
    }

    pub fn is_armed(&self) -> bool {
        self.start.is_some()
    }

    /// True once the interval elapsed since the last [`reset`](Self::reset).
    pub fn has_finished(&self) -> bool {
        self.start
            .is_some_and(|start| start.elapsed() >= self.interval)
    }

    /// How many times the window was armed. Diagnostic only.
    pub fn reset_count(&self) -> u32 {
        self.reset_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn unarmed_threshold_never_finishes() {
        let threshold = Threshold::new(Duration::from_millis(100));
        assert!(!threshold.is_armed());

        sleep(Duration::from_secs(5)).await;
        assert!(!threshold.has_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn finishes_once_interval_elapsed() {
        let mut threshold = Threshold::new(Duration::from_millis(100));
        threshold.reset();
        assert!(threshold.is_armed());
        assert!(!threshold.has_finished());

        sleep(Duration::from_millis(99)).await;
        assert!(!threshold.has_finished());

        sleep(Duration::from_millis(1)).await;
        assert!(threshold.has_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_rearms_the_window() {
        let mut threshold = Threshold::new(Duration::from_millis(100));
        threshold.reset();
        sleep(Duration::from_millis(80)).await;

        threshold.reset();
        sleep(Duration::from_millis(80)).await;
        assert!(!threshold.has_finished());
        assert_eq!(threshold.reset_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_disarms_without_counting() {
        let mut threshold = Threshold::new(Duration::from_millis(100));
        threshold.reset();
        threshold.clear();

        sleep(Duration::from_secs(1)).await;
        assert!(!threshold.is_armed());
        assert!(!threshold.has_finished());
        assert_eq!(threshold.reset_count(), 1);
    }
}
