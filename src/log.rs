use indicatif::HumanDuration;
use log::{Level, info, log_enabled};
use std::time::{Duration, Instant};

/// Number of doubling log intervals, the last one ends after 2^19s (~6 days).
const MAX_LOG_COUNT: u32 = 16;

/// Struct that info logs progress messages on a stream action like encoding.
#[derive(Debug)]
pub struct ProgressLogger {
    target: &'static str,
    start: Instant,
    log_count: u32,
}

impl ProgressLogger {
    pub fn new(target: &'static str, start: Instant) -> Self {
        Self {
            target,
            start,
            log_count: 0,
        }
    }

    /// Update and potentially log progress on a stream action.
    /// * `total` total duration of the stream
    /// * `complete` the duration that has been completed at this time
    /// * `fps` frames per second
    pub fn update(&mut self, total: Duration, completed: Duration, fps: f32) {
        if log_enabled!(target: self.target, Level::Info)
            && completed > Duration::ZERO
            && !total.is_zero()
        {
            let done = (completed.as_secs_f64() / total.as_secs_f64()).min(1.0);

            if !self.should_log(self.start.elapsed()) {
                return;
            }

            let elapsed = self.start.elapsed();
            let eta = Duration::from_secs_f64(elapsed.as_secs_f64() / done).saturating_sub(elapsed);
            info!(
                target: self.target,
                "{:.0}%, {fps} fps, eta {}",
                done * 100.0,
                HumanDuration(eta)
            );
        }
    }

    fn should_log(&mut self, elapsed: Duration) -> bool {
        let before_count = self.log_count;
        while self.log_count < MAX_LOG_COUNT && elapsed > self.next_log() {
            self.log_count += 1;
        }
        before_count != self.log_count
    }

    /// First log after >=16s, then >=32s etc
    fn next_log(&self) -> Duration {
        Duration::from_secs(2_u64.pow(self.log_count + 4))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn logs_exponentially() {
        let mut logger = ProgressLogger::new("test", Instant::now());
        assert!(!logger.should_log(Duration::from_secs(10)));
        assert!(logger.should_log(Duration::from_secs(17)));
        assert!(!logger.should_log(Duration::from_secs(30)));
        assert!(logger.should_log(Duration::from_secs(33)));
        assert!(logger.should_log(Duration::from_secs(200)));
        assert!(!logger.should_log(Duration::from_secs(250)));
    }

    #[test]
    fn stops_logging_after_last_interval() {
        let mut logger = ProgressLogger::new("test", Instant::now());
        let elapsed = Duration::from_secs(2_u64.pow(20) + 1);
        assert!(logger.should_log(elapsed));
        assert_eq!(logger.log_count, MAX_LOG_COUNT);
        assert!(!logger.should_log(elapsed));
        assert!(!logger.should_log(Duration::from_secs(u64::MAX)));
    }
}
