//! Progress notifications emitted during a submission.

use std::fmt;

/// Percent reported before the upload starts.
pub const UPLOAD_STARTED: u8 = 10;
/// Percent reported once the object is stored.
pub const UPLOADED: u8 = 30;
/// Percent reported once the result record exists.
pub const RECORD_CREATED: u8 = 40;
/// Percent reported once the function invocation is accepted.
pub const TRIGGERED: u8 = 60;
/// Highest percent reachable while still polling.
pub const POLLING_CAP: u8 = 95;
/// Percent reported on success.
pub const COMPLETED: u8 = 100;

/// Position of a submission in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uploading,
    Uploaded,
    RecordCreated,
    Triggered,
    Polling { attempt: u32, max_attempts: u32 },
    Completed,
}

impl Stage {
    /// Phase label shown next to the percentage.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Uploading | Stage::Uploaded => "Uploading",
            Stage::RecordCreated => "Creating result record",
            Stage::Triggered => "Starting processing",
            Stage::Polling { .. } => "Processing",
            Stage::Completed => "Completed",
        }
    }
}

/// One progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 0 to 100.
    pub percent: u8,
    pub stage: Stage,
}

impl Progress {
    pub fn new(percent: u8, stage: Stage) -> Self {
        Self { percent, stage }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Stage::Polling { attempt, max_attempts } => write!(
                f,
                "{:>3}% {} (check {}/{})",
                self.percent,
                self.stage.label(),
                attempt,
                max_attempts
            ),
            _ => write!(f, "{:>3}% {}", self.percent, self.stage.label()),
        }
    }
}

/// Percent reported before poll `attempt` (1-based) of `max_attempts`.
///
/// `60 + min(attempt / max * 40, 35)`, rounded, so it never passes 95.
pub fn polling_percent(attempt: u32, max_attempts: u32) -> u8 {
    if max_attempts == 0 {
        return TRIGGERED;
    }
    let span = (attempt as f64 / max_attempts as f64) * 40.0;
    let percent = TRIGGERED as f64 + span.min((POLLING_CAP - TRIGGERED) as f64);
    percent.round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polling_percent_bounds() {
        assert_eq!(polling_percent(1, 30), 61);
        assert_eq!(polling_percent(15, 30), 80);
        assert_eq!(polling_percent(26, 30), 95);
        assert_eq!(polling_percent(30, 30), 95);
    }

    #[test]
    fn test_polling_percent_non_decreasing() {
        let values: Vec<u8> = (1..=30).map(|a| polling_percent(a, 30)).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert!(values.iter().all(|v| (TRIGGERED..=POLLING_CAP).contains(v)));
    }

    #[test]
    fn test_progress_display() {
        let p = Progress::new(80, Stage::Polling { attempt: 15, max_attempts: 30 });
        assert_eq!(p.to_string(), " 80% Processing (check 15/30)");
        assert_eq!(Progress::new(100, Stage::Completed).to_string(), "100% Completed");
    }
}
