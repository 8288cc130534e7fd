//! In-game wipe countdown
//!
//! Players get one announcement with the total time, a silent wait down to the
//! 30 second mark, then announcements at fixed marks with the exact gap to the
//! next mark slept in between.

use crate::constants::countdown::{MARKS, MIN_SECONDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownStep {
    /// Seconds left, as announced
    pub announce: u64,
    /// Seconds to wait after the announcement
    pub wait_after: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownPlan {
    pub total_seconds: u64,
    pub initial_wait: u64,
    pub steps: Vec<CountdownStep>,
}

impl CountdownPlan {
    /// Countdowns shorter than 30 seconds are raised to 30
    pub fn new(configured_seconds: u64) -> Self {
        let total_seconds = configured_seconds.max(MIN_SECONDS);

        let steps = MARKS
            .iter()
            .enumerate()
            .map(|(i, &mark)| CountdownStep {
                announce: mark,
                wait_after: MARKS.get(i + 1).map_or(mark, |next| mark - next),
            })
            .collect();

        Self {
            total_seconds,
            initial_wait: total_seconds - MIN_SECONDS,
            steps,
        }
    }

    /// Total time as minutes for the opening announcement (`0.75`, `5`, ...)
    pub fn total_minutes(&self) -> String {
        format!("{}", self.total_seconds as f64 / 60.0)
    }
}
