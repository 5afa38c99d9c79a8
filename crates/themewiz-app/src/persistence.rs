use std::time::{Duration, Instant};

use themewiz_core::config::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Step, path, flag or completion changes.
    Navigation,
    /// Theme-only edits; these wait longer before being written.
    Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTiming {
    pub step_delay: Duration,
    pub theme_delay: Duration,
}

impl Default for SaveTiming {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl SaveTiming {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            step_delay: Duration::from_millis(config.step_debounce_ms),
            theme_delay: Duration::from_millis(config.theme_debounce_ms),
        }
    }

    pub fn immediate() -> Self {
        Self {
            step_delay: Duration::ZERO,
            theme_delay: Duration::ZERO,
        }
    }
}

/// Debounced save deadline. A new change never pushes an existing deadline
/// later; the earliest pending deadline wins.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    timing: SaveTiming,
    deadline: Option<Instant>,
}

impl SaveScheduler {
    pub fn new(timing: SaveTiming) -> Self {
        Self {
            timing,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, kind: ChangeKind, now: Instant) {
        let delay = match kind {
            ChangeKind::Navigation => self.timing.step_delay,
            ChangeKind::Theme => self.timing.theme_delay,
        };
        let candidate = now + delay;

        self.deadline = Some(match self.deadline {
            Some(existing) if existing <= candidate => existing,
            _ => candidate,
        });
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}
