//! Tracker and manager configuration, validation, and error types.
//!
//! [`ManagerConfig`] is the input to
//! [`TrackerManager::configure`](crate::TrackerManager::configure);
//! [`validate()`](ManagerConfig::validate) checks every invariant before
//! any existing unit is torn down.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use framewatch_core::{ClockError, RateRequest};

use crate::classify::{FrameClassifier, DEFAULT_FREEZE_MULTIPLIER};

// ── ResumePolicy ───────────────────────────────────────────────────

/// What a tracker does with its priming state when ticks resume after a
/// pause.
///
/// While paused no ticks arrive, so the first tick after a resume sees
/// an interval that spans the whole pause.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResumePolicy {
    /// Forget the previous timestamp on resume; the first post-resume
    /// tick only primes. Backgrounding is not counted as a stall.
    #[default]
    Reprime,
    /// Keep the previous timestamp; the paused gap is classified like
    /// any other interval and will usually count as frozen.
    CountGap,
}

// ── ClockMode ──────────────────────────────────────────────────────

/// Clock distribution topology for a manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockMode {
    /// One clock subscription owned by the manager, fanned out to every
    /// unit in index order.
    #[default]
    Shared,
    /// Every unit owns an independent clock subscription.
    Dedicated,
}

impl fmt::Display for ClockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
            Self::Dedicated => write!(f, "dedicated"),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while configuring trackers or acquiring their clocks.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Freeze multiplier is NaN, infinite, or below 1.
    InvalidFreezeMultiplier {
        /// The invalid value.
        value: f64,
    },
    /// More units were requested than a [`TrackerId`](framewatch_core::TrackerId) can address.
    TooManyTrackers {
        /// The requested count.
        count: usize,
    },
    /// The clock source refused a subscription.
    Clock(ClockError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFreezeMultiplier { value } => {
                write!(f, "freeze_multiplier must be finite and >= 1.0, got {value}")
            }
            Self::TooManyTrackers { count } => {
                write!(f, "tracker count {count} exceeds u32::MAX")
            }
            Self::Clock(e) => write!(f, "clock: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Clock(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ClockError> for ConfigError {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

// ── TrackerConfig ──────────────────────────────────────────────────

/// Per-unit classification settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerConfig {
    /// Multiple of the budget above which an interval is frozen. Default: 42.
    pub freeze_multiplier: f64,
    /// Priming behavior after a pause. Default: [`ResumePolicy::Reprime`].
    pub resume_policy: ResumePolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            freeze_multiplier: DEFAULT_FREEZE_MULTIPLIER,
            resume_policy: ResumePolicy::default(),
        }
    }
}

impl TrackerConfig {
    /// Check that the freeze multiplier is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.classifier().map(|_| ())
    }

    /// Build the classifier this configuration describes.
    pub fn classifier(&self) -> Result<FrameClassifier, ConfigError> {
        FrameClassifier::with_freeze_multiplier(self.freeze_multiplier).ok_or(
            ConfigError::InvalidFreezeMultiplier {
                value: self.freeze_multiplier,
            },
        )
    }
}

// ── ManagerConfig ──────────────────────────────────────────────────

/// Complete configuration for one run of a [`TrackerManager`](crate::TrackerManager).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManagerConfig {
    /// Number of tracking units to build. Default: 3.
    pub count: usize,
    /// Clock topology. Default: [`ClockMode::Shared`].
    pub mode: ClockMode,
    /// Rate requested from the clock source. Default: 60 Hz, strict.
    pub rate: RateRequest,
    /// Synthetic busy-wait applied at the start of every tick. Default: zero.
    pub work: Duration,
    /// Per-unit classification settings.
    pub tracker: TrackerConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            count: 3,
            mode: ClockMode::default(),
            rate: RateRequest::strict(Default::default()),
            work: Duration::ZERO,
            tracker: TrackerConfig::default(),
        }
    }
}

impl ManagerConfig {
    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if u32::try_from(self.count).is_err() {
            return Err(ConfigError::TooManyTrackers { count: self.count });
        }
        self.tracker.validate()
    }
}
