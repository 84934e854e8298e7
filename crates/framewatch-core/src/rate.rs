//! Refresh-rate requests handed to a clock source.

use std::fmt;

/// Lowest rate a flexible request lets the clock fall back to, in Hz.
pub const FLEXIBLE_FLOOR_HZ: u32 = 60;

/// A positive refresh rate in Hz.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetRate(u32);

impl TargetRate {
    /// 60 Hz.
    pub const HZ_60: Self = Self(60);
    /// 120 Hz.
    pub const HZ_120: Self = Self(120);

    /// Wrap a rate in Hz. Returns `None` for zero.
    pub const fn new(hz: u32) -> Option<Self> {
        if hz == 0 {
            None
        } else {
            Some(Self(hz))
        }
    }

    /// The rate in Hz.
    pub const fn hz(self) -> u32 {
        self.0
    }

    /// Length of one refresh at this rate, `1 / hz` seconds.
    pub fn period_secs(self) -> f64 {
        1.0 / f64::from(self.0)
    }
}

impl Default for TargetRate {
    fn default() -> Self {
        Self::HZ_60
    }
}

impl fmt::Display for TargetRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// The range of refresh rates a clock is allowed to settle on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRateRange {
    /// Slowest acceptable rate.
    pub minimum: u32,
    /// Fastest acceptable rate.
    pub maximum: u32,
    /// Rate the clock should aim for.
    pub preferred: u32,
}

/// What a tracker asks of its clock when it registers.
///
/// `strict` asks for a fixed rate; otherwise the clock may throttle down
/// to [`FLEXIBLE_FLOOR_HZ`]. It never changes how frames are classified.
///
/// # Examples
///
/// ```
/// use framewatch_core::{RateRequest, TargetRate};
///
/// let range = RateRequest::flexible(TargetRate::HZ_120).frame_rate_range();
/// assert_eq!((range.minimum, range.maximum, range.preferred), (60, 120, 120));
///
/// let range = RateRequest::strict(TargetRate::HZ_120).frame_rate_range();
/// assert_eq!(range.minimum, 120);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RateRequest {
    /// Rate the caller wants ticks at.
    pub target: TargetRate,
    /// Request a fixed rate rather than a flexible range.
    pub strict: bool,
}

impl RateRequest {
    /// A fixed-rate request.
    pub fn strict(target: TargetRate) -> Self {
        Self {
            target,
            strict: true,
        }
    }

    /// A request that tolerates throttling down to [`FLEXIBLE_FLOOR_HZ`].
    pub fn flexible(target: TargetRate) -> Self {
        Self {
            target,
            strict: false,
        }
    }

    /// The range a clock should be configured with for this request.
    pub fn frame_rate_range(&self) -> FrameRateRange {
        let hz = self.target.hz();
        let minimum = if self.strict {
            hz
        } else {
            hz.min(FLEXIBLE_FLOOR_HZ)
        };
        FrameRateRange {
            minimum,
            maximum: hz,
            preferred: hz,
        }
    }
}
