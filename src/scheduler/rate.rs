//! Poll rate and elapsed-time throttling.
//!
//! The trigger may fire far more often than rounds should be issued (an
//! animation-frame-like tick). [`Throttle`] lets a trigger through only once
//! the configured interval has elapsed since the last round it let through.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{LinkError, Result};

/// Lowest accepted rate (one round per 10 s).
pub const MIN_RATE_HZ: f64 = 0.1;

/// Highest accepted rate.
pub const MAX_RATE_HZ: f64 = 60.0;

/// Rate used when the configured one is unusable.
pub const DEFAULT_RATE_HZ: f64 = 60.0;

/// Rounds per second, bounded to `[0.1, 60]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollRate {
    hz: f64,
}

impl PollRate {
    /// Strict constructor: rejects NaN, infinities, and out-of-range rates.
    pub fn try_from_hz(hz: f64) -> Result<Self> {
        if hz.is_finite() && (MIN_RATE_HZ..=MAX_RATE_HZ).contains(&hz) {
            Ok(Self { hz })
        } else {
            Err(LinkError::ConfigurationOutOfRange(format!(
                "poll rate {} Hz outside [{}, {}]",
                hz, MIN_RATE_HZ, MAX_RATE_HZ
            )))
        }
    }

    /// Lenient constructor: anything unusable falls back to the default.
    pub fn from_hz(hz: f64) -> Self {
        Self::try_from_hz(hz).unwrap_or_else(|e| {
            tracing::warn!("{}, using {} Hz", e, DEFAULT_RATE_HZ);
            Self::default()
        })
    }

    /// Lenient constructor from a round interval.
    pub fn from_interval(interval: Duration) -> Self {
        let secs = interval.as_secs_f64();
        if secs > 0.0 {
            Self::from_hz(1.0 / secs)
        } else {
            Self::from_hz(f64::NAN)
        }
    }

    /// Lenient parse of user input such as `"2.5"`.
    pub fn parse(input: &str) -> Self {
        input.parse().unwrap_or_else(|e: LinkError| {
            tracing::warn!("{}, using {} Hz", e, DEFAULT_RATE_HZ);
            Self::default()
        })
    }

    /// Rate in Hz.
    #[inline]
    pub fn hz(&self) -> f64 {
        self.hz
    }

    /// Minimum time between rounds.
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.hz)
    }
}

impl Default for PollRate {
    fn default() -> Self {
        Self {
            hz: DEFAULT_RATE_HZ,
        }
    }
}

impl FromStr for PollRate {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self> {
        let hz: f64 = s.trim().parse().map_err(|_| {
            LinkError::ConfigurationOutOfRange(format!("poll rate {:?} is not a number", s))
        })?;
        Self::try_from_hz(hz)
    }
}

impl fmt::Display for PollRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.hz)
    }
}

/// Lets a trigger through at most once per interval.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    /// Create a throttle; the first check always passes.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Check whether a round may start at `now`, recording it if so.
    pub fn ready(&mut self, now: Instant) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Record a round started outside the throttle.
    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Change the interval; takes effect on the next check.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Current interval.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_bounds() {
        assert!(PollRate::try_from_hz(0.1).is_ok());
        assert!(PollRate::try_from_hz(60.0).is_ok());
        assert!(matches!(
            PollRate::try_from_hz(0.05),
            Err(LinkError::ConfigurationOutOfRange(_))
        ));
        assert!(PollRate::try_from_hz(61.0).is_err());
        assert!(PollRate::try_from_hz(f64::NAN).is_err());
        assert!(PollRate::try_from_hz(f64::INFINITY).is_err());
    }

    #[test]
    fn test_lenient_fallbacks() {
        assert_eq!(PollRate::from_hz(0.0).hz(), DEFAULT_RATE_HZ);
        assert_eq!(PollRate::from_hz(-3.0).hz(), DEFAULT_RATE_HZ);
        assert_eq!(PollRate::from_hz(1000.0).hz(), DEFAULT_RATE_HZ);
        assert_eq!(PollRate::parse("fast").hz(), DEFAULT_RATE_HZ);
        assert_eq!(PollRate::parse("").hz(), DEFAULT_RATE_HZ);
        assert_eq!(PollRate::parse(" 2.5 ").hz(), 2.5);
        assert_eq!(PollRate::from_interval(Duration::ZERO).hz(), DEFAULT_RATE_HZ);
    }

    #[test]
    fn test_interval() {
        let rate = PollRate::from_interval(Duration::from_millis(1000));
        assert_eq!(rate.hz(), 1.0);
        assert_eq!(rate.interval(), Duration::from_secs(1));

        let rate = PollRate::from_hz(4.0);
        assert_eq!(rate.interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_from_str_strict() {
        assert!("abc".parse::<PollRate>().is_err());
        assert!("0".parse::<PollRate>().is_err());
        assert_eq!("10".parse::<PollRate>().unwrap().hz(), 10.0);
    }

    #[test]
    fn test_throttle_16ms_trigger_at_1s_interval() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_millis(1000));

        let fired: Vec<u64> = (0..=3000u64)
            .step_by(16)
            .filter(|&t| throttle.ready(start + Duration::from_millis(t)))
            .collect();

        assert_eq!(fired, vec![0, 1008, 2016]);
    }

    #[test]
    fn test_throttle_mark() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_millis(100));
        throttle.mark(start);

        assert!(!throttle.ready(start + Duration::from_millis(50)));
        assert!(throttle.ready(start + Duration::from_millis(100)));

        throttle.set_interval(Duration::from_millis(10));
        assert!(throttle.ready(start + Duration::from_millis(110)));
    }
}
