//! Temporal bar timeframe definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Duration of a temporal bar, in seconds.
///
/// `Timeframe::TICK` (zero seconds) denotes raw tick input. Any positive number
/// of seconds is a valid timeframe; the named constants cover the usual chart
/// resolutions. [`Timeframe::WEEK1`] and [`Timeframe::MONTH1`] are calendar
/// aligned by the temporal generator rather than epoch aligned.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timeframe(u64);

impl Timeframe {
    /// Tick-by-tick (no aggregation).
    pub const TICK: Self = Self(0);
    /// 1-second bars.
    pub const SECOND1: Self = Self(1);
    /// 1-minute bars.
    pub const MINUTE1: Self = Self(60);
    /// 3-minute bars.
    pub const MINUTE3: Self = Self(180);
    /// 5-minute bars.
    pub const MINUTE5: Self = Self(300);
    /// 15-minute bars.
    pub const MINUTE15: Self = Self(900);
    /// 30-minute bars.
    pub const MINUTE30: Self = Self(1800);
    /// 1-hour bars.
    pub const HOUR1: Self = Self(3600);
    /// 2-hour bars.
    pub const HOUR2: Self = Self(7200);
    /// 4-hour bars.
    pub const HOUR4: Self = Self(14_400);
    /// Daily bars.
    pub const DAY1: Self = Self(86_400);
    /// Weekly bars, starting Monday 00:00 UTC.
    pub const WEEK1: Self = Self(604_800);
    /// Monthly bars, starting on day 1 at 00:00 UTC.
    pub const MONTH1: Self = Self(2_592_000);

    /// Creates a timeframe from a number of seconds.
    #[must_use]
    pub const fn from_seconds(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Returns the duration in seconds (zero for tick data).
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        self.0
    }

    /// Returns the duration in seconds as `f64`, matching tick timestamps.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_secs_f64(&self) -> f64 {
        self.0 as f64
    }

    /// Returns true if this is tick data (no aggregation).
    #[must_use]
    pub const fn is_tick(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if `self` is an exact, non-zero multiple of `other`.
    ///
    /// Every non-tick timeframe is a multiple of [`Timeframe::TICK`].
    #[must_use]
    pub const fn is_multiple_of(&self, other: Self) -> bool {
        if self.0 == 0 {
            return false;
        }
        other.0 == 0 || self.0 % other.0 == 0
    }

    /// Returns the short identifier of a named timeframe.
    #[must_use]
    pub const fn name(&self) -> Option<&'static str> {
        match *self {
            Self::TICK => Some("tick"),
            Self::SECOND1 => Some("s1"),
            Self::MINUTE1 => Some("m1"),
            Self::MINUTE3 => Some("m3"),
            Self::MINUTE5 => Some("m5"),
            Self::MINUTE15 => Some("m15"),
            Self::MINUTE30 => Some("m30"),
            Self::HOUR1 => Some("h1"),
            Self::HOUR2 => Some("h2"),
            Self::HOUR4 => Some("h4"),
            Self::DAY1 => Some("d1"),
            Self::WEEK1 => Some("w1"),
            Self::MONTH1 => Some("mo1"),
            _ => None,
        }
    }

    /// Returns all named timeframes.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::TICK,
            Self::SECOND1,
            Self::MINUTE1,
            Self::MINUTE3,
            Self::MINUTE5,
            Self::MINUTE15,
            Self::MINUTE30,
            Self::HOUR1,
            Self::HOUR2,
            Self::HOUR4,
            Self::DAY1,
            Self::WEEK1,
            Self::MONTH1,
        ]
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{}s", self.0),
        }
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // `1M` is the conventional chart label for a month, `1m` for a minute.
        if trimmed == "1M" {
            return Ok(Self::MONTH1);
        }

        let lower = trimmed.to_lowercase();
        if lower == "tick" || lower == "t" {
            return Ok(Self::TICK);
        }
        if let Ok(seconds) = lower.strip_suffix('s').unwrap_or(&lower).parse::<u64>() {
            return Ok(Self(seconds));
        }

        let (unit, count) = split_unit(&lower).ok_or_else(|| TimeframeParseError(s.to_string()))?;
        let scale = match unit {
            "s" => 1,
            "m" => 60,
            "h" => 3600,
            "d" => 86_400,
            "w" => 604_800,
            "mo" => 2_592_000,
            _ => return Err(TimeframeParseError(s.to_string())),
        };
        // Calendar timeframes only exist in units of one.
        if matches!(unit, "w" | "mo") && count != 1 {
            return Err(TimeframeParseError(s.to_string()));
        }
        if count == 0 {
            return Err(TimeframeParseError(s.to_string()));
        }
        count
            .checked_mul(scale)
            .map(Self)
            .ok_or_else(|| TimeframeParseError(s.to_string()))
    }
}

/// Splits `m5`, `5m`, `mo1` or `1mo` into a unit and a count.
fn split_unit(s: &str) -> Option<(&str, u64)> {
    let digits_at = s.find(|c: char| c.is_ascii_digit())?;
    if digits_at == 0 {
        let unit_at = s.find(|c: char| !c.is_ascii_digit())?;
        let count = s[..unit_at].parse().ok()?;
        Some((&s[unit_at..], count))
    } else {
        let count = s[digits_at..].parse().ok()?;
        Some((&s[..digits_at], count))
    }
}

/// Error returned when parsing an invalid timeframe string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeParseError(String);

impl std::fmt::Display for TimeframeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid timeframe '{}', expected one of: tick, s1, m1, m5, m15, m30, h1, h4, d1, w1, mo1 or a number of seconds",
            self.0
        )
    }
}

impl std::error::Error for TimeframeParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_seconds() {
        assert_eq!(Timeframe::TICK.seconds(), 0);
        assert_eq!(Timeframe::MINUTE1.seconds(), 60);
        assert_eq!(Timeframe::HOUR1.seconds(), 3600);
        assert_eq!(Timeframe::WEEK1.seconds(), 604_800);
        assert_eq!(Timeframe::MONTH1.seconds(), 2_592_000);
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!("m1".parse::<Timeframe>().unwrap(), Timeframe::MINUTE1);
        assert_eq!("5m".parse::<Timeframe>().unwrap(), Timeframe::MINUTE5);
        assert_eq!("1h".parse::<Timeframe>().unwrap(), Timeframe::HOUR1);
        assert_eq!("H4".parse::<Timeframe>().unwrap(), Timeframe::HOUR4);
        assert_eq!("w1".parse::<Timeframe>().unwrap(), Timeframe::WEEK1);
        assert_eq!("mo1".parse::<Timeframe>().unwrap(), Timeframe::MONTH1);
        assert_eq!("1M".parse::<Timeframe>().unwrap(), Timeframe::MONTH1);
        assert_eq!("tick".parse::<Timeframe>().unwrap(), Timeframe::TICK);
        assert_eq!("90".parse::<Timeframe>().unwrap().seconds(), 90);
        assert_eq!("45s".parse::<Timeframe>().unwrap().seconds(), 45);
        assert!("invalid".parse::<Timeframe>().is_err());
        assert!("w2".parse::<Timeframe>().is_err());
        assert!("m0".parse::<Timeframe>().is_err());
        assert!("9999999999999999h".parse::<Timeframe>().is_err());
        assert!("18446744073709551615d".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_timeframe_display() {
        assert_eq!(Timeframe::MINUTE5.to_string(), "m5");
        assert_eq!(Timeframe::from_seconds(90).to_string(), "90s");
    }

    #[test]
    fn test_is_multiple_of() {
        assert!(Timeframe::MINUTE5.is_multiple_of(Timeframe::MINUTE1));
        assert!(Timeframe::MINUTE5.is_multiple_of(Timeframe::TICK));
        assert!(!Timeframe::MINUTE5.is_multiple_of(Timeframe::from_seconds(120)));
        assert!(!Timeframe::TICK.is_multiple_of(Timeframe::TICK));
    }
}
