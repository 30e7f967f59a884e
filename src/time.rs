//! Wall-clock → absolute-instant normalization.
//!
//! Callers hand us timestamps in one of two shapes: values that already carry an
//! offset (they round-tripped through RFC 3339 with `Z` or `+hh:mm`), and bare
//! wall-clock readings with no zone at all. The latter are read in the single
//! process-wide reference zone. Everything downstream compares UTC instants only.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::engine::BookingError;
use crate::model::{Span, Timestamp};

/// Bare wall-clock formats accepted when no offset is present.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A caller-supplied time value together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInput {
    /// Carries an explicit offset; converted directly.
    Absolute(DateTime<FixedOffset>),
    /// Explicitly a wall-clock reading in the reference zone.
    Local(NaiveDateTime),
    /// No zone information. Treated exactly like `Local`.
    Unspecified(NaiveDateTime),
}

impl FromStr for TimeInput {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(TimeInput::Absolute(dt));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(TimeInput::Unspecified)
            .ok_or_else(|| BookingError::InvalidTime(format!("unrecognized timestamp '{s}'")))
    }
}

impl From<Timestamp> for TimeInput {
    fn from(dt: Timestamp) -> Self {
        TimeInput::Absolute(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(dt: NaiveDateTime) -> Self {
        TimeInput::Unspecified(dt)
    }
}

/// Tie-break for wall-clock readings that a zone transition makes ambiguous or impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Repeated hour → the earlier instant. Skipped hour → read with the offset in force
    /// before the transition, which lands the instant just after the gap.
    #[default]
    Earliest,
    /// Repeated hour → the later instant. Skipped hour → read with the offset in force
    /// after the transition.
    Latest,
    /// Refuse both with `InvalidTime`.
    Reject,
}

impl FromStr for DstPolicy {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earliest" => Ok(DstPolicy::Earliest),
            "latest" => Ok(DstPolicy::Latest),
            "reject" => Ok(DstPolicy::Reject),
            other => Err(BookingError::InvalidTime(format!("unknown DST policy '{other}'"))),
        }
    }
}

impl fmt::Display for DstPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DstPolicy::Earliest => "earliest",
            DstPolicy::Latest => "latest",
            DstPolicy::Reject => "reject",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeNormalizer {
    tz: Tz,
    policy: DstPolicy,
}

impl TimeNormalizer {
    pub fn new(tz: Tz, policy: DstPolicy) -> Self {
        Self { tz, policy }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn policy(&self) -> DstPolicy {
        self.policy
    }

    pub fn normalize(&self, input: TimeInput) -> Result<Timestamp, BookingError> {
        match input {
            TimeInput::Absolute(dt) => Ok(dt.with_timezone(&Utc)),
            TimeInput::Local(naive) | TimeInput::Unspecified(naive) => {
                resolve_local(self.tz, naive, self.policy)
            }
        }
    }

    /// Wall-clock reading of `instant` in the reference zone.
    pub fn to_local(&self, instant: Timestamp) -> NaiveDateTime {
        instant.with_timezone(&self.tz).naive_local()
    }

    /// `[local midnight, next local midnight)` as absolute instants.
    ///
    /// Midnight falling in a transition always resolves with `Earliest`, whatever the
    /// configured policy, so a day view never fails.
    pub fn day_bounds(&self, date: NaiveDate) -> Result<Span, BookingError> {
        let next = date
            .succ_opt()
            .ok_or_else(|| BookingError::InvalidTime(format!("no day after {date}")))?;
        let start = resolve_local(self.tz, date.and_time(NaiveTime::MIN), DstPolicy::Earliest)?;
        let end = resolve_local(self.tz, next.and_time(NaiveTime::MIN), DstPolicy::Earliest)?;
        Ok(Span::new(start, end))
    }
}

impl Default for TimeNormalizer {
    fn default() -> Self {
        Self::new(Tz::UTC, DstPolicy::default())
    }
}

fn resolve_local(tz: Tz, naive: NaiveDateTime, policy: DstPolicy) -> Result<Timestamp, BookingError> {
    match (tz.from_local_datetime(&naive), policy) {
        (LocalResult::Single(dt), _) => Ok(dt.with_timezone(&Utc)),
        (LocalResult::Ambiguous(earliest, _), DstPolicy::Earliest) => Ok(earliest.with_timezone(&Utc)),
        (LocalResult::Ambiguous(_, latest), DstPolicy::Latest) => Ok(latest.with_timezone(&Utc)),
        (LocalResult::Ambiguous(..), DstPolicy::Reject) => Err(BookingError::InvalidTime(format!(
            "{naive} occurs twice in {tz}"
        ))),
        (LocalResult::None, DstPolicy::Reject) => Err(BookingError::InvalidTime(format!(
            "{naive} does not exist in {tz}"
        ))),
        (LocalResult::None, policy) => {
            // Transitions are months apart, so a day either side sits in the neighbouring regime.
            let probe = match policy {
                DstPolicy::Latest => naive + TimeDelta::days(1),
                _ => naive - TimeDelta::days(1),
            };
            let offset = tz.offset_from_utc_datetime(&probe).fix();
            let utc = naive - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
            Ok(Utc.from_utc_datetime(&utc))
        }
    }
}
