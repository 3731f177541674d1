//! Time-span parsing for runtimes and configured duration limits.
//!
//! PlayOn reports runtimes as `hh:mm:ss` strings and the rule file uses the
//! same notation for limits. The accepted grammar is `[d.]hh:mm[:ss[.fraction]]`.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// Largest day count a time span may carry.
pub const MAX_DAYS: u64 = 10_675_199;

static TIME_SPAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(\d+)\.)?(\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:\.(\d{1,7}))?)?\s*$")
        .expect("Invalid time span regex")
});

/// Parse a time-span string. Returns `None` for anything that is not a valid
/// span, including out-of-range components and day counts above [`MAX_DAYS`].
pub fn parse_time_span(value: &str) -> Option<Duration> {
    let caps = TIME_SPAN_PATTERN.captures(value)?;

    let number = |index: usize| -> Option<u64> {
        match caps.get(index) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let days = number(1)?;
    let hours = number(2)?;
    let minutes = number(3)?;
    let seconds = number(4)?;
    if days > MAX_DAYS || hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    let nanos = match caps.get(5) {
        Some(m) => {
            let digits = m.as_str();
            let fraction: u64 = digits.parse().ok()?;
            let scale = 10u64.pow(9 - digits.len() as u32);
            fraction * scale
        }
        None => 0,
    };

    let total_secs = days
        .checked_mul(24)?
        .checked_add(hours)?
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)?;
    Some(Duration::new(total_secs, nanos as u32))
}

/// Format a duration as `hh:mm:ss`, prefixing whole days as `d.` when present.
pub fn format_time_span(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{}.{:02}:{:02}:{:02}", days, hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Serde adapter for `Duration` fields written as time-span strings.
pub mod serde_time_span {
    use super::{format_time_span, parse_time_span};
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_time_span(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(Duration::ZERO);
        }
        parse_time_span(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid time span: {raw:?}")))
    }
}
