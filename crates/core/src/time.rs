//! Time expression parsing.
//!
//! Operators enter segment bounds as plain seconds (`"90"`) or as
//! colon-delimited groups (`"1:30"`, `"1:01:30"`). Groups are weighted
//! right-to-left by powers of 60 with no upper bound on depth, so
//! `"1:00:00:00"` is 216000 seconds.

use crate::error::CoreError;
use crate::types::Seconds;

/// Weight between adjacent colon groups.
const GROUP_BASE: f64 = 60.0;

/// Parse a time expression into elapsed seconds.
///
/// - `""` is `0`.
/// - A pure-digit string is taken as seconds.
/// - Otherwise the input is split on `:`; blank groups are ignored and
///   every remaining group must be a finite number.
///
/// Any other input is [`CoreError::InvalidTimeFormat`]. Callers must
/// reject the operation on error; there is no fallback value.
pub fn parse_time_to_seconds(input: &str) -> Result<Seconds, CoreError> {
    if input.is_empty() {
        return Ok(0.0);
    }

    let trimmed = input.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse::<f64>().map_err(|_| invalid(input));
    }

    let groups: Vec<&str> = trimmed
        .split(':')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .collect();
    if groups.is_empty() {
        return Err(invalid(input));
    }

    let mut seconds = 0.0;
    for (position, group) in groups.iter().rev().enumerate() {
        let value = parse_group(group).ok_or_else(|| invalid(input))?;
        seconds += value * GROUP_BASE.powi(position as i32);
    }
    Ok(seconds)
}

fn parse_group(group: &str) -> Option<f64> {
    group.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn invalid(input: &str) -> CoreError {
    CoreError::InvalidTimeFormat {
        input: input.to_string(),
    }
}
