// crates/tansive-config/src/duration.rs
// ============================================================================
// Module: Duration String Parsing
// Description: Parse `<n>{m,h,d,y}` duration strings into `std::time::Duration`.
// Purpose: Give every duration-shaped config field one shared, validated parser.
// ============================================================================

//! ## Overview
//! Config duration fields are written as a leading unsigned integer followed
//! by one of four unit suffixes: `m` (minutes), `h` (hours), `d` (days), or
//! `y` (years, defined as exactly 365 days). There is no plain-seconds
//! suffix and no fractional amount; `"90m"` and `"2d"` are valid, `"1.5h"`
//! and `"30"` are not.

use std::time::Duration;

use crate::ConfigError;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;
const SECONDS_PER_YEAR: u64 = 365 * SECONDS_PER_DAY;

/// Parses a duration string of the form `<n>{m,h,d,y}` into a [`Duration`].
///
/// # Errors
/// Returns [`ConfigError::InvalidDuration`] when `raw` is empty, has no
/// recognized unit suffix, has a non-numeric amount, or overflows `u64`
/// seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(raw.to_string());

    if raw.is_empty() {
        return Err(invalid());
    }
    let (amount, seconds_per_unit) = raw.split_at(raw.len() - 1);
    let unit = seconds_per_unit
        .chars()
        .next()
        .ok_or_else(invalid)?;
    let seconds_per_unit = match unit {
        'm' => SECONDS_PER_MINUTE,
        'h' => SECONDS_PER_HOUR,
        'd' => SECONDS_PER_DAY,
        'y' => SECONDS_PER_YEAR,
        _ => return Err(invalid()),
    };
    let amount: u64 = amount.parse().map_err(|_| invalid())?;
    let total_seconds = amount.checked_mul(seconds_per_unit).ok_or_else(invalid)?;
    Ok(Duration::from_secs(total_seconds))
}
