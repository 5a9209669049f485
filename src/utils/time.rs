//! Time utilities for the generation timestamp

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use chrono_tz::Tz;
use regex::Regex;

use tracing::debug;

/// Parse timezone string and validate it
pub fn validate_timezone(tz_str: &str) -> Result<String, String> {
    // First try to parse as a named timezone
    if tz_str.parse::<Tz>().is_ok() {
        return Ok(tz_str.to_string());
    }

    // Try to parse as UTC offset format like "+08:00" or "+0800"
    if parse_fixed_offset(tz_str).is_ok() {
        return Ok(tz_str.to_string());
    }

    Err(format!("Invalid timezone: '{}'. Use either a named timezone (e.g., 'Asia/Shanghai') or UTC offset (e.g., '+08:00')", tz_str))
}

/// Parse fixed offset timezone formats like "+08:00", "+0800", etc.
fn parse_fixed_offset(offset_str: &str) -> Result<FixedOffset, String> {
    let offset_str = offset_str.trim();

    let re = Regex::new(r"^([+-])(\d{2}):?(\d{2})$").map_err(|e| format!("Regex error: {}", e))?;

    let caps = re
        .captures(offset_str)
        .ok_or_else(|| format!("Invalid offset format: '{}'", offset_str))?;

    let sign = if &caps[1] == "+" { 1 } else { -1 };
    let hours: i32 = caps[2].parse().map_err(|_| "Invalid hours in offset")?;
    let minutes: i32 = caps[3].parse().map_err(|_| "Invalid minutes in offset")?;

    if hours > 23 || minutes > 59 {
        return Err("Invalid time values in offset".to_string());
    }

    let total_seconds = sign * (hours * 3600 + minutes * 60);

    FixedOffset::east_opt(total_seconds).ok_or_else(|| "Invalid timezone offset".to_string())
}

/// Convert a UTC instant into the configured timezone, or the host's local
/// time when none is configured or it cannot be parsed.
pub fn to_display_timezone(utc_time: DateTime<Utc>, tz_str: Option<&str>) -> DateTime<FixedOffset> {
    if let Some(tz_str) = tz_str {
        if let Ok(tz) = tz_str.parse::<Tz>() {
            let local = utc_time.with_timezone(&tz);
            return local.with_timezone(&local.offset().fix());
        }
        if let Ok(offset) = parse_fixed_offset(tz_str) {
            return utc_time.with_timezone(&offset);
        }
        debug!("Unrecognised timezone '{}', using local time", tz_str);
    }

    let local = utc_time.with_timezone(&Local);
    utc_time.with_timezone(local.offset())
}

/// Current time in the configured timezone
pub fn now_in(tz_str: Option<&str>) -> DateTime<FixedOffset> {
    to_display_timezone(Utc::now(), tz_str)
}
