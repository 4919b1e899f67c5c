use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Format a Unix timestamp as `YYYY-MM-DD HH:MM:SS UTC`
pub fn format_timestamp(timestamp: u64) -> Result<String> {
    let secs = i64::try_from(timestamp)
        .map_err(|_| Error::MalformedEvent(format!("timestamp {} out of range", timestamp)))?;
    let dt: DateTime<Utc> = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Error::MalformedEvent(format!("timestamp {} out of range", timestamp)))?;
    Ok(dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

/// Like [`format_timestamp`], falling back to the raw number when out of range
pub fn display_timestamp(timestamp: u64) -> String {
    format_timestamp(timestamp).unwrap_or_else(|_| timestamp.to_string())
}

/// Current Unix time in seconds
pub fn now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0).unwrap(), "1970-01-01 00:00:00 UTC");
        assert_eq!(
            format_timestamp(1_672_574_400).unwrap(),
            "2023-01-01 12:00:00 UTC"
        );
    }

    #[test]
    fn test_format_timestamp_out_of_range() {
        assert!(format_timestamp(u64::MAX).is_err());
        assert!(format_timestamp(10_000_000_000_000).is_err());
    }

    #[test]
    fn test_display_timestamp_falls_back_to_raw() {
        assert_eq!(display_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(display_timestamp(10_000_000_000_000), "10000000000000");
    }
}
