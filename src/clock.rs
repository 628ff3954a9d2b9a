use chrono::{DateTime, FixedOffset, Utc};

// WIB (Waktu Indonesia Barat, Asia/Jakarta) is a fixed UTC+7 with no DST.
const WIB_OFFSET_SECS: i32 = 7 * 3600;

/// Current instant in WIB.
pub fn now_wib() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&FixedOffset::east_opt(WIB_OFFSET_SECS).unwrap())
}

/// Human-readable display form: day, full month name, year, 24-hour time
/// and the zone suffix, e.g. "1 June 2025, 12:30 WIB".
pub fn format_display(t: DateTime<FixedOffset>) -> String {
    t.format("%-d %B %Y, %H:%M WIB").to_string()
}

/// Same instant as integer milliseconds since the Unix epoch.
pub fn epoch_millis(t: DateTime<FixedOffset>) -> i64 {
    t.timestamp_millis()
}

// ── Tests ──
