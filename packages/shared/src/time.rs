use chrono::{DateTime, Local, TimeZone};

/// Clock format used for server-assigned chat timestamps (e.g. "14:03:59").
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Format a point in time as a wall-clock string.
pub fn format_clock_time<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format(CLOCK_FORMAT).to_string()
}

/// Current local wall-clock time as "HH:MM:SS".
pub fn current_clock_time() -> String {
    format_clock_time(&Local::now())
}
