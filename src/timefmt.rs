//! # Template-based timestamp formatting.
//!
//! Renders a date through a template containing literal tokens:
//!
//! | token      | width | example |
//! |------------|-------|---------|
//! | `%year%`   | as-is | `2026`  |
//! | `%month%`  | 2     | `03`    |
//! | `%day%`    | 2     | `09`    |
//! | `%hour%`   | 2     | `07`    |
//! | `%minute%` | 2     | `05`    |
//! | `%second%` | 2     | `01`    |
//! | `%millis%` | 3     | `042`   |
//!
//! Tokens are substituted wherever they appear, any number of times; everything else
//! is copied verbatim.
//!
//! ## Example
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use eventvisor::timefmt;
//!
//! let at = Utc.with_ymd_and_hms(2026, 3, 9, 7, 5, 1).unwrap();
//! assert_eq!(timefmt::format(&at, "%day%/%month%/%year% %hour%h"), "09/03/2026 07h");
//! ```

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};

/// Default template used by the built-in log observer.
pub const DEFAULT_TEMPLATE: &str = "%year%-%month%-%day% %hour%:%minute%:%second%.%millis%";

/// Formats `date` according to `template`.
pub fn format<Tz: TimeZone>(date: &DateTime<Tz>, template: &str) -> String {
    // Leap seconds report 1000..=1999 here.
    let millis = date.timestamp_subsec_millis().min(999);

    template
        .replace("%year%", &date.year().to_string())
        .replace("%month%", &format!("{:02}", date.month()))
        .replace("%day%", &format!("{:02}", date.day()))
        .replace("%hour%", &format!("{:02}", date.hour()))
        .replace("%minute%", &format!("{:02}", date.minute()))
        .replace("%second%", &format!("{:02}", date.second()))
        .replace("%millis%", &format!("{millis:03}"))
}

/// Formats the current local time according to `template`.
pub fn format_now(template: &str) -> String {
    format(&Local::now(), template)
}
