//! Human-readable formatting of sizes, counts and ages.

use chrono::{DateTime, Utc};

const BYTE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Binary-prefixed size with at most two decimals, e.g. `3.91 GB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(&format!("{:.2}", value)), BYTE_UNITS[unit])
}

/// Drop trailing zeros after the decimal point, and the point itself.
fn trim_decimals(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Thousands separated with commas, e.g. `42,700,000`.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Abbreviated count with one decimal, e.g. `42.7M`.
pub fn format_large_number(n: u64) -> String {
    let n_f = n as f64;
    match n {
        0..=999 => n.to_string(),
        1_000..=999_999 => format!("{:.1}K", n_f / 1e3),
        1_000_000..=999_999_999 => format!("{:.1}M", n_f / 1e6),
        _ => format!("{:.1}B", n_f / 1e9),
    }
}

/// Coarse relative age of `then` as seen at `now`, e.g. `5 days ago`.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);

    const STEPS: [(i64, &str); 5] = [
        (31_536_000, "year"),
        (2_592_000, "month"),
        (86_400, "day"),
        (3_600, "hour"),
        (60, "minute"),
    ];

    for (span, unit) in STEPS {
        let count = seconds / span;
        if count >= 1 {
            return if count == 1 {
                format!("1 {} ago", unit)
            } else {
                format!("{} {}s ago", count, unit)
            };
        }
    }

    if seconds < 10 {
        "just now".to_string()
    } else {
        format!("{} seconds ago", seconds)
    }
}
