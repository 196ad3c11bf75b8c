//! Indian-locale display formatting
//!
//! Prices are rendered the way `en-IN` number formatting does it: the last
//! three integer digits form one group and every group above that has two
//! digits (`75,00,000`), with at most three fraction digits.

use chrono::{DateTime, FixedOffset, Utc};

/// Indian Standard Time, UTC+05:30
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

const DATE_FORMAT: &str = "%-d %B %Y, %I:%M %P";

/// Maximum fraction digits shown for a price
const MAX_FRACTION_DIGITS: usize = 3;

/// Format a rupee amount, e.g. `7500000.0` → `₹75,00,000`
pub fn format_inr(amount: f64) -> String {
    format!("₹{}", group_indian(amount))
}

/// Group a number with Indian digit grouping, e.g. `1234567.5` → `12,34,567.5`
pub fn group_indian(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let scale = 10f64.powi(MAX_FRACTION_DIGITS as i32);
    let rounded = (value.abs() * scale).round() / scale;
    let text = format!("{:.*}", MAX_FRACTION_DIGITS, rounded);
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut out = String::with_capacity(text.len() + 8);
    if value < 0.0 && rounded != 0.0 {
        out.push('-');
    }
    out.push_str(&group_integer_digits(integer));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_integer_digits(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Long `en-IN` date with 2-digit time in IST, e.g. `19 October 2026, 02:30 pm`
pub fn format_created_at(created_at: &DateTime<Utc>) -> String {
    match FixedOffset::east_opt(IST_OFFSET_SECS) {
        Some(ist) => created_at.with_timezone(&ist).format(DATE_FORMAT).to_string(),
        None => created_at.format(DATE_FORMAT).to_string(),
    }
}

/// Truncate to `max_chars` characters and mark the cut with `...`
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}
