/// Display formatting for dashboard values
///
/// Pure functions only; every view goes through these so the same number is
/// always rendered the same way.

use chrono::{DateTime, Utc};

/// Format as whole-unit US currency with thousands separators.
///
/// Rounds half away from zero: `1234.5 -> "$1,235"`, `-5.0 -> "-$5"`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(rounded.abs()))
}

/// Format as a whole number with thousands separators.
pub fn format_number(n: f64) -> String {
    let rounded = n.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(rounded.abs()))
}

/// Format a percentage with one decimal place.
///
/// With `show_sign`, strictly positive values get a leading `+`. Negative
/// values keep their own minus; a value rounding to zero never shows `-0.0`.
pub fn format_percentage(value: f64, show_sign: bool) -> String {
    let sign = if show_sign && value > 0.0 { "+" } else { "" };
    format!("{}{}%", sign, format_tenths(value))
}

/// Bucket the time elapsed since `timestamp` into its largest whole unit.
///
/// Produces `"<n>d ago"`, `"<n>h ago"`, `"<n>m ago"` or `"Just now"` under a
/// minute. Timestamps in the future also read `"Just now"`.
pub fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "Just now".to_string()
    }
}

/// Format a price change for the stock table: `+$5.2` or `$-2.1`.
pub fn format_signed_currency(change: f64) -> String {
    let tenths = format_tenths(change);
    if change > 0.0 {
        format!("+${}", tenths)
    } else {
        format!("${}", tenths)
    }
}

/// Format an index value against its scale, e.g. `78/100`.
pub fn format_index(value: f64, scale: u32) -> String {
    format!("{}/{}", value, scale)
}

/// One decimal place, rounding the stored binary value.
///
/// `0.15` is stored just below the tie and rounds down to `0.1`. Exact ties
/// (multiples of `0.25`) round away from zero, where `{:.1}` alone would pick
/// the even digit (`5.25 -> 5.2`). Results that round to zero drop the minus.
fn format_tenths(value: f64) -> String {
    let scaled = value * 10.0;
    let exact_tie = (value * 4.0).fract() == 0.0 && scaled.fract().abs() == 0.5;

    let text = if exact_tie {
        format!("{:.1}", scaled.round() / 10.0)
    } else {
        format!("{:.1}", value)
    };

    match text.strip_prefix('-') {
        Some(unsigned) if unsigned.bytes().all(|b| b == b'0' || b == b'.') => unsigned.to_string(),
        _ => text,
    }
}

/// Insert thousands separators into a non-negative whole number.
fn group_thousands(whole: f64) -> String {
    let digits = format!("{:.0}", whole);
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
