//! Rupee amounts as the analysis writes them (`₹12,97,285`, `₹18,00,000+`,
//! `-₹1,65,521 (-12.76%)`).

use chrono::{Datelike, NaiveDate};

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;
const THOUSAND: f64 = 1_000.0;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn is_blank(value: &str) -> bool {
    value.is_empty() || value == "N/A"
}

/// Longest leading `-?digits[.digits]` of `s` as a number.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    s[..end].parse().ok()
}

/// Numeric value of a decorated amount. Everything but digits, `.` and `-`
/// is dropped and the leading number is read; anything unreadable is 0.
pub fn parse_currency(value: &str) -> f64 {
    if is_blank(value) {
        return 0.0;
    }
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    parse_float_prefix(&cleaned)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

/// Compact Indian-unit form: `₹1.2Cr`, `₹13.0L`, `₹4.5K`, `₹950`.
pub fn format_currency(value: &str) -> String {
    if is_blank(value) {
        return "-".to_string();
    }
    let amount = parse_currency(value);
    if amount >= CRORE {
        format!("₹{}Cr", one_decimal(amount / CRORE))
    } else if amount >= LAKH {
        format!("₹{}L", one_decimal(amount / LAKH))
    } else if amount >= THOUSAND {
        format!("₹{}K", one_decimal(amount / THOUSAND))
    } else {
        format!("₹{}", amount.round())
    }
}

/// A decision amount as given, `-` when there is none.
pub fn format_amount(amount: &str) -> String {
    if amount.is_empty() || amount == "₹0" {
        "-".to_string()
    } else {
        amount.to_string()
    }
}

/// `YYYY-MM-DD` (optionally followed by a time) as `Mon YYYY`.
/// Unreadable dates are shown unchanged.
pub fn format_date(date: &str) -> String {
    if date.is_empty() {
        return String::new();
    }
    let day = date.get(..10).unwrap_or(date);
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(parsed) => format!("{} {}", MONTHS[parsed.month0() as usize], parsed.year()),
        Err(_) => date.to_string(),
    }
}
