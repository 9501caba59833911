// Utility helpers for numeric cleanup and display formatting.
//
// Export cells arrive as locale-formatted strings ("$1,234.56", "2.7%",
// "12,400"). Everything here turns them into plain numbers or `None`; nothing
// in this module fails loudly.
use num_format::{Locale, ToFormattedString};

/// Trim, drop the given artifact characters and reject anything that still
/// looks like text.
fn clean_numeric(s: Option<&str>, strip: &[char]) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let cleaned: String = s.chars().filter(|c| !strip.contains(c)).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    Some(cleaned.to_string())
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Money cells: strips `$` and thousands separators.
pub fn parse_money(s: Option<&str>) -> Option<f64> {
    parse_finite(&clean_numeric(s, &['$', ','])?)
}

/// Percentage cells: strips `%`, keeps the value in percent units.
pub fn parse_percent(s: Option<&str>) -> Option<f64> {
    parse_finite(&clean_numeric(s, &['%'])?)
}

/// Count cells: strips thousands separators. A fractional part is truncated,
/// negative values are rejected.
pub fn parse_count(s: Option<&str>) -> Option<u64> {
    let s = clean_numeric(s, &[','])?;
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    parse_finite(&s)
        .filter(|v| *v >= 0.0 && *v < u64::MAX as f64)
        .map(|v| v.trunc() as u64)
}

/// Already-plain decimals such as frequency; nothing is stripped.
pub fn parse_plain(s: Option<&str>) -> Option<f64> {
    parse_finite(&clean_numeric(s, &[])?)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with `1,234,567.89` style grouping on the integer part.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => group_digits(int_part),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Comma grouping for digit strings wider than `u128`.
fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Placeholder shown wherever a metric is unknown.
pub const MISSING: &str = "--";

pub fn fmt_money(v: Option<f64>) -> String {
    match v {
        Some(v) if v < 0.0 => format!("-${}", format_number(v.abs(), 2)),
        Some(v) => format!("${}", format_number(v, 2)),
        None => MISSING.to_string(),
    }
}

pub fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{}%", format_number(v, 1)),
        None => MISSING.to_string(),
    }
}

pub fn fmt_times(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.1}×", v),
        None => MISSING.to_string(),
    }
}

/// Compact counts: `1.2M`, `7K`, or the grouped integer below a thousand.
pub fn fmt_k(v: Option<f64>) -> String {
    match v {
        None => MISSING.to_string(),
        Some(v) if v >= 1_000_000.0 => format!("{:.1}M", v / 1_000_000.0),
        Some(v) if v >= 1_000.0 => format!("{:.0}K", v / 1_000.0),
        Some(v) if v.fract() == 0.0 => format_int(v as i64),
        Some(v) => format_number(v, 2),
    }
}

pub fn fmt_count(v: Option<u64>) -> String {
    match v {
        Some(v) => format_int(v),
        None => MISSING.to_string(),
    }
}
