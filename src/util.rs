// Utility helpers for parsing and formatting.
//
// This module centralizes the "dirty" spreadsheet text handling so the rest
// of the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};
use unicode_normalization::UnicodeNormalization;

/// Parse a loosely formatted currency cell into a non-negative amount.
///
/// - Drops `R`, `$`, `.` and whitespace (Brazilian thousands separators).
/// - Turns the decimal comma into a decimal point.
/// - Treats `""` and `"nan"` as zero.
/// - Anything unparsable, negative or non-finite becomes `0.0`.
///
/// `"R$ 1.234,56"` and `"1234,56"` both parse to `1234.56`.
pub fn parse_currency(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, 'R' | '$' | '.') && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() || cleaned == "nan" {
        return 0.0;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Lowercase and strip accents: decompose to NFD and drop the combining
/// diacritical marks, so precomposed and decomposed text fold alike.
pub fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !('\u{300}'..='\u{36f}').contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Case- and accent-insensitive substring test.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(&fold(needle))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `num-format` thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u128 = int_part.parse().unwrap_or(u128::MAX);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// `1234.5` -> `R$ 1,234.50`
pub fn format_brl(n: f64) -> String {
    format!("R$ {}", format_number(n, 2))
}

/// Render a `0.0..=1.0` fraction as a one-decimal percentage (`0.5` -> `50.0%`).
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Text progress bar for a `0.0..=1.0` fraction, e.g. `[#####.....]`.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (fraction * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}
