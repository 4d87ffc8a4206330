//! Human-readable rendering of won amounts and percentages.

use crate::domain::Decimal;

/// Whole won with thousands separators, e.g. `₩1,234,567` or `-₩500`.
///
/// Non-finite values render as `-`.
pub fn format_krw(value: f64) -> String {
    match group_whole(value) {
        Some(grouped) if grouped.starts_with('-') => format!("-₩{}", &grouped[1..]),
        Some(grouped) => format!("₩{}", grouped),
        None => "-".to_string(),
    }
}

/// Whole number with thousands separators and no currency symbol.
pub fn format_number(value: f64) -> String {
    group_whole(value).unwrap_or_else(|| "-".to_string())
}

/// Fixed decimals followed by `%`, e.g. `47.92%`.
pub fn format_percent(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    format!("{:.*}%", decimals, value)
}

fn group_whole(value: f64) -> Option<String> {
    let rounded = Decimal::from_f64(value)?.round_dp(0);
    if rounded.is_zero() {
        return Some("0".to_string());
    }
    let text = rounded.to_canonical_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    Some(format!("{}{}", sign, grouped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_krw() {
        assert_eq!(format_krw(0.0), "₩0");
        assert_eq!(format_krw(999.4), "₩999");
        assert_eq!(format_krw(1326.0), "₩1,326");
        assert_eq!(format_krw(9583.09), "₩9,583");
        assert_eq!(format_krw(1_234_567.5), "₩1,234,568");
        assert_eq!(format_krw(-2188.0), "-₩2,188");
        assert_eq!(format_krw(f64::INFINITY), "-");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(100_000.0), "100,000");
        assert_eq!(format_number(12.0), "12");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(47.915_45, 2), "47.92%");
        assert_eq!(format_percent(10.0, 1), "10.0%");
        assert_eq!(format_percent(f64::NAN, 2), "-");
    }
}
