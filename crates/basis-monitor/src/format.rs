/*
[INPUT]:  Raw numeric fields and backend timestamps
[OUTPUT]: Display strings for table cells, stat fields and the last-update label
[POS]:    Presentation helpers - shared by TUI and headless output
[UPDATE]: When changing number formats or links
*/

use chrono::{DateTime, Local, NaiveDateTime};

const FUTURES_URL_BASE: &str = "https://www.binance.com/en/futures/";
const NAIVE_TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Fixed precision with `,` thousands grouping. Non-finite input renders as zero.
pub fn format_number(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let digits = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
    // no "-0.00" when rounding swallowed the sign
    if value < 0.0 && digits.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Compact USD amount: `$1.5B`, `$2.3M`, `$4.0K`, `$999`
pub fn format_volume_usd(value: f64) -> String {
    if !value.is_finite() {
        return "$0".to_string();
    }
    if value >= 1e9 {
        format!("${}B", format_number(value / 1e9, 1))
    } else if value >= 1e6 {
        format!("${}M", format_number(value / 1e6, 1))
    } else if value >= 1e3 {
        format!("${}K", format_number(value / 1e3, 1))
    } else {
        format!("${}", format_number(value, 0))
    }
}

pub fn format_price(value: f64) -> String {
    format!("${}", format_number(value, 4))
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value, 2))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisTone {
    Positive,
    Negative,
    Neutral,
}

impl BasisTone {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            BasisTone::Positive
        } else if value < 0.0 {
            BasisTone::Negative
        } else {
            BasisTone::Neutral
        }
    }
}

pub fn futures_url(symbol: &str) -> String {
    format!("{FUTURES_URL_BASE}{symbol}")
}

/// Backend timestamp as local `HH:MM:SS`.
///
/// Offsets are converted to local time; naive timestamps are taken as local
/// already. Anything else is returned verbatim.
pub fn format_update_time(timestamp: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return parsed.with_timezone(&Local).format("%H:%M:%S").to_string();
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(timestamp, fmt).ok())
        .map(|parsed| parsed.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(0.12346, 4), "0.1235");
        assert_eq!(format_number(-64123.5, 4), "-64,123.5000");
        assert_eq!(format_number(100000.0, 1), "100,000.0");
    }

    #[test]
    fn test_format_number_edge_values() {
        assert_eq!(format_number(f64::NAN, 2), "0.00");
        assert_eq!(format_number(f64::INFINITY, 4), "0.0000");
        assert_eq!(format_number(-0.0001, 2), "0.00");
    }

    #[test]
    fn test_format_volume_usd() {
        assert_eq!(format_volume_usd(1_500_000.0), "$1.5M");
        assert_eq!(format_volume_usd(999.0), "$999");
        assert_eq!(format_volume_usd(f64::NAN), "$0");
        assert_eq!(format_volume_usd(2_340_000_000.0), "$2.3B");
        assert_eq!(format_volume_usd(12_500.0), "$12.5K");
        assert_eq!(format_volume_usd(0.0), "$0");
        assert_eq!(format_volume_usd(f64::INFINITY), "$0");
    }

    #[test]
    fn test_price_and_percent() {
        assert_eq!(format_price(64000.5), "$64,000.5000");
        assert_eq!(format_price(-0.25), "$-0.2500");
        assert_eq!(format_percent(0.156), "0.16%");
        assert_eq!(format_percent(-1.5), "-1.50%");
    }

    #[test]
    fn test_basis_tone() {
        assert_eq!(BasisTone::of(0.01), BasisTone::Positive);
        assert_eq!(BasisTone::of(-0.01), BasisTone::Negative);
        assert_eq!(BasisTone::of(0.0), BasisTone::Neutral);
        assert_eq!(BasisTone::of(f64::NAN), BasisTone::Neutral);
    }

    #[test]
    fn test_futures_url() {
        assert_eq!(
            futures_url("BTCUSDT"),
            "https://www.binance.com/en/futures/BTCUSDT"
        );
    }

    #[test]
    fn test_format_update_time() {
        assert_eq!(format_update_time("2024-05-01T09:30:00.123456"), "09:30:00");
        assert_eq!(format_update_time("2024-05-01T23:01:59"), "23:01:59");
        assert_eq!(format_update_time("yesterday"), "yesterday");

        let with_offset = format_update_time("2024-05-01T09:30:00+00:00");
        assert_eq!(with_offset.len(), 8);
        assert_eq!(&with_offset[2..3], ":");
    }
}
