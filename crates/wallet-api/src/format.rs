//! Display formatting for amounts and analytics periods.

use chrono::NaiveDate;

/// Two decimals with thousands separators: `1234.5` -> `1,234.50`.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.');
    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, fraction)
}

/// Month and year of an ISO period start: `2024-01-01` -> `Jan 2024`.
/// `YYYY-MM` is accepted too; anything else is returned unchanged.
pub fn format_period(iso: &str) -> String {
    let date = NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{iso}-01"), "%Y-%m-%d"));

    match date {
        Ok(date) => date.format("%b %Y").to_string(),
        Err(_) => iso.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(5.0), "5.00");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-42.1), "-42.10");
        assert_eq!(format_amount(-1234.5), "-1,234.50");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn periods() {
        assert_eq!(format_period("2024-01-01"), "Jan 2024");
        assert_eq!(format_period("2023-12-01"), "Dec 2023");
        assert_eq!(format_period("2024-07"), "Jul 2024");
        assert_eq!(format_period("Q3"), "Q3");
    }
}
