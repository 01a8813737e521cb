/// French-style euro formatting: `1 234,50 EUR`, `-12,00 EUR`.
pub fn format_euros(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u64;
    let units = cents / 100;
    let fraction = cents % 100;

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{grouped},{fraction:02} EUR")
}

/// Display date (`15/10/2026`) of a unix timestamp, `-` when unknown.
pub fn format_date(timestamp: i64) -> String {
    if timestamp <= 0 {
        return "-".to_string();
    }
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_euros() {
        assert_eq!(format_euros(0.0), "0,00 EUR");
        assert_eq!(format_euros(12.5), "12,50 EUR");
        assert_eq!(format_euros(1234.5), "1 234,50 EUR");
        assert_eq!(format_euros(1_000_000.0), "1 000 000,00 EUR");
        assert_eq!(format_euros(-150.456), "-150,46 EUR");
        assert_eq!(format_euros(f64::NAN), "0,00 EUR");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(0), "-");
        assert_eq!(format_date(1_700_000_000), "14/11/2023");
    }
}
