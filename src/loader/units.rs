use crate::error::{Error, Result};

/// Parses a quantity with an SI prefix and a unit, e.g. `"441Gf"`, `"100Mbps"`, `"1.5GBps"` or `"10MB"`.
///
/// Supported units are `f` (flops), `bps`/`b` (bits) and `Bps`/`B` (bytes, converted to bits). Prefixes are
/// `k`, `M`, `G` and `T` in powers of 1000. A bare number is accepted as is.
///
/// # Errors
/// `Error::InvalidUnit` for an unknown unit, a missing or negative number.
pub fn parse_units(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    let split = trimmed.find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-')).unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let amount: f64 = number.parse().map_err(|_| Error::InvalidUnit(value.to_string()))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidUnit(value.to_string()));
    }

    let (multiplier, rest) = match unit.chars().next() {
        Some('k') => (1e3, &unit[1..]),
        Some('M') => (1e6, &unit[1..]),
        Some('G') => (1e9, &unit[1..]),
        Some('T') => (1e12, &unit[1..]),
        _ => (1.0, unit),
    };

    let scale = match rest {
        "" | "f" | "b" | "bps" => 1.0,
        "B" | "Bps" => 8.0,
        _ => return Err(Error::InvalidUnit(value.to_string())),
    };

    Ok((amount * multiplier * scale).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("441Gf").unwrap(), 441_000_000_000);
        assert_eq!(parse_units("1Gf").unwrap(), 1_000_000_000);
        assert_eq!(parse_units("100Mbps").unwrap(), 100_000_000);
        assert_eq!(parse_units("10MBps").unwrap(), 80_000_000);
        assert_eq!(parse_units("10MB").unwrap(), 80_000_000);
        assert_eq!(parse_units("1.5kb").unwrap(), 1_500);
        assert_eq!(parse_units("2.5Gf").unwrap(), 2_500_000_000);
        assert_eq!(parse_units("42").unwrap(), 42);
    }

    #[test]
    fn test_parse_units_rejects_garbage() {
        assert!(matches!(parse_units("10Xb"), Err(Error::InvalidUnit(_))));
        assert!(matches!(parse_units("Gf"), Err(Error::InvalidUnit(_))));
        assert!(matches!(parse_units("-3Gf"), Err(Error::InvalidUnit(_))));
    }
}
