//! Parsing of unit-suffixed size strings such as `"40G"` or `"1.5T"`.
//!
//! Units are powers of 1024 (the convention of `df -h`); a bare number is a
//! byte count. Suffixes are case-insensitive and may carry a trailing `B` or
//! `iB` (`"512M"`, `"512MB"`, `"512MiB"` are equal).

/// Parse a size string into bytes. Returns `None` for unparseable input.
pub fn parse_size(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number.parse().ok()?;

    let unit = unit.trim().to_ascii_uppercase();
    let unit = unit
        .strip_suffix("IB")
        .or_else(|| unit.strip_suffix('B'))
        .unwrap_or(&unit);

    let exponent = match unit {
        "" => 0,
        "K" => 1,
        "M" => 2,
        "G" => 3,
        "T" => 4,
        "P" => 5,
        _ => return None,
    };

    Some(value * 1024f64.powi(exponent))
}

/// Parse a size string, degrading to zero when it cannot be parsed.
///
/// A zero `used` or `total` makes the derived usage ratio zero, so an
/// unparseable disk report evaluates as healthy rather than failing.
pub fn size_or_zero(raw: &str) -> f64 {
    parse_size(raw).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_suffixes() {
        assert_eq!(parse_size("10G"), Some(10.0 * 1024f64.powi(3)));
        assert_eq!(parse_size("512M"), Some(512.0 * 1024f64.powi(2)));
        assert_eq!(parse_size("1.5T"), Some(1.5 * 1024f64.powi(4)));
        assert_eq!(parse_size("2048"), Some(2048.0));
    }

    #[test]
    fn suffix_variants_are_equivalent() {
        assert_eq!(parse_size("512M"), parse_size("512MB"));
        assert_eq!(parse_size("512M"), parse_size("512MiB"));
        assert_eq!(parse_size("512m"), parse_size("512M"));
        assert_eq!(parse_size(" 40G "), parse_size("40G"));
    }

    #[test]
    fn garbage_degrades_to_zero() {
        assert_eq!(parse_size("lots"), None);
        assert_eq!(parse_size("12Q"), None);
        assert_eq!(parse_size(""), None);
        assert_eq!(size_or_zero("n/a"), 0.0);
    }
}
