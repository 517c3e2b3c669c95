//! Format checks for the login credential pair: the national identifier
//! (CPF) and the birth date.
//!
//! Both functions are total: malformed input yields `false`, never a panic.

use chrono::NaiveDate;

/// Number of digits in a well-formed identifier.
pub const IDENTIFIER_LEN: usize = 11;

/// Strip everything but ASCII digits (`"529.982.247-25"` -> `"52998224725"`).
pub fn normalize_identifier(id: &str) -> String {
    id.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate an identifier: 11 digits after stripping punctuation, not all
/// the same digit, and both trailing check digits consistent with the
/// weighted-sum checksum.
pub fn validate_identifier(id: &str) -> bool {
    let digits: Vec<u32> = id.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != IDENTIFIER_LEN {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    // Pass 1 covers positions 0..9 with weights 10..2, pass 2 covers 0..10
    // with weights 11..2. Each yields the digit stored right after its range.
    for check in 9..IDENTIFIER_LEN {
        let top = check as u32 + 1;
        let sum: u32 = digits[..check]
            .iter()
            .enumerate()
            .map(|(j, d)| d * (top - j as u32))
            .sum();
        let expected = ((sum * 10) % 11) % 10;
        if digits[check] != expected {
            return false;
        }
    }

    true
}

/// Validate a calendar date written exactly as `YYYY-MM-DD`.
pub fn validate_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    digits_ok && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "11144477735";

    #[test]
    fn test_known_identifiers_pass() {
        assert!(validate_identifier(VALID));
        assert!(validate_identifier("52998224725"));
        assert!(validate_identifier("529.982.247-25"));
    }

    #[test]
    fn test_repeated_digits_fail() {
        for d in 0..10 {
            let id = d.to_string().repeat(IDENTIFIER_LEN);
            assert!(!validate_identifier(&id), "{} should be rejected", id);
        }
    }

    #[test]
    fn test_every_single_digit_change_fails() {
        let original: Vec<char> = VALID.chars().collect();
        for pos in 0..IDENTIFIER_LEN {
            for replacement in '0'..='9' {
                if replacement == original[pos] {
                    continue;
                }
                let mut changed = original.clone();
                changed[pos] = replacement;
                let changed: String = changed.into_iter().collect();
                assert!(!validate_identifier(&changed), "{} should be rejected", changed);
            }
        }
    }

    #[test]
    fn test_wrong_length_fails() {
        assert!(!validate_identifier(""));
        assert!(!validate_identifier("1114447773"));
        assert!(!validate_identifier("111444777350"));
        assert!(!validate_identifier("abc"));
    }

    #[test]
    fn test_normalize_keeps_only_digits() {
        assert_eq!(normalize_identifier("529.982.247-25"), "52998224725");
        assert_eq!(normalize_identifier(" 1 2 "), "12");
    }

    #[test]
    fn test_dates() {
        assert!(validate_date("1990-01-01"));
        assert!(validate_date("2000-02-29"));
        assert!(!validate_date("1990-13-01"));
        assert!(!validate_date("01-01-1990"));
        assert!(!validate_date("1990-02-30"));
        assert!(!validate_date("1990-1-1"));
        assert!(!validate_date("1990/01/01"));
        assert!(!validate_date(""));
        assert!(!validate_date("1990-01-01T00:00:00"));
    }
}
