/// Canonical three-letter month abbreviations, January first.
///
/// `Mai` (not `May`) is the canonical spelling in this table; log producers
/// feeding this parser emit it that way.
const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mai", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Translate a month abbreviation to its 1-based month number.
///
/// Comparison is case-sensitive against the canonical table; anything else
/// yields `None` and is surfaced by the session as an unknown-month failure.
pub fn month_number(abbrev: &str) -> Option<u32> {
    MONTH_ABBREVS
        .iter()
        .position(|m| *m == abbrev)
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_table_is_a_bijection() {
        for (i, abbrev) in MONTH_ABBREVS.iter().enumerate() {
            assert_eq!(month_number(abbrev), Some(i as u32 + 1));
        }
    }

    #[test]
    fn test_non_english_may_spelling() {
        assert_eq!(month_number("Mai"), Some(5));
        // The English spelling is not in the canonical table.
        assert_eq!(month_number("May"), None);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(month_number("jan"), None);
        assert_eq!(month_number("JAN"), None);
        assert_eq!(month_number("Jan"), Some(1));
    }

    #[test]
    fn test_unknown_abbreviations_rejected() {
        assert_eq!(month_number(""), None);
        assert_eq!(month_number("Foo"), None);
        assert_eq!(month_number("January"), None);
    }
}
