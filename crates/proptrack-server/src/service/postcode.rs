//! UK postcode validation and normalisation.

use std::sync::LazyLock;

use regex::Regex;

/// Full UK postcode, with or without the space, any case.
pub static UK_POSTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$")
        .expect("postcode pattern is a valid regex")
});

/// Outward code on its own, e.g. `SW1A` or `M1`.
pub static UK_POSTCODE_DISTRICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z]{1,2}[0-9][A-Z0-9]?$").expect("district pattern is a valid regex")
});

/// Returns the postcode upper-cased with a single space before the inward
/// code, or `None` if it is not a UK postcode.
///
/// ```rust,ignore
/// assert_eq!(normalize_postcode(" sw1a2aa "), Some("SW1A 2AA".into()));
/// ```
pub fn normalize_postcode(postcode: &str) -> Option<String> {
    let trimmed = postcode.trim();
    if !UK_POSTCODE.is_match(trimmed) {
        return None;
    }

    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let (outward, inward) = compact.split_at(compact.len() - 3);
    Some(format!("{outward} {inward}"))
}

/// Returns the upper-cased outward code of a postcode or district.
pub fn postcode_district(postcode: &str) -> Option<String> {
    let trimmed = postcode.trim();
    if UK_POSTCODE_DISTRICT.is_match(trimmed) {
        return Some(trimmed.to_ascii_uppercase());
    }

    normalize_postcode(trimmed)
        .and_then(|normalized| normalized.split_once(' ').map(|(outward, _)| outward.to_owned()))
}

/// Returns the postcode area, the leading letters of the outward code.
pub fn postcode_area(postcode: &str) -> String {
    postcode
        .trim()
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// `validator` hook for request DTOs.
pub fn validate_postcode(postcode: &str) -> Result<(), validator::ValidationError> {
    if UK_POSTCODE.is_match(postcode.trim()) {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("postcode");
        error.message = Some("Must be a valid UK postcode".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postcodes_are_normalized() {
        assert_eq!(normalize_postcode("sw1a2aa"), Some("SW1A 2AA".into()));
        assert_eq!(normalize_postcode(" M1 1AE "), Some("M1 1AE".into()));
        assert_eq!(normalize_postcode("b33 8th"), Some("B33 8TH".into()));
    }

    #[test]
    fn invalid_postcodes_are_rejected() {
        assert_eq!(normalize_postcode(""), None);
        assert_eq!(normalize_postcode("12345"), None);
        assert_eq!(normalize_postcode("SW1A  2AA"), None);
        assert_eq!(normalize_postcode("SW1A 2A"), None);
    }

    #[test]
    fn districts_and_areas() {
        assert_eq!(postcode_district("sw1a 2aa").as_deref(), Some("SW1A"));
        assert_eq!(postcode_district("m1").as_deref(), Some("M1"));
        assert_eq!(postcode_district("nonsense"), None);

        assert_eq!(postcode_area("SW1A 2AA"), "SW");
        assert_eq!(postcode_area("M1 1AE"), "M");
    }

    #[test]
    fn validator_hook() {
        assert!(validate_postcode("EC1A 1BB").is_ok());
        assert!(validate_postcode("not a postcode").is_err());
    }
}
