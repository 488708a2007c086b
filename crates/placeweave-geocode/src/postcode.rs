//! Postcode extraction and canonicalization.
//!
//! Providers report postcodes in many shapes ("500 075", "500075, Telangana",
//! "PIN-500075"). Normalization lives here so every source is treated alike.

/// Fixed-width numeric postal format (6 digits for Indian PIN codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostcodeFormat {
    digits: usize,
}

impl Default for PostcodeFormat {
    fn default() -> Self {
        Self { digits: 6 }
    }
}

impl PostcodeFormat {
    /// A zero width is treated as 1.
    pub fn new(digits: usize) -> Self {
        Self {
            digits: digits.max(1),
        }
    }

    pub fn digits(&self) -> usize {
        self.digits
    }

    /// Canonicalize a raw postcode.
    ///
    /// Drops every non-digit and returns the first `digits`-long run of what
    /// remains. Without such a run, returns the trimmed input, or `None` if
    /// that is empty. Idempotent.
    pub fn normalize(&self, raw: Option<&str>) -> Option<String> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            return None;
        }

        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
        if digits.len() >= self.digits {
            return Some(digits[..self.digits].to_string());
        }

        Some(trimmed.to_string())
    }

    /// True when `code` is exactly `digits` ASCII digits
    pub fn is_valid(&self, code: &str) -> bool {
        code.len() == self.digits && code.chars().all(|c| c.is_ascii_digit())
    }

    /// Normalize, keeping the result only if it matches the format
    pub fn normalize_valid(&self, raw: Option<&str>) -> Option<String> {
        self.normalize(raw).filter(|code| self.is_valid(code))
    }
}

/// Normalize with the default 6-digit format.
pub fn normalize_postcode(raw: Option<&str>) -> Option<String> {
    PostcodeFormat::default().normalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_digits_across_separators() {
        assert_eq!(
            normalize_postcode(Some("500 075, Telangana")).as_deref(),
            Some("500075")
        );
        assert_eq!(normalize_postcode(Some("PIN-500075")).as_deref(), Some("500075"));
    }

    #[test]
    fn test_short_code_kept_verbatim() {
        assert_eq!(normalize_postcode(Some("12345")).as_deref(), Some("12345"));
        assert_eq!(normalize_postcode(Some("  SW1A 1AA ")).as_deref(), Some("SW1A 1AA"));
    }

    #[test]
    fn test_long_run_is_truncated_to_width() {
        assert_eq!(normalize_postcode(Some("12345678")).as_deref(), Some("123456"));
    }

    #[test]
    fn test_empty_inputs_are_absent() {
        assert_eq!(normalize_postcode(None), None);
        assert_eq!(normalize_postcode(Some("")), None);
        assert_eq!(normalize_postcode(Some("   ")), None);
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "500 075, Telangana",
            "12345",
            "12345678",
            " SW1A 1AA ",
            "abc",
            "5-0-0-0-7-5",
            "१२३४५६",
        ];
        for s in samples {
            let once = normalize_postcode(Some(s));
            let twice = normalize_postcode(once.as_deref());
            assert_eq!(once, twice, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_validity() {
        let format = PostcodeFormat::default();
        assert!(format.is_valid("500075"));
        assert!(!format.is_valid("50007"));
        assert!(!format.is_valid("50007a"));
        assert_eq!(format.normalize_valid(Some("12345")), None);
        assert_eq!(format.normalize_valid(Some("500 075")).as_deref(), Some("500075"));
    }

    #[test]
    fn test_custom_width() {
        let us = PostcodeFormat::new(5);
        assert_eq!(us.normalize(Some("94103-1234")).as_deref(), Some("94103"));
        assert!(us.is_valid("94103"));
        assert_eq!(PostcodeFormat::new(0).digits(), 1);
    }
}
