//! Parsing of `--exclude-by-size` thresholds.

use std::fmt;

/// Error produced when a size threshold cannot be parsed.
#[derive(Debug, Eq, PartialEq)]
pub struct SizeLimitError {
    text: String,
}

impl SizeLimitError {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    /// Returns the rejected input.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for SizeLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid size '{}': expected digits with an optional K, M, G, T, or P suffix",
            self.text
        )
    }
}

impl std::error::Error for SizeLimitError {}

/// Parses a byte threshold of the form `\d+[KMGTP]?`.
///
/// Suffixes are case-insensitive powers of 1024; a bare number counts plain
/// bytes. Values that overflow `u64` are rejected.
///
/// # Examples
///
/// ```
/// use pdumpfs_filters::parse_size_limit;
///
/// assert_eq!(parse_size_limit("512").unwrap(), 512);
/// assert_eq!(parse_size_limit("4k").unwrap(), 4 * 1024);
/// assert_eq!(parse_size_limit("2M").unwrap(), 2 * 1024 * 1024);
/// assert!(parse_size_limit("12Q").is_err());
/// ```
pub fn parse_size_limit(text: &str) -> Result<u64, SizeLimitError> {
    let (digits, multiplier) = match text.chars().last() {
        Some(suffix) if suffix.is_ascii_alphabetic() => {
            let multiplier = match suffix.to_ascii_uppercase() {
                'K' => 1024u64,
                'M' => 1024u64.pow(2),
                'G' => 1024u64.pow(3),
                'T' => 1024u64.pow(4),
                'P' => 1024u64.pow(5),
                _ => return Err(SizeLimitError::new(text)),
            };
            (&text[..text.len() - 1], multiplier)
        }
        _ => (text, 1),
    };

    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(SizeLimitError::new(text));
    }

    digits
        .parse::<u64>()
        .ok()
        .and_then(|value| value.checked_mul(multiplier))
        .ok_or_else(|| SizeLimitError::new(text))
}
