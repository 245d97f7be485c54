//! Normalization of noisy human-readable metric strings.
//!
//! Profile pages render counts in wildly inconsistent forms — `"1,234"`,
//! `"12.3K"`, `"1.2m"`, `"4.5%"` — and every platform extractor funnels its
//! raw text through these two functions, so display quirks are handled once.
//! Both functions are total: they never error, never panic, and have no side
//! effects.

/// Parse a human-readable count into an exact integer.
///
/// Strips thousands separators and whitespace, detects a trailing magnitude
/// suffix case-insensitively (`k` ×1 000, `m` ×1 000 000, `b` ×1 000 000 000),
/// parses the remainder as a float, scales, and rounds to the nearest integer.
///
/// Returns 0 for empty or unparseable input.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_count(raw: &str) -> u64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return 0;
    }

    let lower = cleaned.to_ascii_lowercase();
    let (digits, multiplier) = if let Some(rest) = lower.strip_suffix('k') {
        (rest, 1_000.0)
    } else if let Some(rest) = lower.strip_suffix('m') {
        (rest, 1_000_000.0)
    } else if let Some(rest) = lower.strip_suffix('b') {
        (rest, 1_000_000_000.0)
    } else {
        (lower.as_str(), 1.0)
    };

    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => {
            let scaled = (value * multiplier).round();
            if scaled >= u64::MAX as f64 {
                u64::MAX
            } else {
                scaled as u64
            }
        }
        _ => 0,
    }
}

/// Parse a percentage string such as `"4.5%"` or `"6.5"`.
///
/// Returns `None` for empty or unparseable input — absence is meaningful
/// and must stay distinguishable from a measured `0.0`.
#[must_use]
pub fn parse_percentage(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_end_matches('%').trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
