//! Cannabis license number normalization (Oregon OLCC format).
//!
//! Survey sources write the same license many ways: `050 1234567ABC`,
//! `#0501234567ABC`, `50-1234567ABC`. All of them normalize to
//! `050-1234567ABC`.

const PLACEHOLDER: &str = "Unspecified";
const STATE_PREFIX: &str = "050";

/// Normalize a license number, or `None` when it is blank or a placeholder.
pub fn normalize_license(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(PLACEHOLDER) {
        return None;
    }

    let mut clean: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '#' && *c != '"')
        .collect::<String>()
        .to_uppercase();

    if clean.len() > STATE_PREFIX.len()
        && clean.starts_with(STATE_PREFIX)
        && !clean[STATE_PREFIX.len()..].starts_with('-')
    {
        clean = format!("{}-{}", STATE_PREFIX, &clean[STATE_PREFIX.len()..]);
    }

    if clean.len() > 3 && clean.starts_with("50-") {
        clean.insert(0, '0');
    }

    if clean.is_empty() {
        None
    } else {
        Some(clean)
    }
}
