// Utility functions
use chrono::NaiveDate;

/// Parses a provider date string (`YYYY-MM-DD`).
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").ok()
}

/// Converts text to kebab-case, keeping only ASCII alphanumerics.
pub fn to_kebab_case(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
