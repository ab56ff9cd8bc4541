//! Helper functions and utilities
//!
//! Normalization rules shared by grouping, scoring and persistence.

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Email in the form used as a membership key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Display name for a group derived from free text: collapsed whitespace, case kept
pub fn normalize_group_name(name: &str) -> String {
    normalize_whitespace(name)
}

/// Case-insensitive identity of a group name
pub fn group_key(name: &str) -> String {
    normalize_whitespace(name).to_lowercase()
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@') && email.contains('.') && email.len() > 5
}

/// Lowercased, trimmed labels with blanks dropped and duplicates removed, order kept
pub fn normalize_labels(labels: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim().to_lowercase();
        if !label.is_empty() && !normalized.contains(&label) {
            normalized.push(label);
        }
    }
    normalized
}
