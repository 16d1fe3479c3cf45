use crate::models::Priority;

pub const HIGH_PRIORITY_KEYWORDS: [&str; 6] = [
    "dor no peito",
    "falta de ar",
    "sangramento",
    "febre alta",
    "desmaio",
    "convulsão",
];

pub const MEDIUM_PRIORITY_KEYWORDS: [&str; 5] = ["febre", "dor", "mal-estar", "tontura", "náusea"];

/// Keyword triage of a free-text complaint.
pub fn classify_priority(description: &str) -> Priority {
    let description = description.to_lowercase();

    if HIGH_PRIORITY_KEYWORDS.iter().any(|k| description.contains(k)) {
        Priority::High
    } else if MEDIUM_PRIORITY_KEYWORDS.iter().any(|k| description.contains(k)) {
        Priority::Medium
    } else {
        Priority::Low
    }
}
