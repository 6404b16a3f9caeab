use chrono::Duration;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// First line of a post body, shortened for list views
pub fn excerpt(content: &str, max_len: usize) -> String {
    let first_line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    truncate_string(first_line.trim(), max_len)
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    // Try to parse ISO format and convert to readable
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        // Try to parse YYYY-MM-DD format
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Human readable remaining time, e.g. "1h 5m" or "expired"
pub fn format_remaining(remaining: Duration) -> String {
    let minutes = remaining.num_minutes();
    if remaining <= Duration::zero() {
        "expired".to_string()
    } else if minutes < 1 {
        "less than a minute".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}
