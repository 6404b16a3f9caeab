/// Maximum length for email input.
/// 254 is the longest address SMTP allows.
const MAX_EMAIL_LENGTH: usize = 254;

/// Cheap shape check before a round-trip; the server has the final word.
pub fn looks_like_email(s: &str) -> bool {
    let s = s.trim();
    if s.len() > MAX_EMAIL_LENGTH {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.chars().any(|c| c.is_control() || c.is_whitespace())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("ada@example.com"));
        assert!(looks_like_email("  ada@example.com "));
        assert!(!looks_like_email("ada@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ada example.com"));
        assert!(!looks_like_email("ada@.com"));
        assert!(!looks_like_email("ada@exa\tmple.com"));

        let long = format!("{}@example.com", "a".repeat(MAX_EMAIL_LENGTH));
        assert!(!looks_like_email(&long));
    }
}
