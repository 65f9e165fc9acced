use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest title derived from a first message
pub const TITLE_MAX_CHARS: usize = 60;

/// Database-agnostic chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub owner: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(owner: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            title: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Title shown in chat lists, built from the opening user message
    pub fn title_from(message: &str) -> Option<String> {
        let line = message.lines().map(str::trim).find(|l| !l.is_empty())?;
        if line.chars().count() <= TITLE_MAX_CHARS {
            return Some(line.to_string());
        }
        // ellipsis counts toward the limit
        let mut title: String = line.chars().take(TITLE_MAX_CHARS - 1).collect();
        title.push('…');
        Some(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_uses_first_non_empty_line() {
        assert_eq!(
            ChatSession::title_from("\n  What is Rust?\nMore"),
            Some("What is Rust?".to_string())
        );
    }

    #[test]
    fn test_title_truncates_long_messages() {
        let long = "x".repeat(100);
        let title = ChatSession::title_from(&long).unwrap();
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
        assert!(title.ends_with('…'));

        let exact = "y".repeat(TITLE_MAX_CHARS);
        assert_eq!(ChatSession::title_from(&exact), Some(exact.clone()));
    }

    #[test]
    fn test_blank_message_has_no_title() {
        assert_eq!(ChatSession::title_from("   \n "), None);
    }
}
