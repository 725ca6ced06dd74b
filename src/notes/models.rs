use crate::tui::pagination::Identified;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub type NoteId = u64;

pub const EXCERPT_CHARS: usize = 200;
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => UNTITLED,
        }
    }

    /// First 200 characters of the body with markdown emphasis, heading and
    /// code markers removed.
    pub fn excerpt(&self) -> String {
        self.content
            .chars()
            .take(EXCERPT_CHARS)
            .filter(|c| !matches!(c, '#' | '*' | '`'))
            .collect()
    }

    /// Path of the read-only public page, when the note is published.
    pub fn public_path(&self) -> Option<String> {
        match (&self.slug, self.is_public) {
            (Some(slug), true) => Some(format!("/p/{}", slug)),
            _ => None,
        }
    }

    pub fn summary(&self) -> NoteSummary {
        NoteSummary {
            id: self.id,
            title: self.display_title().to_string(),
            excerpt: self.excerpt(),
            date: self.created_at,
            slug: self.slug.clone(),
            is_public: self.is_public,
        }
    }

    pub fn matches(&self, filter: &NoteFilter) -> bool {
        if !filter.privacy.admits(self.is_public) {
            return false;
        }

        let query = filter.query.trim();
        if query.is_empty() {
            return true;
        }

        let needle = query.to_lowercase();
        self.title
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(&needle))
            || self.content.to_lowercase().contains(&needle)
    }
}

/// Fields supplied when creating a note; the store assigns id and times.
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub title: Option<String>,
    pub content: String,
    pub slug: Option<String>,
    pub is_public: bool,
}

/// Changes to an existing note. `None` leaves a field as it is; an empty
/// slug removes the slug.
#[derive(Debug, Clone, Default)]
pub struct NoteEdit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub is_public: Option<bool>,
}

/// What the card grid shows for one note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteSummary {
    pub id: NoteId,
    pub title: String,
    pub excerpt: String,
    pub date: Option<DateTime<Utc>>,
    pub slug: Option<String>,
    pub is_public: bool,
}

impl Identified for NoteSummary {
    fn item_id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Privacy {
    #[default]
    All,
    Private,
    Public,
}

impl Privacy {
    pub fn next(self) -> Self {
        match self {
            Privacy::All => Privacy::Private,
            Privacy::Private => Privacy::Public,
            Privacy::Public => Privacy::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Privacy::All => "All",
            Privacy::Private => "Private",
            Privacy::Public => "Public",
        }
    }

    pub fn admits(self, is_public: bool) -> bool {
        match self {
            Privacy::All => true,
            Privacy::Private => !is_public,
            Privacy::Public => is_public,
        }
    }
}

/// The upstream query identity. Any change to it restarts pagination.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteFilter {
    pub query: String,
    pub privacy: Privacy,
}

const DATE_FORMAT: &str = "%b %-d %Y %-I:%M %p";

/// Formats a timestamp like `Feb 12 2026 11:32 AM`, or `N/A` when absent.
pub fn format_date<Tz>(date: Option<DateTime<Tz>>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match date {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(title: Option<&str>, content: &str, is_public: bool) -> Note {
        Note {
            id: 1,
            title: title.map(str::to_string),
            content: content.to_string(),
            slug: Some("hello-ab12c".to_string()),
            is_public,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_display_title_defaults_to_untitled() {
        assert_eq!(note(None, "x", false).display_title(), "Untitled");
        assert_eq!(note(Some("  "), "x", false).display_title(), "Untitled");
        assert_eq!(note(Some("Plans"), "x", false).display_title(), "Plans");
    }

    #[test]
    fn test_excerpt_strips_markdown_and_truncates() {
        let n = note(None, "# Heading\n**bold** and `code`", false);
        assert_eq!(n.excerpt(), " Heading\nbold and code");

        let long = note(None, &"a".repeat(500), false);
        assert_eq!(long.excerpt().chars().count(), EXCERPT_CHARS);
    }

    #[test]
    fn test_filter_matches_title_or_content_case_insensitively() {
        let n = note(Some("Groceries"), "Buy MILK", false);
        let by_title = NoteFilter { query: "grocer".to_string(), privacy: Privacy::All };
        let by_content = NoteFilter { query: "milk".to_string(), privacy: Privacy::All };
        let miss = NoteFilter { query: "bread".to_string(), privacy: Privacy::All };

        assert!(n.matches(&by_title));
        assert!(n.matches(&by_content));
        assert!(!n.matches(&miss));
    }

    #[test]
    fn test_filter_privacy() {
        let public = note(None, "x", true);
        let private = note(None, "x", false);
        let only_public = NoteFilter { query: String::new(), privacy: Privacy::Public };
        let only_private = NoteFilter { query: String::new(), privacy: Privacy::Private };

        assert!(public.matches(&only_public));
        assert!(!private.matches(&only_public));
        assert!(private.matches(&only_private));
        assert!(public.matches(&NoteFilter::default()));
    }

    #[test]
    fn test_privacy_cycle() {
        assert_eq!(Privacy::All.next(), Privacy::Private);
        assert_eq!(Privacy::Private.next(), Privacy::Public);
        assert_eq!(Privacy::Public.next(), Privacy::All);
    }

    #[test]
    fn test_public_path_only_when_published() {
        assert_eq!(note(None, "x", true).public_path(), Some("/p/hello-ab12c".to_string()));
        assert_eq!(note(None, "x", false).public_path(), None);
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2026, 2, 12, 11, 32, 0).single();
        assert_eq!(format_date(date), "Feb 12 2026 11:32 AM");

        let evening = Utc.with_ymd_and_hms(2025, 11, 3, 21, 5, 0).single();
        assert_eq!(format_date(evening), "Nov 3 2025 9:05 PM");

        assert_eq!(format_date::<Utc>(None), "N/A");
    }
}
