use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A suggestion (forum thread) as returned by the v2 API.
#[derive(Debug, Clone, Deserialize)]
pub struct Suggestion {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// Body text. Newer payloads use `text`, older ones `description`.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Suggestion {
    /// Body text, whichever field the API populated.
    pub fn body(&self) -> &str {
        self.text
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}

/// A comment on a suggestion.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionComment {
    pub id: u64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SuggestionComment {
    /// Comment body, whichever field the API populated.
    pub fn body_text(&self) -> &str {
        self.text.as_deref().or(self.body.as_deref()).unwrap_or("")
    }

    /// Permalink, preferring the HTML URL.
    pub fn link(&self) -> Option<&str> {
        self.html_url.as_deref().or(self.url.as_deref())
    }
}

/// Pagination envelope attached to list responses.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
}

/// One page of suggestions.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionsPage {
    #[serde(default, alias = "items")]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// One page of comments.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentsPage {
    #[serde(default, alias = "items")]
    pub comments: Vec<SuggestionComment>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_body_prefers_text() {
        let s: Suggestion = serde_json::from_str(
            r#"{"id": 1, "title": "t", "text": "new", "description": "old"}"#,
        )
        .unwrap();
        assert_eq!(s.body(), "new");

        let s: Suggestion =
            serde_json::from_str(r#"{"id": 1, "title": "t", "description": "old"}"#).unwrap();
        assert_eq!(s.body(), "old");
    }

    #[test]
    fn suggestions_page_accepts_items_alias() {
        let page: SuggestionsPage =
            serde_json::from_str(r#"{"items": [{"id": 7, "title": "t"}]}"#).unwrap();
        assert_eq!(page.suggestions.len(), 1);
        assert_eq!(page.suggestions[0].id, 7);
    }

    #[test]
    fn comment_link_prefers_html_url() {
        let c: SuggestionComment = serde_json::from_str(
            r#"{"id": 2, "body": "b", "html_url": "https://x/1#c2", "url": "https://x/api/2"}"#,
        )
        .unwrap();
        assert_eq!(c.link(), Some("https://x/1#c2"));
        assert_eq!(c.body_text(), "b");
    }
}
