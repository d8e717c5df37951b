//! Content piece definitions
//!
//! A content piece is one generated artifact (blog or newsletter). Pieces are
//! immutable once created; an improved variation is a new piece that points
//! back at its source through `parent_variant_id`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audience key used for blog content, which goes to every segment
pub const GENERAL_AUDIENCE: &str = "general";

// ─────────────────────────────────────────────────────────────────
// Content Kind
// ─────────────────────────────────────────────────────────────────

/// Kind of generated content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Long-form blog post (400-600 words nominal)
    Blog,
    /// Persona-specific newsletter (150-250 words nominal)
    Newsletter,
}

impl ContentKind {
    /// Nominal word-count range requested from the generator
    pub fn word_range(&self) -> (usize, usize) {
        match self {
            ContentKind::Blog => (400, 600),
            ContentKind::Newsletter => (150, 250),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Blog => write!(f, "blog"),
            ContentKind::Newsletter => write!(f, "newsletter"),
        }
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blog" => Ok(ContentKind::Blog),
            "newsletter" => Ok(ContentKind::Newsletter),
            _ => Err(format!("Unknown content kind '{}'. Valid: blog, newsletter", s)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Content Piece
// ─────────────────────────────────────────────────────────────────

/// A single generated piece of content owned by one campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPiece {
    /// Unique content id
    pub id: String,

    /// Owning campaign
    pub campaign_id: String,

    /// Target persona, `None` for general blog content
    pub persona_id: Option<String>,

    /// Blog or newsletter
    pub kind: ContentKind,

    /// Blog title or newsletter subject line
    pub title: String,

    /// Body text (markdown)
    pub body: String,

    /// Number of whitespace-separated words in the body
    pub word_count: usize,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Creation order inside the campaign, breaks timestamp ties
    pub sequence: u32,

    /// Source piece when this piece is an improved variation
    pub parent_variant_id: Option<String>,
}

impl ContentPiece {
    /// Create a new piece for a campaign
    pub fn new(
        campaign_id: impl Into<String>,
        persona_id: Option<String>,
        kind: ContentKind,
        title: impl Into<String>,
        body: impl Into<String>,
        sequence: u32,
    ) -> Self {
        let body = body.into();
        Self {
            id: format!("content-{}", uuid::Uuid::new_v4()),
            campaign_id: campaign_id.into(),
            persona_id,
            kind,
            title: title.into(),
            word_count: count_words(&body),
            body,
            created_at: Utc::now(),
            sequence,
            parent_variant_id: None,
        }
    }

    /// Create an improved variation of this piece.
    ///
    /// The variation keeps the campaign, persona and kind of its source and
    /// records the source id as its parent. The source is left untouched.
    pub fn variation(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        sequence: u32,
    ) -> Self {
        let mut piece = Self::new(
            self.campaign_id.clone(),
            self.persona_id.clone(),
            self.kind,
            title,
            body,
            sequence,
        );
        piece.parent_variant_id = Some(self.id.clone());
        piece
    }

    /// Audience key: persona id, or "general" for blog content
    pub fn audience(&self) -> &str {
        self.persona_id.as_deref().unwrap_or(GENERAL_AUDIENCE)
    }

    /// Whether this piece is a variation of another piece
    pub fn is_variation(&self) -> bool {
        self.parent_variant_id.is_some()
    }

    /// Universal tie-break order: creation timestamp, then creation sequence
    pub fn creation_order(&self, other: &ContentPiece) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// Count whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_piece_counts_words() {
        let piece = ContentPiece::new(
            "campaign-1",
            Some("founders".to_string()),
            ContentKind::Newsletter,
            "Subject",
            "one two  three\nfour",
            1,
        );
        assert_eq!(piece.word_count, 4);
        assert!(piece.id.starts_with("content-"));
        assert_eq!(piece.audience(), "founders");
        assert!(!piece.is_variation());
    }

    #[test]
    fn test_blog_audience_is_general() {
        let piece = ContentPiece::new("c", None, ContentKind::Blog, "T", "body", 0);
        assert_eq!(piece.audience(), GENERAL_AUDIENCE);
    }

    #[test]
    fn test_variation_links_parent_without_mutating_source() {
        let source = ContentPiece::new(
            "campaign-1",
            Some("creatives".to_string()),
            ContentKind::Newsletter,
            "Original",
            "original body",
            2,
        );
        let before = source.clone();

        let variant = source.variation("Improved", "a better body text", 5);

        assert_eq!(source, before);
        assert_eq!(variant.parent_variant_id.as_deref(), Some(source.id.as_str()));
        assert_ne!(variant.id, source.id);
        assert_eq!(variant.campaign_id, source.campaign_id);
        assert_eq!(variant.persona_id, source.persona_id);
        assert_eq!(variant.kind, source.kind);
        assert_eq!(variant.sequence, 5);
    }

    #[test]
    fn test_creation_order_uses_sequence_on_equal_timestamps() {
        let a = ContentPiece::new("c", None, ContentKind::Blog, "A", "a", 0);
        let mut b = ContentPiece::new("c", None, ContentKind::Blog, "B", "b", 1);
        b.created_at = a.created_at;

        assert_eq!(a.creation_order(&b), Ordering::Less);
        assert_eq!(b.creation_order(&a), Ordering::Greater);
    }

    #[test]
    fn test_content_kind_parse_and_serde() {
        assert_eq!("Blog".parse::<ContentKind>().unwrap(), ContentKind::Blog);
        assert!("podcast".parse::<ContentKind>().is_err());
        assert_eq!(
            serde_json::to_string(&ContentKind::Newsletter).unwrap(),
            "\"newsletter\""
        );
    }
}
