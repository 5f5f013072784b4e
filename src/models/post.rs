//! Post data structures.

use serde::{Deserialize, Deserializer, Serialize};

/// A text post ready to be persisted.
///
/// Field names double as document field names in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedPost {
    /// Username of the post's creator
    pub author: String,

    /// Creation time as reported by the listing (epoch seconds)
    pub created: f64,

    /// Flair label, if any
    pub tag: Option<String>,

    pub title: String,

    /// Self text; never empty
    pub body: String,

    pub url: String,
}

impl NormalizedPost {
    /// Composite key the store keeps unique.
    pub fn key(&self) -> PostKey {
        PostKey::new(&self.author, self.created)
    }
}

/// The `(author, created)` pair identifying a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostKey {
    author: String,
    created_bits: u64,
}

impl PostKey {
    pub fn new(author: &str, created: f64) -> Self {
        // Normalize -0.0 so it collides with 0.0 like a numeric index would.
        let created = if created == 0.0 { 0.0 } else { created };
        Self {
            author: author.to_string(),
            created_bits: created.to_bits(),
        }
    }
}

/// One item's `data` object as the listing returns it.
///
/// Every field must be present; `link_flair_text` may be null but not missing.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    pub author: String,
    pub created: f64,
    #[serde(deserialize_with = "present_or_null")]
    pub link_flair_text: Option<String>,
    pub title: String,
    pub selftext: String,
    pub url: String,
}

impl RawPost {
    /// Whether the item carries body text.
    pub fn is_text_post(&self) -> bool {
        !self.selftext.is_empty()
    }
}

impl From<RawPost> for NormalizedPost {
    fn from(raw: RawPost) -> Self {
        Self {
            author: raw.author,
            created: raw.created,
            tag: raw.link_flair_text,
            title: raw.title,
            body: raw.selftext,
            url: raw.url,
        }
    }
}

// With `deserialize_with`, serde reports a missing field instead of
// silently defaulting an `Option` to `None`.
pub(crate) fn present_or_null<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}
