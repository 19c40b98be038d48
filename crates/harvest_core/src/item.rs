use std::collections::BTreeSet;

/// Anything that can be deduplicated by a stable identity key.
///
/// The key is compared byte-for-byte: follower handles exactly as rendered,
/// post links after normalization (see [`crate::normalize_post_link`]).
pub trait Identified {
    /// The identity key used to deduplicate across harvest rounds.
    fn identity(&self) -> &str;
}

/// A single follower handle, case-sensitive, exactly as rendered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FollowerHandle(pub String);

impl FollowerHandle {
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Identified for FollowerHandle {
    fn identity(&self) -> &str {
        &self.0
    }
}

/// Media kind of a post, determined during detail enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Image,
    Video,
    Unknown,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::Unknown => "unknown",
        }
    }
}

/// One harvested post. Only `post_link` is known after listing harvest;
/// every other field stays `None` until detail enrichment fills it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    /// Normalized post link; the identity key.
    pub post_link: String,
    pub content_type: Option<ContentType>,
    pub media_url: Option<String>,
    pub caption: Option<String>,
    pub mentions: BTreeSet<String>,
    pub likes: Option<String>,
    pub comments: Option<String>,
    pub post_time: Option<String>,
}

impl PostSummary {
    /// A bare summary with all detail fields unset.
    pub fn new(post_link: impl Into<String>) -> Self {
        Self {
            post_link: post_link.into(),
            content_type: None,
            media_url: None,
            caption: None,
            mentions: BTreeSet::new(),
            likes: None,
            comments: None,
            post_time: None,
        }
    }
}

impl Identified for PostSummary {
    fn identity(&self) -> &str {
        &self.post_link
    }
}

/// Headline counts from the profile page metadata, kept as the display
/// strings the page shows (e.g. "1,024" or "3.5M").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileStats {
    pub followers: Option<String>,
    pub following: Option<String>,
    pub posts: Option<String>,
}
