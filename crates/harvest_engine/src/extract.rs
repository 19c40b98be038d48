use std::collections::BTreeSet;

use harvest_core::{normalize_post_link, FollowerHandle, Identified, PostSummary, ProfileStats};
use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Default markup signature of a rendered follower handle.
pub const DEFAULT_HANDLE_SELECTOR: &str = "span._ap3a";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid CSS selector: {0}")]
    InvalidSelector(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Turns one raw content snapshot into typed candidate items.
///
/// Pure function of its input: idempotent, order-independent, and
/// deduplicated within a single call. Duplicates *across* calls are expected
/// every round (overlapping scroll windows) and are handled by the
/// ResultSet merge.
pub trait Extractor {
    type Item: Identified;

    fn extract(&self, html: &str) -> Vec<Self::Item>;
}

/// Matches one markup signature per rendered follower handle.
#[derive(Debug, Clone)]
pub struct FollowerExtractor {
    selector: Selector,
}

impl FollowerExtractor {
    pub fn new(selector: &str) -> Result<Self, ExtractError> {
        let selector = Selector::parse(selector)
            .map_err(|err| ExtractError::InvalidSelector(err.to_string()))?;
        Ok(Self { selector })
    }
}

impl Extractor for FollowerExtractor {
    type Item = FollowerHandle;

    fn extract(&self, html: &str) -> Vec<FollowerHandle> {
        let doc = Html::parse_document(html);
        let mut usernames = BTreeSet::new();
        for element in doc.select(&self.selector) {
            let username = element.text().collect::<String>().trim().to_string();
            if !username.is_empty() {
                usernames.insert(username);
            }
        }
        usernames.into_iter().map(FollowerHandle).collect()
    }
}

/// Matches post anchors against the documented path allow-list and yields
/// bare summaries keyed by the normalized link.
#[derive(Debug, Clone)]
pub struct PostLinkExtractor {
    base: Url,
    anchors: Selector,
}

impl PostLinkExtractor {
    pub fn new(profile_url: &str) -> Result<Self, ExtractError> {
        let base = Url::parse(profile_url)?;
        let anchors = Selector::parse("a[href]")
            .map_err(|err| ExtractError::InvalidSelector(err.to_string()))?;
        Ok(Self { base, anchors })
    }
}

impl Extractor for PostLinkExtractor {
    type Item = PostSummary;

    fn extract(&self, html: &str) -> Vec<PostSummary> {
        let doc = Html::parse_document(html);
        let mut links = BTreeSet::new();
        for anchor in doc.select(&self.anchors) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if let Some(link) = normalize_post_link(href, &self.base) {
                links.insert(link);
            }
        }
        links.into_iter().map(PostSummary::new).collect()
    }
}

/// Parses the profile's headline counts out of its meta description,
/// e.g. `"1,024 Followers, 58 Following, 311 Posts - ..."`.
#[derive(Debug)]
pub struct ProfileStatsExtractor {
    followers: Regex,
    following: Regex,
    posts: Regex,
}

impl ProfileStatsExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            followers: stat_pattern("followers")?,
            following: stat_pattern("following")?,
            posts: stat_pattern("posts")?,
        })
    }

    pub fn extract(&self, html: &str) -> ProfileStats {
        let doc = Html::parse_document(html);
        let Some(meta) = Selector::parse(r#"meta[name="description"]"#).ok() else {
            return ProfileStats::default();
        };
        let Some(content) = doc
            .select(&meta)
            .next()
            .and_then(|el| el.value().attr("content"))
        else {
            return ProfileStats::default();
        };

        ProfileStats {
            followers: first_capture(&self.followers, content),
            following: first_capture(&self.following, content),
            posts: first_capture(&self.posts, content),
        }
    }
}

fn stat_pattern(key: &str) -> Result<Regex, regex::Error> {
    // Display counts carry separators and K/M/B magnitude suffixes.
    Regex::new(&format!(r"(?i)([\d,.]+[KMB]?)\s+{key}"))
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
