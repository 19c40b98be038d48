use std::collections::HashMap;
use std::sync::Once;

use harvest_core::{ContentType, PostSummary};
use harvest_engine::{enrich_posts, parse_post_detail, RenderError, Renderer};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Serves one canned detail page per post link; unknown links fail.
struct DetailPages {
    pages: HashMap<String, String>,
    opened: Vec<String>,
}

impl DetailPages {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            opened: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl Renderer for DetailPages {
    async fn reveal_more(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    async fn current_content(&mut self) -> Result<String, RenderError> {
        Err(RenderError::Failure("not a list surface".into()))
    }

    async fn open(&mut self, url: &str) -> Result<String, RenderError> {
        self.opened.push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| RenderError::Failure(format!("no page for {url}")))
    }

    async fn reacquire(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

fn image_page(src: &str, alt: &str) -> String {
    format!(
        "<html><body><img src=\"{src}\" alt=\"{alt}\">\
         <time datetime=\"2026-08-01T12:00:00Z\"></time></body></html>"
    )
}

const LINKS: [&str; 5] = [
    "https://www.instagram.com/u/p/ONE/",
    "https://www.instagram.com/u/p/TWO/",
    "https://www.instagram.com/u/p/THREE/",
    "https://www.instagram.com/u/p/FOUR/",
    "https://www.instagram.com/u/p/FIVE/",
];

#[tokio::test]
async fn one_empty_detail_page_does_not_abort_the_batch() {
    init_logging();
    let pages: Vec<(String, String)> = LINKS
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let html = if i == 2 {
                // Item 3's detail fetch yields nothing recognizable.
                "<html><body></body></html>".to_string()
            } else {
                image_page(&format!("https://cdn.example.com/{i}.jpg"), "a caption")
            };
            (link.to_string(), html)
        })
        .collect();
    let page_refs: Vec<(&str, &str)> = pages
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let mut renderer = DetailPages::new(&page_refs);

    let posts: Vec<PostSummary> = LINKS.iter().map(|link| PostSummary::new(*link)).collect();
    let enriched = enrich_posts(&mut renderer, posts).await;

    assert_eq!(enriched.len(), 5);
    assert_eq!(renderer.opened.len(), 5);
    for (i, post) in enriched.iter().enumerate() {
        if i == 2 {
            assert_eq!(post.content_type, None);
            assert_eq!(post.media_url, None);
            assert_eq!(post.caption, None);
            assert_eq!(post.post_time, None);
        } else {
            assert_eq!(post.content_type, Some(ContentType::Image));
            assert!(post.media_url.is_some());
            assert_eq!(post.caption.as_deref(), Some("a caption"));
            assert!(post.post_time.is_some());
        }
    }
}

#[tokio::test]
async fn a_failed_detail_fetch_keeps_the_bare_summary() {
    init_logging();
    // Only the first link has a page; the second open() fails outright.
    let page = image_page("https://cdn.example.com/0.jpg", "hello @friend");
    let mut renderer = DetailPages::new(&[(LINKS[0], page.as_str())]);

    let posts = vec![PostSummary::new(LINKS[0]), PostSummary::new(LINKS[1])];
    let enriched = enrich_posts(&mut renderer, posts).await;

    assert_eq!(enriched.len(), 2);
    assert!(enriched[0].media_url.is_some());
    assert!(enriched[0].mentions.contains("friend"));
    assert_eq!(enriched[1].content_type, None);
    assert_eq!(enriched[1].post_link, LINKS[1]);
}

#[test]
fn video_markup_wins_over_image_markup() {
    init_logging();
    let html = r#"<html><body>
        <video src="clip.mp4"></video>
        <img src="poster.jpg" alt="with @cameo">
    </body></html>"#;

    let detail = parse_post_detail(PostSummary::new(LINKS[0]), html);
    assert_eq!(detail.content_type, Some(ContentType::Video));
    // The poster image still supplies media URL and caption.
    assert_eq!(detail.media_url.as_deref(), Some("poster.jpg"));
    assert!(detail.mentions.contains("cameo"));
}

#[test]
fn mentions_come_from_the_caption_text() {
    init_logging();
    let html = r#"<img src="x.jpg" alt="trip with @ann and @ben, again @ann">"#;
    let detail = parse_post_detail(PostSummary::new(LINKS[0]), html);

    let mentions: Vec<&str> = detail.mentions.iter().map(String::as_str).collect();
    assert_eq!(mentions, ["ann", "ben"]);
}
