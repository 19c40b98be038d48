use engine_logging::{engine_debug, engine_warn};
use harvest_core::{mentions_from_caption, ContentType, PostSummary};
use scraper::{Html, Selector};

use crate::Renderer;

/// Visits each accumulated post and fills in its detail fields.
///
/// A bounded, one-pass map over a fixed list: no convergence logic, no
/// fan-out. One item's failure (render error or a page that yields nothing)
/// keeps that item with its fields left unset and moves on to the next.
pub async fn enrich_posts<R>(renderer: &mut R, posts: Vec<PostSummary>) -> Vec<PostSummary>
where
    R: Renderer + ?Sized,
{
    let mut enriched = Vec::with_capacity(posts.len());
    for post in posts {
        match renderer.open(&post.post_link).await {
            Ok(html) => {
                let detail = parse_post_detail(post, &html);
                enriched.push(detail);
            }
            Err(err) => {
                engine_warn!(
                    "detail fetch failed for {} ({}), keeping bare summary",
                    post.post_link,
                    err
                );
                enriched.push(post);
            }
        }
    }
    enriched
}

/// Parses one post page into the summary's detail fields.
///
/// Returns the summary unchanged when the page yields nothing recognizable,
/// so a failed extraction is indistinguishable from a failed fetch
/// downstream.
pub fn parse_post_detail(mut post: PostSummary, html: &str) -> PostSummary {
    let doc = Html::parse_document(html);
    let video = Selector::parse("video").ok();
    let img = Selector::parse("img").ok();
    let time = Selector::parse("time[datetime]").ok();

    let has_video = video
        .as_ref()
        .is_some_and(|sel| doc.select(sel).next().is_some());
    let first_image = img.as_ref().and_then(|sel| doc.select(sel).next());
    let post_time = time
        .as_ref()
        .and_then(|sel| doc.select(sel).next())
        .and_then(|el| el.value().attr("datetime"))
        .map(str::to_string);

    if !has_video && first_image.is_none() && post_time.is_none() {
        engine_debug!("detail page for {} yielded nothing", post.post_link);
        return post;
    }

    post.content_type = Some(if has_video {
        ContentType::Video
    } else if first_image.is_some() {
        ContentType::Image
    } else {
        ContentType::Unknown
    });

    if let Some(image) = first_image {
        post.media_url = image.value().attr("src").map(str::to_string);
        post.caption = image.value().attr("alt").map(str::to_string);
        if let Some(caption) = post.caption.as_deref() {
            post.mentions = mentions_from_caption(caption);
        }
    }
    post.post_time = post_time;

    post
}
