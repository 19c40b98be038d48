use std::path::{Path, PathBuf};

use harvest_core::{FollowerHandle, HarvestResult, PostSummary, ProfileStats};
use rust_xlsxwriter::{Workbook, XlsxError};
use serde_json::json;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

const POST_COLUMNS: [&str; 8] = [
    "post_link",
    "content_type",
    "media_url",
    "caption",
    "mentions",
    "likes",
    "comments",
    "post_time",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("workbook error: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Writes the follower result in all three formats:
/// structured record (JSON), tabular (CSV), line-delimited (TXT).
/// Returns the written paths.
pub fn write_follower_outputs(
    output_dir: &Path,
    result: &HarvestResult<FollowerHandle>,
    stamp: &str,
) -> Result<Vec<PathBuf>, ExportError> {
    let writer = AtomicFileWriter::new(output_dir.to_path_buf());

    let record = json!({
        "profile_url": result.profile_url,
        "total_followers": result.total_count,
        "followers": result.items.iter().map(FollowerHandle::as_str).collect::<Vec<_>>(),
        "scraped_at": result.scraped_at,
        "stop_reason": result.stop_reason.as_str(),
    });
    let json_path = writer.write(
        &format!("followers_{stamp}.json"),
        serde_json::to_string_pretty(&record)?.as_bytes(),
    )?;

    let mut csv = String::from("username\n");
    for handle in &result.items {
        csv.push_str(&csv_field(handle.as_str()));
        csv.push('\n');
    }
    let csv_path = writer.write(&format!("followers_{stamp}.csv"), csv.as_bytes())?;

    let mut txt = String::new();
    for handle in &result.items {
        txt.push_str(handle.as_str());
        txt.push('\n');
    }
    let txt_path = writer.write(&format!("followers_{stamp}.txt"), txt.as_bytes())?;

    Ok(vec![json_path, csv_path, txt_path])
}

/// Writes the post result as a structured record (JSON, including profile
/// stats), a tabular file (CSV, one row per post) and a workbook (XLSX
/// with a "Profile Stats" sheet and a "Posts" sheet).
pub fn write_post_outputs(
    output_dir: &Path,
    result: &HarvestResult<PostSummary>,
    stats: &ProfileStats,
    stamp: &str,
) -> Result<Vec<PathBuf>, ExportError> {
    let writer = AtomicFileWriter::new(output_dir.to_path_buf());

    let posts: Vec<_> = result.items.iter().map(post_record).collect();
    let record = json!({
        "profile_url": result.profile_url,
        "stats": {
            "followers": stats.followers,
            "following": stats.following,
            "posts": stats.posts,
        },
        "total_posts": result.total_count,
        "posts": posts,
        "scraped_at": result.scraped_at,
        "stop_reason": result.stop_reason.as_str(),
    });
    let json_path = writer.write(
        &format!("posts_{stamp}.json"),
        serde_json::to_string_pretty(&record)?.as_bytes(),
    )?;

    let mut csv = POST_COLUMNS.join(",");
    csv.push('\n');
    for post in &result.items {
        let line = post_row(post).map(|field| csv_field(&field)).join(",");
        csv.push_str(&line);
        csv.push('\n');
    }
    let csv_path = writer.write(&format!("posts_{stamp}.csv"), csv.as_bytes())?;

    let xlsx_path = writer.write(
        &format!("posts_{stamp}.xlsx"),
        &post_workbook(result, stats)?,
    )?;

    Ok(vec![json_path, csv_path, xlsx_path])
}

/// Renders the post result as workbook bytes.
fn post_workbook(
    result: &HarvestResult<PostSummary>,
    stats: &ProfileStats,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name("Profile Stats")?;
    let stat_rows = [
        ("profile_url", Some(result.profile_url.as_str())),
        ("followers", stats.followers.as_deref()),
        ("following", stats.following.as_deref()),
        ("posts", stats.posts.as_deref()),
        ("scraped_at", Some(result.scraped_at.as_str())),
        ("stop_reason", Some(result.stop_reason.as_str())),
    ];
    for (row, (key, value)) in stat_rows.iter().enumerate() {
        sheet.write(row as u32, 0, *key)?;
        sheet.write(row as u32, 1, value.unwrap_or(""))?;
    }

    let sheet = workbook.add_worksheet().set_name("Posts")?;
    for (col, header) in POST_COLUMNS.iter().enumerate() {
        sheet.write(0, col as u16, *header)?;
    }
    for (row, post) in result.items.iter().enumerate() {
        for (col, field) in post_row(post).iter().enumerate() {
            sheet.write(row as u32 + 1, col as u16, field.as_str())?;
        }
    }

    workbook.save_to_buffer()
}

/// One post as display fields, in `POST_COLUMNS` order. Unset fields
/// render as empty strings in the tabular outputs (the JSON record keeps
/// them as nulls).
fn post_row(post: &PostSummary) -> [String; 8] {
    let mentions = post
        .mentions
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    [
        post.post_link.clone(),
        post.content_type
            .map(|c| c.as_str().to_string())
            .unwrap_or_default(),
        post.media_url.clone().unwrap_or_default(),
        post.caption.clone().unwrap_or_default(),
        mentions,
        post.likes.clone().unwrap_or_default(),
        post.comments.clone().unwrap_or_default(),
        post.post_time.clone().unwrap_or_default(),
    ]
}

fn post_record(post: &PostSummary) -> serde_json::Value {
    json!({
        "post_link": post.post_link,
        "content_type": post.content_type.map(|c| c.as_str()),
        "media_url": post.media_url,
        "caption": post.caption,
        "mentions": post.mentions.iter().collect::<Vec<_>>(),
        "likes": post.likes,
        "comments": post.comments,
        "post_time": post.post_time,
    })
}

/// Minimal CSV quoting: fields containing a delimiter, quote or newline are
/// wrapped in quotes with embedded quotes doubled.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
