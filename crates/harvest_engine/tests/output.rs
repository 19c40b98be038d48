use std::fs;
use std::sync::Once;

use harvest_core::{
    FollowerHandle, HarvestResult, PostSummary, ProfileStats, ResultSet, StopReason,
};
use harvest_engine::{
    ensure_output_dir, write_follower_outputs, write_post_outputs, AtomicFileWriter,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn follower_result(names: &[&str]) -> HarvestResult<FollowerHandle> {
    let mut set = ResultSet::new();
    set.merge(names.iter().map(|n| FollowerHandle::new(*n)));
    HarvestResult::sorted(
        "https://www.instagram.com/someuser/",
        set,
        StopReason::Converged,
        "2026-08-23T10:00:00Z",
        None,
    )
}

#[test]
fn follower_outputs_cover_all_three_formats() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let result = follower_result(&["carol", "alice", "bob"]);

    let paths = write_follower_outputs(temp.path(), &result, "20260823_100000").unwrap();
    assert_eq!(paths.len(), 3);

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths[0]).unwrap()).unwrap();
    assert_eq!(record["total_followers"], 3);
    assert_eq!(record["stop_reason"], "converged");
    // Sorted on output.
    assert_eq!(
        record["followers"],
        serde_json::json!(["alice", "bob", "carol"])
    );

    let csv = fs::read_to_string(&paths[1]).unwrap();
    assert_eq!(csv, "username\nalice\nbob\ncarol\n");

    let txt = fs::read_to_string(&paths[2]).unwrap();
    assert_eq!(txt.lines().collect::<Vec<_>>(), ["alice", "bob", "carol"]);
}

#[test]
fn every_item_appears_exactly_once() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let result = follower_result(&["dave", "erin"]);

    let paths = write_follower_outputs(temp.path(), &result, "20260823_100001").unwrap();
    let txt = fs::read_to_string(&paths[2]).unwrap();
    for name in ["dave", "erin"] {
        assert_eq!(txt.lines().filter(|line| *line == name).count(), 1);
    }
}

#[test]
fn post_outputs_quote_awkward_captions_and_keep_nulls() {
    init_logging();
    let temp = TempDir::new().unwrap();

    let mut enriched = PostSummary::new("https://www.instagram.com/u/p/AAA/");
    enriched.caption = Some("sunset, beach and \"vibes\"".to_string());
    enriched.media_url = Some("https://cdn.example.com/a.jpg".to_string());
    let bare = PostSummary::new("https://www.instagram.com/u/p/BBB/");

    let mut set = ResultSet::new();
    set.merge([enriched, bare]);
    let result = HarvestResult::insertion_ordered(
        "https://www.instagram.com/u/",
        set,
        StopReason::CapReached,
        "2026-08-23T10:00:00Z",
        Some(50),
    );

    let stats = ProfileStats {
        followers: Some("1,024".to_string()),
        following: None,
        posts: Some("311".to_string()),
    };
    let paths = write_post_outputs(temp.path(), &result, &stats, "20260823_100002").unwrap();
    assert_eq!(paths.len(), 3);

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths[0]).unwrap()).unwrap();
    assert_eq!(record["stats"]["followers"], "1,024");
    assert_eq!(record["stats"]["following"], serde_json::Value::Null);
    assert_eq!(record["total_posts"], 2);
    assert_eq!(record["stop_reason"], "cap_reached");
    // Unenriched fields serialize as null, not as empty strings.
    assert_eq!(record["posts"][1]["media_url"], serde_json::Value::Null);
    assert_eq!(record["posts"][1]["content_type"], serde_json::Value::Null);

    let csv = fs::read_to_string(&paths[1]).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("\"sunset, beach and \"\"vibes\"\"\""));
    // Insertion order is preserved for posts.
    assert!(lines[1].starts_with("https://www.instagram.com/u/p/AAA/"));
    assert!(lines[2].starts_with("https://www.instagram.com/u/p/BBB/"));
}

#[test]
fn post_workbook_is_written_alongside_json_and_csv() {
    init_logging();
    let temp = TempDir::new().unwrap();

    let mut set = ResultSet::new();
    set.insert(PostSummary::new("https://www.instagram.com/u/p/AAA/"));
    let result = HarvestResult::insertion_ordered(
        "https://www.instagram.com/u/",
        set,
        StopReason::Converged,
        "2026-08-23T10:00:00Z",
        None,
    );
    let stats = ProfileStats {
        followers: Some("42".to_string()),
        following: Some("7".to_string()),
        posts: Some("1".to_string()),
    };

    let paths = write_post_outputs(temp.path(), &result, &stats, "20260823_100003").unwrap();
    let workbook = paths.last().unwrap();
    assert!(workbook.to_string_lossy().ends_with(".xlsx"));

    // Workbooks are zip containers; a truncated or empty file would not
    // carry the magic.
    let bytes = fs::read(workbook).unwrap();
    assert!(bytes.len() > 4);
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn creates_missing_output_dir() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_content() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("followers.txt", b"alice\n").unwrap();
    let second = writer.write("followers.txt", b"alice\nbob\n").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "alice\nbob\n");
}

#[test]
fn no_partial_file_on_error() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("followers.txt", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("followers.txt").exists());
}
