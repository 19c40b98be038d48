use std::sync::Once;

use harvest_core::{FollowerHandle, Identified, PostSummary, ResultSet};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn handles(names: &[&str]) -> Vec<FollowerHandle> {
    names.iter().map(|n| FollowerHandle::new(*n)).collect()
}

#[test]
fn merge_counts_only_new_identities() {
    init_logging();
    let mut set = ResultSet::new();

    assert_eq!(set.merge(handles(&["alice", "bob"])), 2);
    assert_eq!(set.merge(handles(&["bob", "carol"])), 1);
    assert_eq!(set.merge(handles(&["alice", "bob", "carol"])), 0);
    assert_eq!(set.len(), 3);
}

#[test]
fn reinserting_an_identity_is_a_noop() {
    init_logging();
    let mut set = ResultSet::new();

    assert!(set.insert(FollowerHandle::new("alice")));
    assert!(!set.insert(FollowerHandle::new("alice")));
    assert_eq!(set.len(), 1);
    assert!(set.contains("alice"));
    assert!(!set.contains("Alice")); // identity is case-sensitive
}

#[test]
fn first_insertion_order_is_preserved() {
    init_logging();
    let mut set = ResultSet::new();
    set.merge(handles(&["carol", "alice"]));
    set.merge(handles(&["alice", "bob"]));

    let order: Vec<&str> = set.iter().map(FollowerHandle::as_str).collect();
    assert_eq!(order, ["carol", "alice", "bob"]);
}

#[test]
fn merge_is_order_independent_over_snapshots() {
    init_logging();
    // The same three snapshots, merged in every rotation, must produce the
    // same identity set.
    let snapshots = [
        handles(&["a", "b"]),
        handles(&["b", "c"]),
        handles(&["c", "a", "d"]),
    ];

    let mut reference: Vec<String> = Vec::new();
    for rotation in 0..snapshots.len() {
        let mut set = ResultSet::new();
        for i in 0..snapshots.len() {
            let snap = &snapshots[(rotation + i) % snapshots.len()];
            set.merge(snap.clone());
        }
        let mut identities: Vec<String> =
            set.iter().map(|h| h.identity().to_string()).collect();
        identities.sort();

        if reference.is_empty() {
            reference = identities;
        } else {
            assert_eq!(identities, reference);
        }
    }
    assert_eq!(reference, ["a", "b", "c", "d"]);
}

#[test]
fn post_summaries_deduplicate_by_link() {
    init_logging();
    let mut set = ResultSet::new();

    assert!(set.insert(PostSummary::new("https://example.com/u/p/ABC/")));
    assert!(!set.insert(PostSummary::new("https://example.com/u/p/ABC/")));
    assert!(set.insert(PostSummary::new("https://example.com/u/reel/DEF/")));
    assert_eq!(set.len(), 2);
}

#[test]
fn size_is_monotonic_across_merges() {
    init_logging();
    let mut set = ResultSet::new();
    let mut previous = 0;

    for snap in [
        handles(&["a"]),
        handles(&[]),
        handles(&["a", "b"]),
        handles(&["b"]),
    ] {
        set.merge(snap);
        assert!(set.len() >= previous);
        previous = set.len();
    }
}
