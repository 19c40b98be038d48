use crate::{Identified, ResultSet, StopReason};

/// Immutable snapshot of a finished harvest.
///
/// Ownership passes entirely to the output writers; nothing mutates a
/// result after construction. An aborted session still yields a valid,
/// possibly truncated, result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestResult<T> {
    pub profile_url: String,
    pub total_count: usize,
    pub items: Vec<T>,
    /// RFC3339 timestamp supplied by the caller at harvest completion.
    pub scraped_at: String,
    pub stop_reason: StopReason,
}

impl<T: Identified> HarvestResult<T> {
    /// Snapshot preserving first-insertion order, truncated to `max_items`
    /// when a cap is set.
    pub fn insertion_ordered(
        profile_url: impl Into<String>,
        results: ResultSet<T>,
        stop_reason: StopReason,
        scraped_at: impl Into<String>,
        max_items: Option<usize>,
    ) -> Self {
        let mut items = results.into_items();
        if let Some(cap) = max_items {
            items.truncate(cap);
        }
        Self {
            profile_url: profile_url.into(),
            total_count: items.len(),
            items,
            scraped_at: scraped_at.into(),
            stop_reason,
        }
    }

    /// Snapshot with items sorted by their natural order (used for
    /// follower handles, whose output is alphabetical).
    pub fn sorted(
        profile_url: impl Into<String>,
        results: ResultSet<T>,
        stop_reason: StopReason,
        scraped_at: impl Into<String>,
        max_items: Option<usize>,
    ) -> Self
    where
        T: Ord,
    {
        let mut result =
            Self::insertion_ordered(profile_url, results, stop_reason, scraped_at, max_items);
        result.items.sort();
        result
    }
}
