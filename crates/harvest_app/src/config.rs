use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use harvest_engine::{JitterWindow, WaitPolicy};
use serde::{Deserialize, Serialize};

/// Policy tuning overrides loaded from a RON file.
///
/// The built-in defaults encode assumptions about the page's render latency
/// that cannot be verified ahead of time, so every one of them can be
/// adjusted without rebuilding. Unset fields keep the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Consecutive no-growth rounds before the harvest converges.
    pub stall_threshold: Option<u32>,
    /// Pixels scrolled per reveal in posts mode.
    pub scroll_step: Option<u32>,
    /// (min, max) milliseconds to settle after a scroll reveal.
    pub scroll_settle_ms: Option<(u64, u64)>,
    /// (min, max) milliseconds to settle after a navigation.
    pub navigation_settle_ms: Option<(u64, u64)>,
    /// (min, max) milliseconds to settle after opening the dialog.
    pub dialog_settle_ms: Option<(u64, u64)>,
    /// Fixed milliseconds to wait after submitting the login form.
    pub post_login_settle_ms: Option<u64>,
    /// (min, max) milliseconds between simulated keystrokes.
    pub keystroke_ms: Option<(u64, u64)>,
    /// Milliseconds to wait for a ready element before giving up on it.
    pub ready_timeout_ms: Option<u64>,
    /// CSS selector matching one rendered follower handle.
    pub handle_selector: Option<String>,
    /// CSS selector for the followers dialog's scrollable container.
    pub dialog_selector: Option<String>,
}

impl Tuning {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read tuning file {}", path.display()))?;
        ron::from_str(&content)
            .with_context(|| format!("failed to parse tuning file {}", path.display()))
    }

    /// Applies the overrides on top of the default wait policy.
    pub fn wait_policy(&self) -> WaitPolicy {
        let mut waits = WaitPolicy::default();
        if let Some((min, max)) = self.scroll_settle_ms {
            waits.scroll_settle = JitterWindow::from_millis(min, max);
        }
        if let Some((min, max)) = self.navigation_settle_ms {
            waits.navigation_settle = JitterWindow::from_millis(min, max);
        }
        if let Some((min, max)) = self.dialog_settle_ms {
            waits.dialog_settle = JitterWindow::from_millis(min, max);
        }
        if let Some(ms) = self.post_login_settle_ms {
            waits.post_login_settle = Duration::from_millis(ms);
        }
        if let Some((min, max)) = self.keystroke_ms {
            waits.keystroke = JitterWindow::from_millis(min, max);
        }
        if let Some(ms) = self.ready_timeout_ms {
            waits.ready_timeout = Duration::from_millis(ms);
        }
        waits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_tuning_file_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "(stall_threshold: Some(8), scroll_settle_ms: Some((100, 200)))"
        )
        .unwrap();

        let tuning = Tuning::load(file.path()).unwrap();
        assert_eq!(tuning.stall_threshold, Some(8));
        assert_eq!(tuning.handle_selector, None);

        let waits = tuning.wait_policy();
        assert_eq!(waits.scroll_settle, JitterWindow::from_millis(100, 200));
        assert_eq!(waits.navigation_settle, WaitPolicy::default().navigation_settle);
    }

    #[test]
    fn malformed_tuning_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(stall_threshold: \"eight\")").unwrap();
        assert!(Tuning::load(file.path()).is_err());
    }
}
