use std::time::Duration;

use rand::Rng;

/// A jittered wait window sampled uniformly between `min` and `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterWindow {
    pub min: Duration,
    pub max: Duration,
}

impl JitterWindow {
    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let ms = rand::rng().random_range(self.min.as_millis() as u64..=self.max.as_millis() as u64);
        Duration::from_millis(ms)
    }
}

/// Blocking jittered wait; models the time asynchronous content needs to
/// materialize after a reveal or navigation. There is no cancellation
/// mid-wait.
pub async fn settle(window: JitterWindow) {
    tokio::time::sleep(window.sample()).await;
}

/// Runs `probe` every `interval` until it reports success or `timeout`
/// elapses. The probe runs at least once even with a zero timeout.
/// Returns whether it ever succeeded.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut probe: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if probe().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(interval).await;
    }
}

/// The wait windows used across a harvest run.
///
/// Defaults mirror the render-latency assumptions the harvesting behavior
/// was tuned against; all of them are overridable via the app's tuning file
/// since the page's actual latency is an external, unverified assumption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitPolicy {
    /// After a scroll reveal, before the next snapshot.
    pub scroll_settle: JitterWindow,
    /// After navigating to a profile or post page.
    pub navigation_settle: JitterWindow,
    /// After opening the followers dialog.
    pub dialog_settle: JitterWindow,
    /// Fixed settle after submitting the login form.
    pub post_login_settle: Duration,
    /// Between simulated keystrokes.
    pub keystroke: JitterWindow,
    /// Occasional longer typing pause.
    pub keystroke_pause: JitterWindow,
    /// Probability of inserting the longer typing pause after a keystroke.
    pub keystroke_pause_chance: f64,
    /// Upper bound for each wait-for-ready poll (login fields, dialog
    /// container). Bounds individual steps, never the harvest loop itself.
    pub ready_timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            scroll_settle: JitterWindow::from_millis(2_000, 4_000),
            navigation_settle: JitterWindow::from_millis(4_000, 6_000),
            dialog_settle: JitterWindow::from_millis(3_000, 5_000),
            post_login_settle: Duration::from_secs(15),
            keystroke: JitterWindow::from_millis(100, 300),
            keystroke_pause: JitterWindow::from_millis(300, 700),
            keystroke_pause_chance: 0.1,
            ready_timeout: Duration::from_secs(10),
        }
    }
}
