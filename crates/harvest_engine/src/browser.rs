use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use engine_logging::{engine_debug, engine_info, engine_warn};
use futures::StreamExt;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::wait::{poll_until, settle, WaitPolicy};
use crate::RenderError;

/// Desktop user agent pinned to match the hardened browser profile.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";

/// Default scrollable container inside the followers dialog.
pub const DEFAULT_DIALOG_SELECTOR: &str = r#"div[role="dialog"] div.x1dm5mii"#;

/// Profile-page link that opens the followers dialog.
const FOLLOWERS_LINK_SELECTOR: &str = "a[href*='/followers/']";

const REACQUIRE_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser configuration error: {0}")]
    Config(String),
    #[error("browser protocol error: {0}")]
    Cdp(#[from] CdpError),
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: DESKTOP_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Owns the browser process and its CDP event handler task.
///
/// The handler task must be aborted once the browser is gone or it would
/// keep polling a dead connection; `Drop` takes care of that.
pub struct BrowserHandle {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserHandle {
    /// Launches a hardened browser: automation markers disabled, pinned
    /// user agent, fixed window size.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, BrowserError> {
        engine_info!("launching browser (headless: {})", settings.headless);

        let mut builder = BrowserConfig::builder()
            .window_size(settings.window_width, settings.window_height)
            .request_timeout(settings.request_timeout)
            .arg(format!("--user-agent={}", settings.user_agent))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        builder = if settings.headless {
            builder.headless_mode(HeadlessMode::New)
        } else {
            builder.with_head()
        };
        let config = builder.build().map_err(BrowserError::Config)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self { browser, handler })
    }

    /// Opens a page and masks the automation marker before any site script
    /// can observe it.
    pub async fn new_page(&self, url: &str) -> Result<Page, BrowserError> {
        let page = self.browser.new_page(url).await?;
        page.evaluate("Object.defineProperty(navigator, 'webdriver', {get: () => undefined})")
            .await?;
        Ok(page)
    }

    /// Orderly shutdown; waits for the process to exit.
    pub async fn shutdown(&mut self) -> Result<(), BrowserError> {
        self.browser.close().await?;
        if let Err(err) = self.browser.wait().await {
            engine_warn!("browser process did not exit cleanly: {}", err);
        }
        Ok(())
    }
}

impl Drop for BrowserHandle {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Navigates to the profile page and lets it settle.
pub async fn goto_profile(page: &Page, url: &str, waits: &WaitPolicy) -> Result<(), BrowserError> {
    page.goto(url).await?;
    settle(waits.navigation_settle).await;
    Ok(())
}

/// Clicks the followers link on a profile page and waits for the dialog's
/// scrollable container to materialize.
pub async fn open_followers_dialog(
    page: &Page,
    container_selector: &str,
    waits: &WaitPolicy,
) -> Result<(), BrowserError> {
    let link = wait_for_element(page, FOLLOWERS_LINK_SELECTOR, waits.ready_timeout).await?;
    link.click().await?;
    settle(waits.dialog_settle).await;

    let ready = poll_until(waits.ready_timeout, REACQUIRE_POLL_INTERVAL, || async move {
        element_exists(page, container_selector).await.unwrap_or(false)
    })
    .await;
    if ready {
        Ok(())
    } else {
        Err(BrowserError::Timeout("followers dialog container"))
    }
}

/// Bounded poll for an element to become present.
pub(crate) async fn wait_for_element(
    page: &Page,
    selector: &'static str,
    timeout: Duration,
) -> Result<chromiumoxide::element::Element, BrowserError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Ok(element);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(BrowserError::Timeout(selector));
        }
        tokio::time::sleep(REACQUIRE_POLL_INTERVAL).await;
    }
}

async fn element_exists(page: &Page, selector: &str) -> Result<bool, BrowserError> {
    // Selector is interpolated as a JSON string so arbitrary quoting in the
    // configured value cannot break out of the script.
    let script = format!(
        "document.querySelector({}) !== null",
        serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string())
    );
    let exists = page
        .evaluate(script)
        .await?
        .into_value::<bool>()
        .unwrap_or(false);
    Ok(exists)
}

fn to_render_error(err: CdpError) -> RenderError {
    RenderError::Failure(err.to_string())
}

/// Live renderer over a profile's main page: revealing more means scrolling
/// the window itself. The surface is the document, which never re-mounts,
/// so it is never stale.
pub struct PageRenderer {
    page: Page,
    waits: WaitPolicy,
    scroll_step: u32,
}

impl PageRenderer {
    pub fn new(page: Page, waits: WaitPolicy, scroll_step: u32) -> Self {
        Self {
            page,
            waits,
            scroll_step,
        }
    }
}

#[async_trait::async_trait]
impl crate::Renderer for PageRenderer {
    async fn reveal_more(&mut self) -> Result<(), RenderError> {
        self.page
            .evaluate(format!("window.scrollBy(0, {});", self.scroll_step))
            .await
            .map_err(to_render_error)?;
        settle(self.waits.scroll_settle).await;
        Ok(())
    }

    async fn current_content(&mut self) -> Result<String, RenderError> {
        self.page.content().await.map_err(to_render_error)
    }

    async fn open(&mut self, url: &str) -> Result<String, RenderError> {
        self.page.goto(url).await.map_err(to_render_error)?;
        settle(self.waits.navigation_settle).await;
        self.page.content().await.map_err(to_render_error)
    }

    async fn reacquire(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Live renderer over the followers dialog: revealing more means scrolling
/// the dialog's virtualized list container to its bottom. The container can
/// re-mount while content streams in, which surfaces as a stale target.
pub struct DialogRenderer {
    page: Page,
    waits: WaitPolicy,
    container_selector: String,
}

impl DialogRenderer {
    pub fn new(page: Page, waits: WaitPolicy, container_selector: impl Into<String>) -> Self {
        Self {
            page,
            waits,
            container_selector: container_selector.into(),
        }
    }

    fn scroll_script(&self) -> String {
        let selector = serde_json::to_string(&self.container_selector)
            .unwrap_or_else(|_| "\"\"".to_string());
        format!(
            "(function() {{ \
                const el = document.querySelector({selector}); \
                if (!el) return false; \
                el.scrollTop = el.scrollHeight; \
                return true; \
             }})()"
        )
    }
}

#[async_trait::async_trait]
impl crate::Renderer for DialogRenderer {
    async fn reveal_more(&mut self) -> Result<(), RenderError> {
        let found = self
            .page
            .evaluate(self.scroll_script())
            .await
            .map_err(to_render_error)?
            .into_value::<bool>()
            .unwrap_or(false);
        if !found {
            engine_debug!(
                "followers dialog container missing during scroll (round {})",
                engine_logging::get_harvest_round()
            );
            return Err(RenderError::StaleTarget);
        }
        settle(self.waits.scroll_settle).await;
        Ok(())
    }

    async fn current_content(&mut self) -> Result<String, RenderError> {
        self.page.content().await.map_err(to_render_error)
    }

    async fn open(&mut self, url: &str) -> Result<String, RenderError> {
        self.page.goto(url).await.map_err(to_render_error)?;
        settle(self.waits.navigation_settle).await;
        self.page.content().await.map_err(to_render_error)
    }

    async fn reacquire(&mut self) -> Result<(), RenderError> {
        let page = &self.page;
        let selector = self.container_selector.as_str();
        let found = poll_until(
            self.waits.ready_timeout,
            REACQUIRE_POLL_INTERVAL,
            || async move {
                match element_exists(page, selector).await {
                    Ok(found) => found,
                    Err(err) => {
                        engine_warn!(
                            "container probe failed in round {}: {}",
                            engine_logging::get_harvest_round(),
                            err
                        );
                        false
                    }
                }
            },
        )
        .await;
        if found {
            Ok(())
        } else {
            Err(RenderError::StaleTarget)
        }
    }
}
