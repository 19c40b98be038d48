use std::time::Duration;

use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use engine_logging::{engine_debug, engine_info};
use rand::Rng;

use crate::browser::wait_for_element;
use crate::wait::{poll_until, settle, WaitPolicy};
use crate::BrowserError;

/// Login page of the host site.
pub const LOGIN_URL: &str = "https://www.instagram.com/accounts/login/";

const USERNAME_SELECTOR: &str = "input[name='username']";
const PASSWORD_SELECTOR: &str = "input[name='password']";
const SUBMIT_SELECTOR: &str = "button[type='submit']";

const PROMPT_WAIT: Duration = Duration::from_secs(5);
const PROMPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Signs in through the login form.
///
/// Credentials are typed with per-character jitter, the form is submitted,
/// and after the post-login settle the "Not Now" prompt is dismissed if it
/// shows up (its absence is not an error). Each wait-for-ready step is
/// bounded by `waits.ready_timeout`.
pub async fn login(
    page: &Page,
    creds: &Credentials,
    waits: &WaitPolicy,
) -> Result<(), BrowserError> {
    engine_info!("navigating to login page");
    page.goto(LOGIN_URL).await?;
    settle(waits.dialog_settle).await;

    let username = wait_for_element(page, USERNAME_SELECTOR, waits.ready_timeout).await?;
    type_like_human(&username, &creds.username, waits).await?;

    let password = wait_for_element(page, PASSWORD_SELECTOR, waits.ready_timeout).await?;
    type_like_human(&password, &creds.password, waits).await?;

    let submit = wait_for_element(page, SUBMIT_SELECTOR, waits.ready_timeout).await?;
    submit.click().await?;
    engine_info!("login form submitted, waiting for session to settle");
    tokio::time::sleep(waits.post_login_settle).await;

    dismiss_not_now(page).await;
    Ok(())
}

/// Types text one character at a time with jittered delays and the
/// occasional longer pause.
async fn type_like_human(
    element: &Element,
    text: &str,
    waits: &WaitPolicy,
) -> Result<(), BrowserError> {
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        element.type_str(ch.encode_utf8(&mut buf)).await?;
        tokio::time::sleep(waits.keystroke.sample()).await;
        if rand::rng().random::<f64>() < waits.keystroke_pause_chance {
            tokio::time::sleep(waits.keystroke_pause.sample()).await;
        }
    }
    Ok(())
}

/// Best-effort dismissal of the post-login "Not Now" prompts.
///
/// The prompt can render well after the page settles, and dismissing the
/// first one can surface a second, so each is polled for up to
/// `PROMPT_WAIT`. Absence is not an error.
async fn dismiss_not_now(page: &Page) {
    for _ in 0..2 {
        let dismissed = poll_until(PROMPT_WAIT, PROMPT_POLL_INTERVAL, || try_dismiss(page)).await;
        if !dismissed {
            return;
        }
        engine_debug!("dismissed 'Not Now' prompt");
    }
}

async fn try_dismiss(page: &Page) -> bool {
    const SCRIPT: &str = r#"
        (function() {
            const buttons = Array.from(document.querySelectorAll('button'));
            const target = buttons.find(b => b.textContent.trim().toLowerCase() === 'not now');
            if (!target) return false;
            target.click();
            return true;
        })()
    "#;
    match page.evaluate(SCRIPT).await {
        Ok(result) => result.into_value::<bool>().unwrap_or(false),
        Err(err) => {
            engine_debug!("'Not Now' probe failed: {}", err);
            false
        }
    }
}
