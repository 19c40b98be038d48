//! Harvest engine: browser-backed rendering, extraction, enrichment and
//! output writing around the pure core.
mod browser;
mod enrich;
mod export;
mod extract;
mod harvest;
mod login;
mod persist;
mod renderer;
mod types;
mod wait;

pub use browser::{
    goto_profile, open_followers_dialog, BrowserError, BrowserHandle, BrowserSettings,
    DialogRenderer, PageRenderer, DEFAULT_DIALOG_SELECTOR, DESKTOP_USER_AGENT,
};
pub use enrich::{enrich_posts, parse_post_detail};
pub use export::{write_follower_outputs, write_post_outputs, ExportError};
pub use extract::{
    ExtractError, Extractor, FollowerExtractor, PostLinkExtractor, ProfileStatsExtractor,
    DEFAULT_HANDLE_SELECTOR,
};
pub use harvest::run_harvest;
pub use login::{login, Credentials, LOGIN_URL};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use renderer::Renderer;
pub use types::RenderError;
pub use wait::{poll_until, settle, JitterWindow, WaitPolicy};
