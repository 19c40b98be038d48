//! Command line front end: signs in, drives the harvest over a live
//! browser and writes the output files.
mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use engine_logging::{engine_error, engine_info, engine_warn, LogDestination};
use harvest_core::{ConvergencePolicy, HarvestResult, ProfileStats};
use harvest_engine::{
    enrich_posts, goto_profile, login, open_followers_dialog, run_harvest, write_follower_outputs,
    write_post_outputs, BrowserHandle, BrowserSettings, Credentials, DialogRenderer,
    FollowerExtractor, PageRenderer, PostLinkExtractor, ProfileStatsExtractor, Renderer,
    WaitPolicy, DEFAULT_DIALOG_SELECTOR, DEFAULT_HANDLE_SELECTOR,
};

use crate::config::Tuning;

const DEFAULT_SCROLL_STEP: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Collect follower handles from the followers dialog.
    Followers,
    /// Collect post links from the profile grid.
    Posts,
}

/// Harvests follower handles or post listings from a public profile.
#[derive(Debug, Parser)]
#[command(name = "harvest", version, about)]
struct Cli {
    /// Profile URL, e.g. https://www.instagram.com/someuser/
    profile_url: String,

    /// What to harvest.
    #[arg(long, value_enum, default_value_t = Mode::Followers)]
    mode: Mode,

    /// Stop once this many items have been collected.
    #[arg(long)]
    max_items: Option<usize>,

    /// Visit each harvested post for media, caption and timestamp details
    /// (posts mode only).
    #[arg(long)]
    detailed: bool,

    /// Run the browser without a visible window.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    headless: bool,

    /// Directory the output files are written to.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Account username used to sign in.
    #[arg(long, env = "IG_USERNAME")]
    username: String,

    /// Account password used to sign in.
    #[arg(long, env = "IG_PASSWORD", hide_env_values = true)]
    password: String,

    /// RON file overriding the built-in tuning parameters.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    engine_logging::initialize(LogDestination::Both, Path::new("harvest.log"));

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let outcome = runtime.block_on(run(cli));
    if let Err(err) = &outcome {
        engine_error!("harvest failed: {:#}", err);
    }
    outcome
}

async fn run(cli: Cli) -> Result<()> {
    let tuning = match &cli.config {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let waits = tuning.wait_policy();

    let mut policy = ConvergencePolicy {
        max_items: cli.max_items,
        ..ConvergencePolicy::default()
    };
    if let Some(threshold) = tuning.stall_threshold {
        policy.stall_threshold = threshold;
    }

    let settings = BrowserSettings {
        headless: cli.headless,
        ..BrowserSettings::default()
    };
    let mut browser = BrowserHandle::launch(&settings).await?;
    let outcome = harvest(&cli, &browser, &tuning, policy, waits).await;
    if let Err(err) = browser.shutdown().await {
        engine_warn!("browser shutdown failed: {}", err);
    }
    outcome
}

async fn harvest(
    cli: &Cli,
    browser: &BrowserHandle,
    tuning: &Tuning,
    policy: ConvergencePolicy,
    waits: WaitPolicy,
) -> Result<()> {
    let page = browser.new_page("about:blank").await?;

    let credentials = Credentials {
        username: cli.username.clone(),
        password: cli.password.clone(),
    };
    login(&page, &credentials, &waits)
        .await
        .context("sign-in failed")?;

    goto_profile(&page, &cli.profile_url, &waits).await?;
    engine_info!("profile page loaded: {}", cli.profile_url);

    match cli.mode {
        Mode::Followers => {
            let dialog_selector = tuning
                .dialog_selector
                .clone()
                .unwrap_or_else(|| DEFAULT_DIALOG_SELECTOR.to_string());
            open_followers_dialog(&page, &dialog_selector, &waits)
                .await
                .context("followers dialog did not open")?;

            let handle_selector = tuning
                .handle_selector
                .as_deref()
                .unwrap_or(DEFAULT_HANDLE_SELECTOR);
            let extractor = FollowerExtractor::new(handle_selector)?;
            let mut renderer = DialogRenderer::new(page, waits, dialog_selector);

            let (results, stop_reason) = run_harvest(&mut renderer, &extractor, policy).await;
            let result = HarvestResult::sorted(
                cli.profile_url.clone(),
                results,
                stop_reason,
                Local::now().to_rfc3339(),
                policy.max_items,
            );

            let paths = write_follower_outputs(&cli.output_dir, &result, &run_stamp())?;
            report(result.total_count, "followers", stop_reason, &paths);
        }
        Mode::Posts => {
            let extractor = PostLinkExtractor::new(&cli.profile_url)?;
            let stats_extractor = ProfileStatsExtractor::new()?;
            let scroll_step = tuning.scroll_step.unwrap_or(DEFAULT_SCROLL_STEP);
            let mut renderer = PageRenderer::new(page, waits, scroll_step);

            // Stats live in the profile page head, available before any
            // scrolling happens.
            let stats = match renderer.current_content().await {
                Ok(html) => stats_extractor.extract(&html),
                Err(err) => {
                    engine_warn!("profile stats unavailable: {}", err);
                    ProfileStats::default()
                }
            };

            let (results, stop_reason) = run_harvest(&mut renderer, &extractor, policy).await;
            let result = HarvestResult::insertion_ordered(
                cli.profile_url.clone(),
                results,
                stop_reason,
                Local::now().to_rfc3339(),
                policy.max_items,
            );
            // Enrichment keeps one summary per harvested link, so the count
            // and ordering carry over unchanged.
            let result = if cli.detailed {
                let HarvestResult {
                    profile_url,
                    total_count,
                    items,
                    scraped_at,
                    stop_reason,
                } = result;
                let items = enrich_posts(&mut renderer, items).await;
                HarvestResult {
                    profile_url,
                    total_count,
                    items,
                    scraped_at,
                    stop_reason,
                }
            } else {
                result
            };

            let paths = write_post_outputs(&cli.output_dir, &result, &stats, &run_stamp())?;
            report(result.total_count, "posts", stop_reason, &paths);
        }
    }

    Ok(())
}

fn run_stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn report(count: usize, noun: &str, stop_reason: harvest_core::StopReason, paths: &[PathBuf]) {
    engine_info!(
        "harvested {} {} ({}); wrote {} files",
        count,
        noun,
        stop_reason.as_str(),
        paths.len()
    );
    for path in paths {
        println!("{}", path.display());
    }
}
