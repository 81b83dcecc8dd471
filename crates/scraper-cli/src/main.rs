use std::{fs, process::ExitCode, sync::Arc};

use anyhow::Context;
use app_config::{common::ScrapeConfig, Config};
use app_reddit::{FileSessionStore, RedditClient, RedditCredentials, SessionStore};
use app_scraper::{
    pipeline::{self, PostSource, ScrapeLimits},
    Candidate, FeedOutcome, FeedTarget, MediaDownloader, MediaResolver, RunSummary,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Credentials may come from a local .env file
    let _ = dotenvy::dotenv();

    app_logger::init();

    let config = Config::global();
    app_logger::debug!(config = ?*config, "Running with config");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            app_logger::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let credentials = RedditCredentials::from_env()
        .context("Reddit credentials not configured; check your environment or .env file")?;

    let store = Arc::new(FileSessionStore::new(config.session_file()));

    if config.session.force_reauth {
        store
            .invalidate()
            .context("Failed to drop the stored session")?;
    }

    let client =
        RedditClient::new(credentials, store).context("Failed to build the Reddit client")?;

    client
        .authenticate()
        .await
        .context("Failed to authenticate against Reddit")?;

    let targets = load_subreddit_targets(&config.scrape)?;
    let user_targets = load_user_targets(&config.scrape)?;
    app_logger::info!(
        "Scraping {} subreddits and {} users",
        targets.len(),
        user_targets.len()
    );

    tokio::fs::create_dir_all(&config.scrape.download_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create download directory {:?}",
                config.scrape.download_dir
            )
        })?;

    let resolver = MediaResolver::new(
        config.scrape.allowed_formats(),
        config.scrape.og_preference,
    )
    .context("Failed to build the media resolver")?;
    let downloader = MediaDownloader::new().context("Failed to build the downloader")?;

    let limits = ScrapeLimits {
        listing_limit: config.scrape.subreddit_limit,
        safety_limit: config.scrape.safety_limit,
    };

    let summary = pipeline::run(
        &targets,
        limits,
        &SubredditSource { client: &client },
        &resolver,
        &downloader,
        &config.scrape.download_dir,
    )
    .await;

    report_summary("r/", &summary);

    if !user_targets.is_empty() {
        // The safety limit spans both passes
        let user_limits = ScrapeLimits {
            safety_limit: limits.safety_limit.saturating_sub(summary.total_inspected),
            ..limits
        };

        let user_summary = pipeline::run(
            &user_targets,
            user_limits,
            &UserSource { client: &client },
            &resolver,
            &downloader,
            &config.scrape.download_dir,
        )
        .await;

        report_summary("u/", &user_summary);
    }

    Ok(())
}

struct SubredditSource<'a> {
    client: &'a RedditClient,
}

#[async_trait::async_trait]
impl PostSource for SubredditSource<'_> {
    async fn posts(&self, feed: &str, limit: u32) -> Result<Vec<Candidate>, String> {
        self.client
            .list_new(feed, limit)
            .await
            .map(|posts| candidates(feed, posts))
            .map_err(|e| e.to_string())
    }
}

struct UserSource<'a> {
    client: &'a RedditClient,
}

#[async_trait::async_trait]
impl PostSource for UserSource<'_> {
    async fn posts(&self, feed: &str, limit: u32) -> Result<Vec<Candidate>, String> {
        self.client
            .list_user_submitted(feed, limit)
            .await
            .map(|posts| candidates(feed, posts))
            .map_err(|e| e.to_string())
    }
}

fn candidates(feed: &str, posts: Vec<app_reddit::Submission>) -> Vec<Candidate> {
    posts
        .into_iter()
        .map(|x| Candidate::new(feed, x.id, x.url))
        .collect()
}

fn load_subreddit_targets(scrape: &ScrapeConfig) -> anyhow::Result<Vec<FeedTarget>> {
    let raw = fs::read_to_string(&scrape.subreddit_list)
        .with_context(|| format!("Failed to read subreddit list {:?}", scrape.subreddit_list))?;

    let targets = raw
        .lines()
        .map(str::trim)
        .filter(|x| !x.is_empty() && !x.starts_with('#'))
        .map(|x| FeedTarget::new(x, scrape.post_search_amount))
        .collect::<Vec<_>>();

    if targets.is_empty() {
        anyhow::bail!(
            "Subreddit list {:?} contains no subreddits",
            scrape.subreddit_list
        );
    }

    Ok(targets)
}

/// Users get no per-feed target; everything their listing yields is
/// fair game, bounded only by the listing and safety limits.
fn load_user_targets(scrape: &ScrapeConfig) -> anyhow::Result<Vec<FeedTarget>> {
    let Some(path) = &scrape.user_list else {
        return Ok(vec![]);
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read user list {path:?}"))?;

    let targets = parse_user_list(&raw, scrape.subreddit_limit);

    if targets.is_empty() {
        app_logger::warn!("User list {path:?} contains no users");
    }

    Ok(targets)
}

fn parse_user_list(raw: &str, media_count: u32) -> Vec<FeedTarget> {
    raw.lines()
        // Only the first column counts when the file is a CSV
        .filter_map(|line| line.split(',').next())
        .map(str::trim)
        .filter(|x| !x.is_empty() && !x.starts_with('#'))
        .map(|x| FeedTarget::new(x, media_count))
        .collect()
}

fn report_summary(prefix: &str, summary: &RunSummary) {
    for report in &summary.feeds {
        match report.outcome {
            FeedOutcome::Done => app_logger::info!(
                "{}{}: {} downloaded, {} already present ({} posts inspected)",
                prefix,
                report.name,
                report.downloaded,
                report.skipped,
                report.inspected
            ),
            FeedOutcome::CapReached => app_logger::info!(
                "{}{}: {} downloaded, {} already present (stopped at the safety limit)",
                prefix,
                report.name,
                report.downloaded,
                report.skipped
            ),
            FeedOutcome::ListingFailed => {
                app_logger::warn!(
                    "{}{}: listing failed, nothing downloaded",
                    prefix,
                    report.name
                );
            }
        }
    }

    app_logger::info!(
        "Run complete: {} files downloaded, {} posts inspected{}",
        summary.total_downloaded(),
        summary.total_inspected,
        if summary.cap_reached {
            " (safety limit reached)"
        } else {
            ""
        }
    );
}
