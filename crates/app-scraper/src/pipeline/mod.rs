use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    common::candidate::Candidate,
    downloader::{DownloadError, DownloadOutcome, MediaDownloader},
    resolver::{MediaResolver, ResolveError, ResolvedMedia},
};

/// A feed (subreddit or user) plus how many media items we want out of it.
#[derive(Debug, Clone)]
pub struct FeedTarget {
    pub name: String,
    pub media_count: u32,
}

impl FeedTarget {
    #[must_use]
    pub fn new<T>(name: T, media_count: u32) -> Self
    where
        T: Into<String>,
    {
        Self {
            name: name.into(),
            media_count,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScrapeLimits {
    /// Maximum posts requested per feed listing
    pub listing_limit: u32,
    /// Hard cap on posts inspected across the whole run
    pub safety_limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// Target count reached or post list exhausted
    Done,
    /// The global safety cap ended iteration mid-feed
    CapReached,
    /// The listing request itself failed; nothing was inspected
    ListingFailed,
}

#[derive(Debug)]
pub struct FeedReport {
    pub name: String,
    pub downloaded: u32,
    /// Files that already existed from a previous run
    pub skipped: u32,
    pub inspected: u32,
    pub outcome: FeedOutcome,
}

impl FeedReport {
    /// Media items accounted for, fresh downloads and pre-existing files
    /// alike. This is what counts against the per-feed target.
    #[must_use]
    pub const fn satisfied(&self) -> u32 {
        self.downloaded + self.skipped
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub feeds: Vec<FeedReport>,
    pub total_inspected: u32,
    /// The safety cap cut the run short, mid-feed or between feeds
    pub cap_reached: bool,
}

impl RunSummary {
    #[must_use]
    pub fn total_downloaded(&self) -> u32 {
        self.feeds.iter().map(|x| x.downloaded).sum()
    }
}

#[async_trait::async_trait]
pub trait PostSource: Send + Sync {
    async fn posts(&self, feed: &str, limit: u32) -> Result<Vec<Candidate>, String>;
}

#[async_trait::async_trait]
pub trait ResolveMedia: Send + Sync {
    async fn resolve(&self, candidate: &Candidate)
        -> Result<Option<ResolvedMedia>, ResolveError>;
}

#[async_trait::async_trait]
pub trait FetchMedia: Send + Sync {
    async fn fetch(
        &self,
        media: &ResolvedMedia,
        candidate: &Candidate,
        dir: &Path,
    ) -> Result<DownloadOutcome, DownloadError>;
}

#[async_trait::async_trait]
impl ResolveMedia for MediaResolver {
    async fn resolve(
        &self,
        candidate: &Candidate,
    ) -> Result<Option<ResolvedMedia>, ResolveError> {
        Self::resolve(self, candidate).await
    }
}

#[async_trait::async_trait]
impl FetchMedia for MediaDownloader {
    async fn fetch(
        &self,
        media: &ResolvedMedia,
        candidate: &Candidate,
        dir: &Path,
    ) -> Result<DownloadOutcome, DownloadError> {
        self.download(media, candidate, dir).await
    }
}

/// Drive the whole run: one feed at a time, one post at a time.
///
/// Per-candidate failures are logged and skipped; nothing below the
/// listing level ever aborts the run. Hitting the safety cap is a
/// deliberate bound, not an error.
pub async fn run(
    targets: &[FeedTarget],
    limits: ScrapeLimits,
    source: &dyn PostSource,
    resolver: &dyn ResolveMedia,
    downloader: &dyn FetchMedia,
    download_dir: &Path,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut inspected_total = 0_u32;

    for target in targets {
        if inspected_total >= limits.safety_limit {
            info!(
                "Safety limit of {} inspected posts reached, stopping the run",
                limits.safety_limit
            );
            summary.cap_reached = true;
            break;
        }

        info!("Downloading media from {}", target.name);

        let posts = match source.posts(&target.name, limits.listing_limit).await {
            Ok(x) => x,
            Err(e) => {
                warn!("Failed to list {}: {e}", target.name);
                summary.feeds.push(FeedReport {
                    name: target.name.clone(),
                    downloaded: 0,
                    skipped: 0,
                    inspected: 0,
                    outcome: FeedOutcome::ListingFailed,
                });
                continue;
            }
        };

        let report = process_feed(
            target,
            limits,
            posts,
            &mut inspected_total,
            resolver,
            downloader,
            download_dir,
        )
        .await;

        info!(
            "Complete: saved {} media items from {} (inspected {} posts)",
            report.downloaded, report.name, report.inspected
        );

        if report.outcome == FeedOutcome::CapReached {
            summary.cap_reached = true;
        }

        summary.feeds.push(report);
    }

    summary.total_inspected = inspected_total;
    summary
}

async fn process_feed(
    target: &FeedTarget,
    limits: ScrapeLimits,
    posts: Vec<Candidate>,
    inspected_total: &mut u32,
    resolver: &dyn ResolveMedia,
    downloader: &dyn FetchMedia,
    download_dir: &Path,
) -> FeedReport {
    let mut report = FeedReport {
        name: target.name.clone(),
        downloaded: 0,
        skipped: 0,
        inspected: 0,
        outcome: FeedOutcome::Done,
    };

    for candidate in posts.iter().take(limits.listing_limit as usize) {
        if report.satisfied() >= target.media_count {
            break;
        }

        if *inspected_total >= limits.safety_limit {
            info!(
                "Reached safety limit of {} posts inspected",
                limits.safety_limit
            );
            report.outcome = FeedOutcome::CapReached;
            break;
        }

        *inspected_total += 1;
        report.inspected += 1;

        let media = match resolver.resolve(candidate).await {
            Ok(Some(media)) => media,
            Ok(None) => {
                debug!(url = %candidate.url, "No supported media in post");
                continue;
            }
            Err(e) => {
                warn!(url = %candidate.url, "Failed to resolve candidate: {e}");
                continue;
            }
        };

        match downloader.fetch(&media, candidate, download_dir).await {
            Ok(DownloadOutcome::Downloaded(path)) => {
                report.downloaded += 1;
                info!(
                    "[{}/{}] {} -> {:?}",
                    report.satisfied(),
                    target.media_count,
                    candidate.url,
                    path
                );
            }
            Ok(DownloadOutcome::Skipped(path)) => {
                report.skipped += 1;
                debug!(url = %candidate.url, ?path, "Already downloaded, skipping");
            }
            Err(e) => {
                warn!(url = %media.url, "Failed to download media: {e}");
            }
        }
    }

    report
}
