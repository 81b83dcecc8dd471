pub mod common;
pub mod downloader;
pub mod pipeline;
pub mod resolver;

pub use common::candidate::Candidate;
pub use downloader::{DownloadError, DownloadOutcome, MediaDownloader};
pub use pipeline::{run, FeedOutcome, FeedReport, FeedTarget, RunSummary, ScrapeLimits};
pub use resolver::{MediaResolver, ResolveError, ResolvedMedia};
