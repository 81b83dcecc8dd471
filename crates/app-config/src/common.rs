use std::path::PathBuf;

use clap::{Args, CommandFactory, ValueEnum, ValueHint};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::cli::CliArgs;

pub const DEFAULT_MEDIA_FORMATS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif", "mp4", "webm", "mov", "m4v", "mkv",
    "avi",
];

#[derive(Debug, Clone, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = Some("Scrape options"))]
pub struct ScrapeConfig {
    /// File containing the subreddits to scrape, one name per line.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    #[arg(long, default_value = "data/subreddits.txt", env = "REDDIT_SCRAPER_SUBREDDIT_LIST", value_hint = ValueHint::FilePath)]
    pub subreddit_list: PathBuf,

    /// Optional file of Reddit users whose submissions are scraped after
    /// the subreddits.
    ///
    /// One username per line; anything after a comma is ignored, as are
    /// blank lines and lines starting with `#`.
    #[arg(long, env = "REDDIT_SCRAPER_USER_LIST", value_hint = ValueHint::FilePath)]
    pub user_list: Option<PathBuf>,

    /// Directory to download media into.
    ///
    /// Will be created if it doesn't exist.
    #[arg(long, default_value = "data/downloads", env = "REDDIT_SCRAPER_DOWNLOAD_DIR", value_hint = ValueHint::DirPath)]
    pub download_dir: PathBuf,

    /// How many media items to download per subreddit
    #[arg(long, default_value_t = 3, env = "REDDIT_SCRAPER_POST_SEARCH_AMOUNT")]
    pub post_search_amount: u32,

    /// Maximum posts to request per subreddit or user listing
    #[arg(long, default_value_t = 100, env = "REDDIT_SCRAPER_SUBREDDIT_LIMIT")]
    #[validate(range(min = 1))]
    pub subreddit_limit: u32,

    /// Hard cap on the total number of posts inspected across the whole run
    #[arg(long, default_value_t = 100, env = "REDDIT_SCRAPER_SAFETY_LIMIT")]
    #[validate(range(min = 1))]
    pub safety_limit: u32,

    /// File extension to treat as downloadable media.
    ///
    /// Can be passed multiple times to build up the allow-list.
    /// Defaults to the usual image and video formats.
    #[arg(long = "media-format", value_name = "EXT")]
    pub media_formats: Vec<String>,

    /// Which Open Graph tag wins when a page carries both an
    /// `og:image` and an `og:video` tag
    #[arg(long, value_enum, default_value_t = OgPreference::Image, env = "REDDIT_SCRAPER_OG_PREFERENCE")]
    pub og_preference: OgPreference,
}

impl ScrapeConfig {
    /// The effective, lowercased allow-list.
    #[must_use]
    pub fn allowed_formats(&self) -> Vec<String> {
        if self.media_formats.is_empty() {
            DEFAULT_MEDIA_FORMATS.iter().map(ToString::to_string).collect()
        } else {
            self.media_formats
                .iter()
                .map(|x| x.trim_start_matches('.').to_lowercase())
                .collect()
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            subreddit_list: PathBuf::from("data/subreddits.txt"),
            user_list: None,
            download_dir: PathBuf::from("data/downloads"),
            post_search_amount: 3,
            subreddit_limit: 100,
            safety_limit: 100,
            media_formats: vec![],
            og_preference: OgPreference::Image,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OgPreference {
    #[default]
    Image,
    Video,
}

impl std::fmt::Display for OgPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = Some("Session options"))]
pub struct SessionConfig {
    /// Where to persist the authenticated session between runs.
    ///
    /// Defaults to `session.json` in the user config directory.
    /// Deleting the file forces re-authentication.
    #[arg(long, env = "REDDIT_SCRAPER_SESSION_FILE", value_hint = ValueHint::FilePath)]
    pub session_file: Option<PathBuf>,

    /// Drop any stored session and authenticate from scratch
    #[arg(long, default_value_t = false)]
    #[serde(skip)]
    pub force_reauth: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ValueEnum)]
pub enum DumpConfigType {
    Json,
    Toml,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[allow(clippy::option_option)]
#[clap(next_help_heading = Some("Run options"))]
pub struct RunConfig {
    /// Dump the config to stdout
    #[arg(long, value_enum, default_value = None)]
    pub dump_config: Option<Option<DumpConfigType>>,

    /// Dump shell completions to stdout
    #[arg(long, default_value = None, value_name = "SHELL", value_parser = hacky_dump_completions())]
    #[serde(skip)]
    pub dump_completions: Option<Shell>,
}

#[must_use]
pub fn hacky_dump_completions() -> impl clap::builder::TypedValueParser {
    move |s: &str| {
        let parsed = Shell::from_str(s, true);

        if let Ok(shell) = &parsed {
            clap_complete::generate(
                *shell,
                &mut CliArgs::command(),
                "reddit-scraper",
                &mut std::io::stdout(),
            );
            std::process::exit(0);
        }

        parsed
            .map(|_| ())
            .map_err(|_| ValidationError::new("Invalid shell"))
    }
}
