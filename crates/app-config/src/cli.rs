use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};

use crate::common;

/// Authenticates against Reddit, walks the newest posts of the configured
/// subreddits, and downloads any media it can resolve from them.
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[clap(disable_help_flag = true)]
pub struct CliArgs {
    /// Print help
    #[clap(action = ArgAction::Help, long)]
    help: Option<bool>,

    #[command(flatten)]
    pub run: common::RunConfig,

    #[command(flatten)]
    pub scrape: common::ScrapeConfig,

    #[command(flatten)]
    pub session: common::SessionConfig,
}
