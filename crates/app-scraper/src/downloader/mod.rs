use std::path::{Path, PathBuf};

use app_helpers::{
    file_name::{sanitize_component, MAX_FILENAME_LENGTH},
    id::time_id,
};
use reqwest::{header, StatusCode};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};

use crate::common::{
    candidate::Candidate,
    request::{Client, RequestClient},
};
use crate::resolver::ResolvedMedia;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded(PathBuf),
    /// The target file already existed; treated as already-downloaded
    Skipped(PathBuf),
}

impl DownloadOutcome {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Downloaded(path) | Self::Skipped(path) => path,
        }
    }

    #[must_use]
    pub const fn is_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("failed to fetch media: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("media fetch returned {0}")]
    Status(StatusCode),
    #[error("media response body was empty")]
    EmptyBody,
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

/// Streams resolved media to disk.
///
/// Bodies go chunk-by-chunk into a `.part` file that is renamed into place
/// only on full success, so a failed download never leaves a truncated
/// file at the final path.
pub struct MediaDownloader {
    http: RequestClient,
}

impl MediaDownloader {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::base()?,
        })
    }

    pub async fn download(
        &self,
        media: &ResolvedMedia,
        candidate: &Candidate,
        dir: &Path,
    ) -> Result<DownloadOutcome, DownloadError> {
        fs::create_dir_all(dir).await?;

        let file_name = target_file_name(candidate, &media.extension);
        let final_path = dir.join(&file_name);

        if final_path.exists() {
            debug!(path = ?final_path, "File already exists, skipping download");
            return Ok(DownloadOutcome::Skipped(final_path));
        }

        let resp = self
            .http
            .get(media.url.clone())
            .header(header::ACCEPT, accept_header(&media.extension))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(DownloadError::Status(resp.status()));
        }

        let part_path = dir.join(format!("{file_name}.part"));

        debug!(path = ?part_path, "Writing to file");

        match write_body(resp, &part_path).await {
            Ok(0) => {
                let _ = fs::remove_file(&part_path).await;
                Err(DownloadError::EmptyBody)
            }
            Ok(written) => {
                if let Err(e) = fs::rename(&part_path, &final_path).await {
                    let _ = fs::remove_file(&part_path).await;
                    return Err(e.into());
                }

                info!(path = ?final_path, bytes = written, "Downloaded media");
                Ok(DownloadOutcome::Downloaded(final_path))
            }
            Err(e) => {
                let _ = fs::remove_file(&part_path).await;
                Err(e)
            }
        }
    }
}

async fn write_body(mut resp: reqwest::Response, path: &Path) -> Result<u64, DownloadError> {
    let mut out_file = fs::File::create(path).await?;
    let mut written = 0_u64;

    while let Some(chunk) = resp.chunk().await? {
        out_file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    out_file.flush().await?;

    Ok(written)
}

/// `{feed}-{post_id}.{ext}`, sanitized; time-based id when the
/// candidate's own parts sanitize to nothing.
fn target_file_name(candidate: &Candidate, extension: &str) -> String {
    // saturating: a configured format can be longer than the whole budget
    let max_stem_len = MAX_FILENAME_LENGTH.saturating_sub(1 + extension.len());

    let stem = sanitize_component(
        &format!("{}-{}", candidate.feed, candidate.post_id),
        max_stem_len,
    )
    .unwrap_or_else(time_id);

    format!("{stem}.{extension}")
}

fn accept_header(extension: &str) -> &'static str {
    match extension {
        "mp4" | "webm" | "mov" | "m4v" | "mkv" | "avi" => "video/*, */*",
        "gif" => "image/gif, image/*",
        _ => "image/*",
    }
}
