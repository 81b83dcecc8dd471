use std::collections::HashSet;

use app_config::common::OgPreference;
use app_helpers::extension::{normalize_extension, url_extension};
use reqwest::{header, StatusCode};
use tracing::{debug, trace};
use url::Url;

use crate::common::{
    candidate::Candidate,
    request::{Client, RequestClient},
};

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml";

/// A final, directly-fetchable URL with an allow-listed extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub url: Url,
    pub extension: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("candidate url is invalid: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to fetch page: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("page fetch returned {0}")]
    Status(StatusCode),
    #[error("failed to parse page html: {0}")]
    Parse(String),
}

/// Classifies a submission URL as directly downloadable media, or falls
/// back to fetching the page and reading its Open Graph media tags.
///
/// `Ok(None)` means the candidate carries no supported media; that's a
/// normal outcome, distinct from the transient failures in [`ResolveError`].
pub struct MediaResolver {
    http: RequestClient,
    formats: HashSet<String>,
    preference: OgPreference,
}

impl MediaResolver {
    pub fn new<T, I>(formats: T, preference: OgPreference) -> Result<Self, reqwest::Error>
    where
        T: IntoIterator<Item = I>,
        I: AsRef<str>,
    {
        Ok(Self {
            http: Client::base()?,
            formats: formats
                .into_iter()
                .map(|x| normalize_extension(x.as_ref()))
                .collect(),
            preference,
        })
    }

    pub async fn resolve(
        &self,
        candidate: &Candidate,
    ) -> Result<Option<ResolvedMedia>, ResolveError> {
        let url = Url::parse(&candidate.url)?;

        if let Some(extension) = self.allowed_extension(&url) {
            trace!(%url, extension, "Direct media url");
            return Ok(Some(ResolvedMedia { url, extension }));
        }

        self.resolve_embedded(&url).await
    }

    async fn resolve_embedded(
        &self,
        page_url: &Url,
    ) -> Result<Option<ResolvedMedia>, ResolveError> {
        debug!(%page_url, "No direct extension match, inspecting page");

        let resp = self
            .http
            .get(page_url.clone())
            .header(header::ACCEPT, HTML_ACCEPT)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ResolveError::Status(resp.status()));
        }

        let body = resp.text().await?;
        let tags = og_media_tags(&body).map_err(ResolveError::Parse)?;

        trace!(?tags, "Parsed og tags");

        Ok(self.pick_media(page_url, &tags))
    }

    fn pick_media(&self, page_url: &Url, tags: &OgMediaTags) -> Option<ResolvedMedia> {
        let ordered = match self.preference {
            OgPreference::Image => [
                (MediaKind::Image, tags.image.as_deref()),
                (MediaKind::Video, tags.video.as_deref()),
            ],
            OgPreference::Video => [
                (MediaKind::Video, tags.video.as_deref()),
                (MediaKind::Image, tags.image.as_deref()),
            ],
        };

        for (kind, content) in ordered {
            let Some(content) = content else {
                continue;
            };

            let Some(url) = resolve_embedded_url(page_url, content) else {
                continue;
            };

            let extension = self.allowed_extension(&url).or_else(|| {
                // og:video tags habitually point at extensionless URLs
                if kind == MediaKind::Video
                    && url_extension(&url).is_none()
                    && self.formats.contains("mp4")
                {
                    Some("mp4".to_string())
                } else {
                    None
                }
            });

            if let Some(extension) = extension {
                return Some(ResolvedMedia { url, extension });
            }
        }

        None
    }

    fn allowed_extension(&self, url: &Url) -> Option<String> {
        url_extension(url)
            .map(|x| normalize_extension(&x))
            .filter(|x| self.formats.contains(x))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct OgMediaTags {
    pub image: Option<String>,
    pub video: Option<String>,
}

/// Pull the first `og:image` and `og:video` meta tags out of a page.
pub fn og_media_tags(html: &str) -> Result<OgMediaTags, String> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|e| format!("Failed to parse html: {:?}", e))?;
    let parser = dom.parser();

    let metas = dom
        .query_selector("meta")
        .ok_or_else(|| "Failed to parse query selector".to_string())?;

    let mut tags = OgMediaTags::default();

    for tag in metas
        .filter_map(|x| x.get(parser))
        .filter_map(|x| x.as_tag())
    {
        let attributes = tag.attributes();

        let property = attributes
            .get("property")
            .flatten()
            .map(|x| x.as_utf8_str());
        let content = attributes.get("content").flatten().map(|x| x.as_utf8_str());

        match (property.as_deref(), content) {
            (Some("og:image"), Some(c)) if tags.image.is_none() => {
                tags.image = Some(c.to_string());
            }
            (Some("og:video"), Some(c)) if tags.video.is_none() => {
                tags.video = Some(c.to_string());
            }
            _ => {}
        }
    }

    Ok(tags)
}

fn resolve_embedded_url(page_url: &Url, content: &str) -> Option<Url> {
    let content = content.trim();

    if content.is_empty() {
        return None;
    }

    // Resolves relative and protocol-relative content against the page
    page_url.join(content).ok()
}
