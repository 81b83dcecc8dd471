/// A submission's outbound URL plus the feed it came from.
///
/// The feed is a subreddit or user name; it prefixes the downloaded
/// filename. Produced by the post source, consumed by the resolver, and
/// discarded after resolution.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub feed: String,
    pub post_id: String,
    pub url: String,
}

impl Candidate {
    #[must_use]
    pub fn new<F, P, U>(feed: F, post_id: P, url: U) -> Self
    where
        F: Into<String>,
        P: Into<String>,
        U: Into<String>,
    {
        Self {
            feed: feed.into(),
            post_id: post_id.into(),
            url: url.into(),
        }
    }
}
