use serde::Deserialize;

/// One post out of a subreddit listing, reduced to what the pipeline needs.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: String,
    pub title: String,
    /// The post's outbound URL
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: ThingData,
}

#[derive(Debug, Deserialize)]
struct ThingData {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Parse a `/r/{sub}/new` listing body.
///
/// Self posts and anything else without an outbound http(s) URL are
/// dropped here so the pipeline only ever sees usable candidates.
pub fn submissions_from_json(body: &str) -> Result<Vec<Submission>, serde_json::Error> {
    let listing: Listing = serde_json::from_str(body)?;

    let submissions = listing
        .data
        .children
        .into_iter()
        .filter_map(|x| {
            let url = x
                .data
                .url
                .filter(|u| u.starts_with("http://") || u.starts_with("https://"))?;

            Some(Submission {
                id: x.data.id,
                title: x.data.title.unwrap_or_default(),
                url,
            })
        })
        .collect();

    Ok(submissions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "children": [
                {"kind": "t3", "data": {"id": "abc123", "title": "a pic", "url": "https://i.redd.it/abc123.jpg"}},
                {"kind": "t3", "data": {"id": "def456", "title": "self post", "url": "/r/pics/comments/def456/self_post/"}},
                {"kind": "t3", "data": {"id": "ghi789", "title": "no url"}}
            ]
        }
    }"#;

    #[test]
    fn keeps_only_outbound_urls() {
        let submissions = submissions_from_json(LISTING).expect("should parse");

        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].id, "abc123");
        assert_eq!(submissions[0].url, "https://i.redd.it/abc123.jpg");
    }

    #[test]
    fn empty_listing_is_fine() {
        let submissions =
            submissions_from_json(r#"{"kind": "Listing", "data": {"children": []}}"#)
                .expect("should parse");

        assert!(submissions.is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(submissions_from_json("<html></html>").is_err());
    }
}
