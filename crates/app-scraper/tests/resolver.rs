use app_config::common::OgPreference;
use app_scraper::{Candidate, MediaResolver, ResolveError};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn resolver() -> MediaResolver {
    MediaResolver::new(["jpg", "jpeg", "png", "gif", "mp4"], OgPreference::Image)
        .expect("resolver should build")
}

#[tokio::test]
async fn direct_media_urls_skip_the_html_fetch() {
    let server = MockServer::start().await;

    // The resolver must classify by extension alone; any request here is a bug
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let url = format!("{}/photo.jpg?x=1", server.uri());
    let candidate = Candidate::new("pics", "abc123", &url);

    let resolved = resolver()
        .resolve(&candidate)
        .await
        .expect("should resolve")
        .expect("should find media");

    assert_eq!(resolved.url.as_str(), url);
    assert_eq!(resolved.extension, "jpg");
}

#[tokio::test]
async fn html_fallback_extracts_the_og_image() {
    let server = MockServer::start().await;

    let html = r#"<html><head>
        <meta property="og:image" content="https://cdn.example.com/img/abc.png">
    </head><body>gallery</body></html>"#;

    Mock::given(method("GET"))
        .and(path("/gallery/item42"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(1)
        .mount(&server)
        .await;

    let candidate = Candidate::new("pics", "abc123", format!("{}/gallery/item42", server.uri()));

    let resolved = resolver()
        .resolve(&candidate)
        .await
        .expect("should resolve")
        .expect("should find media");

    assert_eq!(resolved.url.as_str(), "https://cdn.example.com/img/abc.png");
    assert_eq!(resolved.extension, "png");
}

#[tokio::test]
async fn pages_without_og_media_yield_no_media() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><head></head></html>"))
        .mount(&server)
        .await;

    let candidate = Candidate::new("pics", "abc123", format!("{}/post", server.uri()));

    let resolved = resolver().resolve(&candidate).await.expect("should resolve");

    assert!(resolved.is_none());
}

#[tokio::test]
async fn failed_page_fetches_are_transient_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let candidate = Candidate::new("pics", "abc123", format!("{}/post", server.uri()));

    let err = resolver()
        .resolve(&candidate)
        .await
        .expect_err("should fail");

    assert!(matches!(err, ResolveError::Status(s) if s.as_u16() == 404));
}
