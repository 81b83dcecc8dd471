use app_scraper::{Candidate, DownloadError, MediaDownloader, ResolvedMedia};
use url::Url;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn media_for(server: &MockServer, file: &str, extension: &str) -> ResolvedMedia {
    ResolvedMedia {
        url: Url::parse(&format!("{}/{file}", server.uri())).expect("url"),
        extension: extension.to_string(),
    }
}

fn candidate() -> Candidate {
    Candidate::new("pics", "abc123", "https://example.com/post")
}

fn dir_entries(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|x| x.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn streams_media_to_the_final_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/media/abc.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake image bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let downloader = MediaDownloader::new().expect("downloader should build");

    let outcome = downloader
        .download(&media_for(&server, "media/abc.jpg", "jpg"), &candidate(), dir.path())
        .await
        .expect("should download");

    assert!(outcome.is_downloaded());
    assert_eq!(outcome.path(), dir.path().join("pics-abc123.jpg"));

    let content = std::fs::read(outcome.path()).expect("file should exist");
    assert_eq!(content, b"fake image bytes");

    // No leftover partial file
    assert_eq!(dir_entries(dir.path()), vec!["pics-abc123.jpg"]);
}

#[tokio::test]
async fn existing_files_are_not_refetched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let existing = dir.path().join("pics-abc123.jpg");
    std::fs::write(&existing, b"from an earlier run").expect("write");

    let downloader = MediaDownloader::new().expect("downloader should build");

    let outcome = downloader
        .download(&media_for(&server, "media/abc.jpg", "jpg"), &candidate(), dir.path())
        .await
        .expect("should skip");

    assert!(!outcome.is_downloaded());
    assert_eq!(outcome.path(), existing);

    let content = std::fs::read(&existing).expect("file should exist");
    assert_eq!(content, b"from an earlier run");
}

#[tokio::test]
async fn failed_fetches_leave_nothing_behind() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let downloader = MediaDownloader::new().expect("downloader should build");

    let err = downloader
        .download(&media_for(&server, "media/abc.jpg", "jpg"), &candidate(), dir.path())
        .await
        .expect_err("should fail");

    assert!(matches!(err, DownloadError::Status(s) if s.as_u16() == 500));
    assert!(dir_entries(dir.path()).is_empty());
}

#[tokio::test]
async fn empty_bodies_are_rejected_and_cleaned_up() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::new()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let downloader = MediaDownloader::new().expect("downloader should build");

    let err = downloader
        .download(&media_for(&server, "media/abc.jpg", "jpg"), &candidate(), dir.path())
        .await
        .expect_err("should fail");

    assert!(matches!(err, DownloadError::EmptyBody));
    assert!(dir_entries(dir.path()).is_empty());
}
