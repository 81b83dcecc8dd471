use std::path::Path;

use url::Url;

/// Alias pairs that are normalized before the allow-list check
pub const EXTENSION_ALIASES: &[(&str, &str)] = &[("jpeg", "jpg"), ("tiff", "tif")];

/// Normalize an extension to its canonical, lowercased form.
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim_start_matches('.').to_lowercase();

    EXTENSION_ALIASES
        .iter()
        .find(|(from, _)| *from == ext)
        .map_or(ext, |(_, to)| (*to).to_string())
}

/// Extension of a URL's *path* component, lowercased.
///
/// Query strings and fragments never count towards the extension:
/// `https://example.com/a.jpg?x=1#frag` yields `jpg`.
#[must_use]
pub fn url_extension(url: &Url) -> Option<String> {
    let ext = Path::new(url.path())
        .extension()?
        .to_string_lossy()
        .to_lowercase();

    if ext.is_empty() || !ext.chars().all(char::is_alphanumeric) {
        return None;
    }

    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(url: &str) -> Url {
        Url::parse(url).expect("test url should parse")
    }

    #[test]
    fn extension_ignores_query_and_fragment() {
        assert_eq!(
            url_extension(&parsed("https://example.com/photo.jpg?x=1")),
            Some("jpg".to_string())
        );
        assert_eq!(
            url_extension(&parsed("https://example.com/clip.mp4#t=3")),
            Some("mp4".to_string())
        );
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(
            url_extension(&parsed("https://example.com/photo.JPG")),
            Some("jpg".to_string())
        );
    }

    #[test]
    fn no_extension_on_bare_paths() {
        assert_eq!(url_extension(&parsed("https://example.com/gallery/item42")), None);
        assert_eq!(url_extension(&parsed("https://example.com/")), None);
        assert_eq!(url_extension(&parsed("https://example.com/file.")), None);
    }

    #[test]
    fn aliases_normalize() {
        assert_eq!(normalize_extension("JPEG"), "jpg");
        assert_eq!(normalize_extension(".tiff"), "tif");
        assert_eq!(normalize_extension("png"), "png");
    }
}
