use unicode_segmentation::UnicodeSegmentation;

pub const MAX_FILENAME_LENGTH: usize = 120;

/// Strip control characters and path-hostile characters from a filename
/// component, truncating to `max_len` graphemes.
///
/// Returns `None` when nothing usable is left.
#[must_use]
pub fn sanitize_component(name: &str, max_len: usize) -> Option<String> {
    let trunc = name
        .graphemes(true)
        .filter(|x| !x.chars().all(char::is_control))
        .filter(|x| !x.contains(['\\', '/', ':', '*', '?', '"', '<', '>', '|']))
        .take(max_len)
        .collect::<String>();

    if trunc.is_empty() {
        None
    } else {
        Some(trunc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_plain_names_through() {
        assert_eq!(sanitize_component("pics-abc123", 120), Some("pics-abc123".to_string()));
    }

    #[test]
    fn strips_hostile_characters() {
        assert_eq!(sanitize_component("a/b\\c:d", 120), Some("abcd".to_string()));
    }

    #[test]
    fn truncates_long_names() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_component(&long, 10), Some("x".repeat(10)));
    }

    #[test]
    fn rejects_names_with_nothing_left() {
        assert_eq!(sanitize_component("///", 120), None);
        assert_eq!(sanitize_component("", 120), None);
    }
}
