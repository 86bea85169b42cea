//! Delimited URL lists
//!
//! Ordered image references are persisted as a single text column, joined
//! with [`URL_SEPARATOR`]. The helpers here are the only place that encoding
//! lives, so the store and the API agree on it.

use url::Url;

use crate::error::{CommonError, Result};

/// Separator between entries in a persisted URL list.
pub const URL_SEPARATOR: &str = ", ";

/// Join an ordered list of URLs into one text field.
pub fn join_urls(urls: &[String]) -> String {
    urls.join(URL_SEPARATOR)
}

/// Split a persisted URL list back into its entries.
///
/// An empty field decodes to an empty list.
pub fn split_urls(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(URL_SEPARATOR).map(str::to_string).collect()
}

/// Derive a file name from the last non-empty path segment of a URL.
///
/// The segment is returned as it appears in the URL path (percent-encoding
/// is not undone). Query strings and fragments are ignored.
pub fn file_name_from_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)?;

    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| CommonError::NoFileName(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_preserves_order() {
        let urls = vec!["u1".to_string(), "u2".to_string(), "u3".to_string()];
        assert_eq!(join_urls(&urls), "u1, u2, u3");
    }

    #[test]
    fn test_join_empty() {
        assert_eq!(join_urls(&[]), "");
    }

    #[test]
    fn test_split_round_trip() {
        let urls = vec!["http://x/a.png".to_string(), "http://x/b.png".to_string()];
        assert_eq!(split_urls(&join_urls(&urls)), urls);
    }

    #[test]
    fn test_split_empty_field() {
        assert!(split_urls("").is_empty());
    }

    #[test]
    fn test_file_name_simple() {
        assert_eq!(file_name_from_url("http://x/a.png").unwrap(), "a.png");
    }

    #[test]
    fn test_file_name_nested_with_query() {
        let name = file_name_from_url("https://cdn.example.com/img/2024/shoe.jpg?w=200#top").unwrap();
        assert_eq!(name, "shoe.jpg");
    }

    #[test]
    fn test_file_name_trailing_slash() {
        assert_eq!(file_name_from_url("http://x/images/shoe/").unwrap(), "shoe");
    }

    #[test]
    fn test_file_name_keeps_percent_encoding() {
        assert_eq!(file_name_from_url("http://x/a%20b.png").unwrap(), "a%20b.png");
    }

    #[test]
    fn test_file_name_root_path() {
        assert!(matches!(
            file_name_from_url("http://x/"),
            Err(CommonError::NoFileName(_))
        ));
    }

    #[test]
    fn test_file_name_invalid_url() {
        assert!(matches!(
            file_name_from_url("not a url"),
            Err(CommonError::InvalidUrl(_))
        ));
    }
}
