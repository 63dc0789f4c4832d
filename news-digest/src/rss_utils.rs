//! Text and URL helpers shared by the source adapters.

/// Summaries longer than this many characters are cut and get an ellipsis.
pub const MAX_SUMMARY_CHARS: usize = 200;

/// Text utilities for feed and page content
pub mod text {
    use super::MAX_SUMMARY_CHARS;
    use scraper::Html;

    /// Extract the visible text of an HTML fragment, joining text nodes with a
    /// single space.
    pub fn strip_html(html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        fragment
            .root_element()
            .text()
            .flat_map(|chunk| chunk.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Cut `text` to `max_chars` characters, appending `...` when anything was
    /// removed.
    pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
            None => text.to_string(),
        }
    }

    /// Strip markup and bound the length of a summary.
    pub fn summarize(html: &str) -> String {
        truncate_with_ellipsis(&strip_html(html), MAX_SUMMARY_CHARS)
    }
}

/// URL utilities for source endpoints
pub mod url {
    use url::Url;

    /// Append one path segment to `base`, percent-encoding it as needed.
    pub fn join_segment(base: &str, segments: &[&str]) -> Result<String, url::ParseError> {
        let mut url = Url::parse(base)?;
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url.to_string())
    }

    /// Validate feed URL format
    pub fn is_valid_http_url(url_str: &str) -> bool {
        if let Ok(url) = Url::parse(url_str) {
            url.scheme() == "http" || url.scheme() == "https"
        } else {
            false
        }
    }
}
