//! File extension extraction from a decoded request path.
//!
//! # Responsibilities
//! - Locate the last `/{file}.{ext}` segment of the path proper
//! - Ignore anything after the first `?` (query) or `#` (fragment)
//!
//! # Design Decisions
//! - Only the final dot counts: `/a/b.tar.gz` yields `gz`
//! - `/{file}` needs at least one character before the dot, so dotfiles
//!   such as `/.htaccess` carry no extension
//! - A segment may be followed by further segments: `/v1.2/page` yields `2`

/// Characters that terminate a path segment.
const SEGMENT_END: [char; 3] = ['/', '?', '#'];

/// Extract the file extension of the resource a path points at, if any.
///
/// The extension comes from the rightmost `/` that precedes the first `?`,
/// `#` or line break and is followed by a segment holding a dot with
/// characters on both sides.
pub fn extract_extension(path: &str) -> Option<&str> {
    let boundary = path.find(['?', '#', '\n']).unwrap_or(path.len());

    path[..boundary]
        .match_indices('/')
        .rev()
        .find_map(|(slash, _)| {
            let rest = &path[slash + 1..];
            let end = rest.find(SEGMENT_END).unwrap_or(rest.len());
            segment_extension(&rest[..end])
        })
}

fn segment_extension(segment: &str) -> Option<&str> {
    let bytes = segment.as_bytes();
    (1..bytes.len().saturating_sub(1))
        .rev()
        .find(|&i| bytes[i] == b'.')
        .map(|i| &segment[i + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_extension() {
        assert_eq!(extract_extension("/file.mp3"), Some("mp3"));
        assert_eq!(extract_extension("/dir/index.HTML"), Some("HTML"));
    }

    #[test]
    fn test_only_last_suffix_counts() {
        assert_eq!(extract_extension("/a/b.tar.gz"), Some("gz"));
    }

    #[test]
    fn test_last_segment_with_extension_wins() {
        assert_eq!(extract_extension("/one.txt/two.png"), Some("png"));
        assert_eq!(extract_extension("/v1.2/page"), Some("2"));
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(extract_extension("/"), None);
        assert_eq!(extract_extension("/about/team"), None);
        assert_eq!(extract_extension("/.htaccess"), None);
        assert_eq!(extract_extension("/trailing."), None);
        assert_eq!(extract_extension(""), None);
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        assert_eq!(extract_extension("/page?file=/song.mp3"), None);
        assert_eq!(extract_extension("/?q=1.5"), None);
        assert_eq!(extract_extension("/app#!/assets/logo.png"), None);
        assert_eq!(extract_extension("/report.pdf?download=/x.html"), Some("pdf"));
        assert_eq!(extract_extension("/index.html?v=1.2.3"), Some("html"));
    }

    #[test]
    fn test_dots_inside_file_name() {
        assert_eq!(extract_extension("/a.b."), Some("b."));
        assert_eq!(extract_extension("/jquery.min.js"), Some("js"));
    }

    #[test]
    fn test_unicode_segment() {
        assert_eq!(extract_extension("/café.html"), Some("html"));
        assert_eq!(extract_extension("/naïve.ünï"), Some("ünï"));
    }
}
