//! Escaped-fragment reconstruction.
//!
//! Crawlers following the AJAX-crawling convention request
//! `?_escaped_fragment_=<frag>` instead of the client-side `#!<frag>` route.
//! [`split`] reverses that substitution; [`escape`] performs it.
//!
//! # Data Flow
//! ```text
//! QueryMap
//!     → split(Decode) → "?k=v#!/frag"      (route and extension matching)
//!     → split(Encode) → "?k=v#!/frag"      (URL handed to the renderer)
//! ```

use std::borrow::Cow;
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::form_urlencoded;

use crate::detection::query::QueryMap;

/// Query parameter carrying the escaped hash-bang fragment.
pub const ESCAPED_FRAGMENT: &str = "_escaped_fragment_";

/// Prefix of a hash-bang fragment.
pub const HASH_BANG: &str = "#!";

/// Characters encoded in the fragment. Delimiters stay literal so nested
/// hash-bang routes keep their shape.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters encoded in a query key or value.
const COMPONENT: &AsciiSet = &FRAGMENT
    .add(b'#')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b'?');

/// Which representation [`split`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Plain text, for matching against route patterns.
    Decode,
    /// Percent-encoded, for handing to an HTTP client.
    Encode,
}

impl Direction {
    fn apply<'a>(self, input: &'a str, set: &'static AsciiSet) -> Cow<'a, str> {
        match self {
            Direction::Decode => Cow::Borrowed(input),
            Direction::Encode => utf8_percent_encode(input, set).into(),
        }
    }
}

/// The query string and hash fragment a crawler actually means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealLocation {
    /// `?k=v&...`, or empty.
    pub query: String,
    /// `#!fragment`, or empty.
    pub hash: String,
}

impl fmt::Display for RealLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.query, self.hash)
    }
}

/// Rebuild the real query string and hash fragment from a parsed query.
///
/// Every value of every ordinary key becomes a `key=value` pair. Non-empty
/// values of [`ESCAPED_FRAGMENT`] are concatenated into the fragment. With
/// [`Direction::Encode`] each key and value is encoded on its own, so
/// delimiters inside values cannot change the URL's structure.
pub fn split(query: &QueryMap, direction: Direction) -> RealLocation {
    let mut pairs = Vec::new();
    let mut fragment = String::new();

    for (key, values) in query.iter() {
        if key == ESCAPED_FRAGMENT {
            values
                .iter()
                .filter(|v| !v.is_empty())
                .for_each(|v| fragment.push_str(v));
            continue;
        }
        let key = direction.apply(key, COMPONENT);
        pairs.extend(
            values
                .iter()
                .map(|v| format!("{key}={}", direction.apply(v, COMPONENT))),
        );
    }

    let query = if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    };
    let hash = if fragment.is_empty() {
        String::new()
    } else {
        format!("{HASH_BANG}{}", direction.apply(&fragment, FRAGMENT))
    };

    RealLocation { query, hash }
}

/// Turn a hash-bang location into the query string a crawler would request.
///
/// Takes the encoded form produced by [`split`]. Keys and values are
/// percent-decoded after the query is split on its delimiters, then
/// form-encoded again.
pub fn escape(query: &str, hash: &str) -> String {
    let query = query.strip_prefix('?').unwrap_or(query);
    let hash = hash.strip_prefix('#').unwrap_or(hash);
    let hash = hash.strip_prefix('!').unwrap_or(hash);
    let fragment = percent_decode_str(hash).decode_utf8_lossy();

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        serializer.append_pair(
            &percent_decode_str(key).decode_utf8_lossy(),
            &percent_decode_str(value).decode_utf8_lossy(),
        );
    }
    serializer.append_pair(ESCAPED_FRAGMENT, &fragment);
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_query_has_no_fragment() {
        let query = QueryMap::parse("a=1&b=2&a=3");
        let location = split(&query, Direction::Decode);
        assert_eq!(location.query, "?a=1&a=3&b=2");
        assert_eq!(location.hash, "");
    }

    #[test]
    fn test_fragment_is_moved_to_hash_bang() {
        let query = QueryMap::parse("key1=value1&_escaped_fragment_=%2Fpath%2Fto");
        let location = split(&query, Direction::Decode);
        assert_eq!(location.to_string(), "?key1=value1#!/path/to");
    }

    #[test]
    fn test_empty_fragment_leaves_nothing() {
        let query = QueryMap::parse("_escaped_fragment_=");
        let location = split(&query, Direction::Encode);
        assert_eq!(location, RealLocation::default());
        assert_eq!(location.to_string(), "");
    }

    #[test]
    fn test_encode_keeps_delimiters() {
        let query = QueryMap::parse("q=a+b&_escaped_fragment_=%2Fcaf%C3%A9%3Fx%3D1");
        let location = split(&query, Direction::Encode);
        assert_eq!(location.query, "?q=a%20b");
        assert_eq!(location.hash, "#!/caf%C3%A9?x=1");
    }

    #[test]
    fn test_decode_and_encode_agree() {
        let query = QueryMap::parse("name=J%C3%BCrgen&_escaped_fragment_=%2Fhome");
        let encoded = split(&query, Direction::Encode).to_string();
        let decoded = split(&query, Direction::Decode).to_string();
        assert_eq!(
            percent_decode_str(&encoded).decode_utf8_lossy(),
            decoded.as_str()
        );
    }

    #[test]
    fn test_escape_round_trip() {
        let original = QueryMap::parse(
            "key=value&_escaped_fragment_=%2Fpath1%3Fkey1%3Dvalue1%23!%2Fpath2%3Fkey2%3Dvalue2",
        );
        let first = split(&original, Direction::Encode);
        assert_eq!(first.query, "?key=value");
        assert_eq!(first.hash, "#!/path1?key1=value1#!/path2?key2=value2");

        let escaped = escape(&first.query, &first.hash);
        let second = split(&QueryMap::parse(&escaped), Direction::Encode);
        assert_eq!(first, second);
        assert_eq!(
            split(&QueryMap::parse(&escaped), Direction::Decode),
            split(&original, Direction::Decode)
        );
    }

    #[test]
    fn test_encode_escapes_delimiters_in_values() {
        let query =
            QueryMap::parse("q=a%26b%3Dc&tag=%23top&plus=1%2B1&_escaped_fragment_=%2Fx");
        let location = split(&query, Direction::Encode);
        assert_eq!(location.query, "?q=a%26b%3Dc&tag=%23top&plus=1%2B1");
        assert_eq!(location.hash, "#!/x");

        let decoded = split(&query, Direction::Decode);
        assert_eq!(decoded.query, "?q=a&b=c&tag=#top&plus=1+1");
    }

    #[test]
    fn test_delimiters_in_values_survive_round_trip() {
        let first = split(&QueryMap::parse("q=a%26b&_escaped_fragment_=%2Fx"), Direction::Encode);
        assert_eq!(first.query, "?q=a%26b");

        let escaped = escape(&first.query, &first.hash);
        let again = split(&QueryMap::parse(&escaped), Direction::Encode);
        assert_eq!(first, again);
    }

    #[test]
    fn test_escape_without_query() {
        assert_eq!(escape("", "#!/about"), "_escaped_fragment_=%2Fabout");
        assert_eq!(escape("", ""), "_escaped_fragment_=");
    }
}
