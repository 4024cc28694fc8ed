//! URL percent-encoding and query-string handling.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// RFC 3986 "unreserved" characters plus `/`, kept literal when encoding a
/// path so round-tripping a typical path doesn't escape every slash.
const PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-').remove(b'.').remove(b'_').remove(b'~').remove(b'/');

/// Same as `PATH_SET` but without `/`, used for query components where a
/// literal `/` still needs no escaping but `&`/`=`/`+` do.
const QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-').remove(b'.').remove(b'_').remove(b'~').remove(b'/');

/// Percent-decode a path segment. The path form does *not* treat `+` as
/// space (that rule is query-string only).
pub fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Percent-encode a decoded path back into wire form (used only where the
/// core needs to reconstruct a URL, e.g. directory-redirect `Location`
/// composition over an already-decoded subpath).
pub fn encode_path(decoded: &str) -> String {
    utf8_percent_encode(decoded, PATH_SET).to_string()
}

/// Percent-decode a query key or value, additionally mapping `+` to space
/// (`application/x-www-form-urlencoded` convention).
pub fn decode_query_component(raw: &str) -> String {
    let replaced: String = raw.chars()
        .map(|c| if c == '+' { ' ' } else { c })
        .collect();
    percent_decode_str(&replaced).decode_utf8_lossy().into_owned()
}

/// Percent-encode a query key or value, mapping space to `+`.
pub fn encode_query_component(decoded: &str) -> String {
    let mut out = String::with_capacity(decoded.len());
    for ch in decoded.chars() {
        if ch == ' ' {
            out.push('+');
        } else {
            let mut buf = [0u8; 4];
            out.push_str(&utf8_percent_encode(ch.encode_utf8(&mut buf), QUERY_SET).to_string());
        }
    }
    out
}

/// Parse a query string (without the leading `?`) into ordered,
/// duplicate-preserving key/value pairs. Empty segments between `&` are
/// skipped, e.g. `"&&a=1&"` yields `[("a", "1")]`.
pub fn parse_query(qs: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for segment in qs.split('&') {
        if segment.is_empty() {
            continue;
        }
        match segment.find('=') {
            Some(eq) => {
                let key = decode_query_component(&segment[..eq]);
                let value = decode_query_component(&segment[eq + 1..]);
                out.push((key, value));
            }
            None => {
                out.push((decode_query_component(segment), String::new()));
            }
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_basic() {
        assert_eq!(parse_query("a=1&b=&c=3"), vec![
            ("a".into(), "1".into()),
            ("b".into(), "".into()),
            ("c".into(), "3".into()),
        ]);
    }

    #[test]
    fn parse_skips_empty_segments() {
        assert_eq!(parse_query("&&a=1&"), vec![("a".into(), "1".into())]);
    }

    #[test]
    fn parse_missing_equals_is_empty_value() {
        assert_eq!(parse_query("flag"), vec![("flag".into(), "".into())]);
    }

    #[test]
    fn plus_is_space_in_query_only() {
        assert_eq!(decode_query_component("a+b"), "a b");
        assert_eq!(decode_path("a+b"), "a+b");
    }

    #[test]
    fn decode_encode_round_trip_query() {
        for raw in &["hello", "hello world", "a/b", "100%", "k=v"] {
            let encoded = encode_query_component(raw);
            assert_eq!(decode_query_component(&encoded), *raw);
        }
    }

    #[test]
    fn encode_decode_round_trip_on_encoded_subset() {
        let encoded = "hello+world%21%3D";
        assert_eq!(encode_query_component(&decode_query_component(encoded)), encoded);
    }

    #[test]
    fn path_decode() {
        assert_eq!(decode_path("/a%20b/c"), "/a b/c");
    }
}
