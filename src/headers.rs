//! Predicates over raw (not yet validated UTF-8) header values.
//!
//! `Connection`, `Transfer-Encoding` and `Expect` are all comma-separated
//! lists in general, so these scan case-insensitively for the token rather
//! than requiring it to be the only value present.

fn contains_token_ci(haystack: &[u8], token: &[u8]) -> bool {
    if token.is_empty() || haystack.len() < token.len() {
        return false;
    }
    haystack.windows(token.len()).any(|w| w.eq_ignore_ascii_case(token))
}

/// `Connection` header contains the `close` token.
pub fn is_close(val: &[u8]) -> bool {
    contains_token_ci(val, b"close")
}

/// `Connection` header contains the `keep-alive` token.
pub fn is_keepalive(val: &[u8]) -> bool {
    contains_token_ci(val, b"keep-alive")
}

/// Last comma-separated value of `Transfer-Encoding` is `chunked`
/// (RFC 7230 §3.3.1: only the last coding on the list determines framing).
pub fn is_chunked(val: &[u8]) -> bool {
    let last = val.rsplit(|&b| b == b',').next().unwrap_or(val);
    let trimmed = trim_ascii(last);
    trimmed.eq_ignore_ascii_case(b"chunked")
}

/// `Expect` header contains the `100-continue` token.
pub fn is_continue(val: &[u8]) -> bool {
    contains_token_ci(val, b"100-continue")
}

fn trim_ascii(mut val: &[u8]) -> &[u8] {
    while let [b' ', rest @ ..] | [b'\t', rest @ ..] = val {
        val = rest;
    }
    while let [rest @ .., b' '] | [rest @ .., b'\t'] = val {
        val = rest;
    }
    val
}
