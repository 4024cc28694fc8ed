//! Basic and Digest (RFC 2617, `qop=auth`) authentication primitives.

use std::collections::HashMap;
use std::fmt::Write as _;

use base64::Engine;
use md5::{Digest, Md5};
use rand::Rng;

fn hex_md5(data: &[u8]) -> String {
    let digest = Md5::digest(data);
    let mut out = String::with_capacity(32);
    for byte in digest {
        write!(out, "{:02x}", byte).unwrap();
    }
    out
}

fn random_hex_md5() -> String {
    let r: u32 = rand::thread_rng().gen();
    hex_md5(&r.to_le_bytes())
}

/// `hash` is the payload of an `Authorization: Basic <hash>` header.
/// Equivalent to `base64("username:password") == hash`.
pub fn check_basic(hash: &str, username: &str, password: &str) -> bool {
    let expected = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", username, password));
    expected == hash
}

/// `HA1` used by digest auth when the stored credential is the plaintext
/// password: `MD5(username:realm:password)`.
pub fn digest_ha1(username: &str, realm: &str, password: &str) -> String {
    hex_md5(format!("{}:{}:{}", username, realm, password).as_bytes())
}

/// Build the `WWW-Authenticate` challenge header value for a realm:
/// `realm="...", qop="auth", nonce="...", opaque="..."`.
pub fn digest_challenge(realm: &str) -> String {
    format!(
        "realm=\"{}\", qop=\"auth\", nonce=\"{}\", opaque=\"{}\"",
        realm, random_hex_md5(), random_hex_md5())
}

/// Parse a `key=value` (optionally quoted) comma-separated `Authorization`
/// payload, as produced by a Digest auth client in response to
/// `digest_challenge`.
fn parse_digest_fields(payload: &str) -> HashMap<&str, &str> {
    let mut out = HashMap::new();
    for field in payload.split(',') {
        let field = field.trim();
        let Some(eq) = field.find('=') else { continue };
        let key = field[..eq].trim();
        let mut value = field[eq + 1..].trim();
        if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
            value = &value[1..value.len() - 1];
        }
        out.insert(key, value);
    }
    out
}

/// Verify a Digest `Authorization` payload against an expected identity.
///
/// `ha1` is used directly as the stored credential, however the caller
/// derived it — `digest_ha1(...)` from a plaintext password, or a
/// pre-hashed value loaded from storage; this function treats both
/// identically. `nonce`/`opaque`, when `Some`, must match exactly
/// (replay/binding check); `None` accepts any value, useful for
/// stateless deployments that don't track issued nonces.
pub fn check_digest(
    payload: &str,
    method: &str,
    username: &str,
    ha1: &str,
    nonce: Option<&str>,
    opaque: Option<&str>,
) -> bool {
    let fields = parse_digest_fields(payload);
    let get = |k: &str| fields.get(k).copied();

    if get("username") != Some(username) {
        return false;
    }
    if let Some(expect) = nonce {
        if get("nonce") != Some(expect) {
            return false;
        }
    }
    if let Some(expect) = opaque {
        if get("opaque") != Some(expect) {
            return false;
        }
    }
    let (Some(uri), Some(resp), Some(qop), Some(nc), Some(cnonce), Some(field_nonce)) =
        (get("uri"), get("response"), get("qop"), get("nc"), get("cnonce"), get("nonce"))
    else {
        return false;
    };

    let ha2 = hex_md5(format!("{}:{}", method, uri).as_bytes());
    let expected = hex_md5(
        format!("{}:{}:{}:{}:{}:{}", ha1, field_nonce, nc, cnonce, qop, ha2).as_bytes());
    expected == resp
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic_round_trip() {
        let hash = base64::engine::general_purpose::STANDARD.encode("alice:secret");
        assert!(check_basic(&hash, "alice", "secret"));
        assert!(!check_basic(&hash, "alice", "wrong"));
    }

    #[test]
    fn digest_challenge_has_expected_shape() {
        let challenge = digest_challenge("ESP8266");
        assert!(challenge.contains("realm=\"ESP8266\""));
        assert!(challenge.contains("qop=\"auth\""));
        assert!(challenge.contains("nonce=\""));
        assert!(challenge.contains("opaque=\""));
    }

    #[test]
    fn digest_round_trip() {
        let ha1 = digest_ha1("alice", "ESP8266", "secret");
        let ha2 = hex_md5(b"GET:/private");
        let nonce = "abc123";
        let cnonce = "xyz789";
        let nc = "00000001";
        let qop = "auth";
        let response = hex_md5(
            format!("{}:{}:{}:{}:{}:{}", ha1, nonce, nc, cnonce, qop, ha2).as_bytes());
        let payload = format!(
            "username=\"alice\", realm=\"ESP8266\", nonce=\"{}\", uri=\"/private\", \
             qop={}, nc={}, cnonce=\"{}\", response=\"{}\"",
            nonce, qop, nc, cnonce, response);
        assert!(check_digest(&payload, "GET", "alice", &ha1, Some(nonce), None));
        assert!(!check_digest(&payload, "GET", "alice", &ha1, Some("other"), None));
    }
}
