//! JSON content, gated behind the `json` feature.
//!
//! Serialization happens once, eagerly, into an owned buffer rather than a
//! true incremental fill: `serde_json` has no API to resume serialization
//! mid-value, so there's no way to honor a fill budget smaller than the
//! whole document short of writing a custom `Serializer`.

use serde::Serialize;

use super::ContentSource;

/// Serialize `value` into content ready for `Response::set_content`, paired
/// with its exact byte length.
pub fn json_content<T: Serialize>(value: &T) -> Result<(ContentSource, u64), serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    let len = bytes.len() as u64;
    Ok((ContentSource::owned(bytes), len))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn serializes_to_owned_content_with_matching_length() {
        let (mut content, len) = json_content(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(len, 7);
        let mut buf = [0u8; 7];
        assert_eq!(content.fill(&mut buf), 7);
        assert_eq!(&buf, b"{\"a\":1}");
    }
}
