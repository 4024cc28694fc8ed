//! Content sources a `Response` can pump from, as a tagged sum type
//! rather than a trait-object hierarchy per source kind.

use std::fs::File;
use std::io::Read;

/// Where a response's body bytes come from. All variants are driven
/// through the same `fill(dst) -> bytes_written` call from the pump.
pub enum ContentSource {
    /// No body at all (status+headers only).
    Empty,
    /// An owned, fully in-memory buffer (covers both the "string
    /// reference" and "progmem pointer+len" cases: both are just bytes
    /// with no further allocation needed to serve them).
    Owned { bytes: Vec<u8>, pos: usize },
    /// A filesystem file, read incrementally.
    File { file: File },
    /// An arbitrary byte stream (anything implementing `Read`).
    Stream { stream: Box<dyn Read> },
    /// A caller-supplied generator invoked once per fill with the
    /// destination slice; returns 0 to signal completion. Used by the
    /// callback response type and by JSON serialization.
    Callback { fill: Box<dyn FnMut(&mut [u8]) -> usize> },
}

impl ContentSource {
    pub fn owned(bytes: Vec<u8>) -> ContentSource {
        ContentSource::Owned { bytes, pos: 0 }
    }

    pub fn file(file: File) -> ContentSource {
        ContentSource::File { file }
    }

    pub fn stream(stream: Box<dyn Read>) -> ContentSource {
        ContentSource::Stream { stream }
    }

    pub fn callback(fill: impl FnMut(&mut [u8]) -> usize + 'static) -> ContentSource {
        ContentSource::Callback { fill: Box::new(fill) }
    }

    /// Pull up to `dst.len()` bytes into `dst`, returning the number
    /// actually produced. Zero means exhausted.
    pub fn fill(&mut self, dst: &mut [u8]) -> usize {
        match self {
            ContentSource::Empty => 0,
            ContentSource::Owned { bytes, pos } => {
                let remaining = &bytes[*pos..];
                let n = remaining.len().min(dst.len());
                dst[..n].copy_from_slice(&remaining[..n]);
                *pos += n;
                n
            }
            ContentSource::File { file } => file.read(dst).unwrap_or(0),
            ContentSource::Stream { stream } => stream.read(dst).unwrap_or(0),
            ContentSource::Callback { fill } => fill(dst),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn owned_fills_to_exhaustion() {
        let mut src = ContentSource::owned(b"abcde".to_vec());
        let mut buf = [0u8; 3];
        assert_eq!(src.fill(&mut buf), 3);
        assert_eq!(&buf, b"abc");
        assert_eq!(src.fill(&mut buf), 2);
        assert_eq!(&buf[..2], b"de");
        assert_eq!(src.fill(&mut buf), 0);
    }

    #[test]
    fn callback_stops_on_zero() {
        let mut calls = 0;
        let mut src = ContentSource::callback(move |dst| {
            calls += 1;
            if calls == 1 {
                dst[0] = b'x';
                1
            } else {
                0
            }
        });
        let mut buf = [0u8; 4];
        assert_eq!(src.fill(&mut buf), 1);
        assert_eq!(src.fill(&mut buf), 0);
    }
}
