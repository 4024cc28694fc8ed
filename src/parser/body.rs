//! Fixed-length request body accumulation.
//!
//! Multipart bodies are an optional parser selected by the head parser
//! when compiled in; this crate only ships the unibody (fixed
//! `Content-Length`) case.

pub struct BodyParser {
    remaining: u64,
    buf: Vec<u8>,
}

pub enum BodyStatus {
    NeedMore { consumed: usize },
    Complete { consumed: usize },
}

impl BodyParser {
    pub fn new(content_length: u64) -> BodyParser {
        BodyParser { remaining: content_length, buf: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    pub fn feed(&mut self, buf: &[u8]) -> BodyStatus {
        let take = (self.remaining as usize).min(buf.len());
        self.buf.extend_from_slice(&buf[..take]);
        self.remaining -= take as u64;
        if self.remaining == 0 {
            BodyStatus::Complete { consumed: take }
        } else {
            BodyStatus::NeedMore { consumed: take }
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accumulates_until_content_length() {
        let mut p = BodyParser::new(4);
        match p.feed(b"ab") {
            BodyStatus::NeedMore { consumed } => assert_eq!(consumed, 2),
            _ => panic!(),
        }
        match p.feed(b"cdextra") {
            BodyStatus::Complete { consumed } => assert_eq!(consumed, 2),
            _ => panic!(),
        }
        assert_eq!(p.into_bytes(), b"abcd");
    }

    #[test]
    fn zero_length_is_immediately_complete_on_first_feed() {
        let p = BodyParser::new(0);
        assert!(p.is_empty());
    }
}
