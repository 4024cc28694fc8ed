use std::io;

use httparse;

quick_error! {
    /// Errors surfaced while parsing a request or driving its transport.
    ///
    /// Every variant here is local to one request: the request moves to
    /// `ERROR` and is torn down on the next scheduler visit, never
    /// propagating to another connection.
    #[derive(Debug)]
    pub enum Error {
        /// The transport reported an I/O failure (`onError`).
        Transport(err: io::Error) {
            description("transport error")
            display("transport error: {}", err)
            from()
        }
        /// Idle RX timeout elapsed while waiting for request bytes.
        Timeout {
            description("request idle timeout")
        }
        /// The request line did not split into method/URL/version.
        BadRequestLine {
            description("malformed request line")
        }
        /// `httparse` rejected a chunk-size line in a chunked request body.
        BadChunkSize(err: httparse::InvalidChunkSize) {
            description("invalid chunk size")
            display("invalid chunk size: {:?}", err)
        }
        /// `Content-Length` header value did not parse as an integer.
        BadContentLength {
            description("invalid Content-Length header")
        }
        /// Same header name appeared with conflicting framing information
        /// twice (e.g. two different `Content-Length` values).
        DuplicateContentLength {
            description("duplicate Content-Length header")
        }
        /// `Host` header missing on an HTTP/1.1 request.
        MissingHost {
            description("missing Host header")
        }
        /// `Expect` carried a value other than `100-continue`.
        UnsupportedExpectation {
            description("unsupported Expect value")
        }
        /// Chunked transfer encoding requested over HTTP/1.0.
        ChunkedOnHttp10 {
            description("chunked transfer encoding is not valid on HTTP/1.0")
        }
        /// A handler reached `RECEIVED` state without attaching a response.
        NoResponseAttached {
            description("handler did not attach a response")
        }
    }
}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn display_is_stable() {
        assert_eq!(Error::Timeout.to_string(), "request idle timeout");
        assert_eq!(Error::BadRequestLine.to_string(), "malformed request line");
    }
}
