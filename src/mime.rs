//! Closed-set MIME type inference from a file extension, used by the
//! static file handler to fill in `Content-Type` when a response doesn't
//! set one explicitly.

pub const DEFAULT: &str = "application/octet-stream";

/// Infer a MIME type from a (non gzip-suffixed) path's extension.
/// Unknown extensions fall back to `DEFAULT`.
pub fn from_path(path: &str) -> &'static str {
    let ext = match path.rsplit('.').next() {
        Some(ext) if ext != path => ext,
        _ => return DEFAULT,
    };
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "txt" => "text/plain",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "gif" => "image/gif",
        "jpg" | "jpeg" => "image/jpeg",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "xml" => "text/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        _ => DEFAULT,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(from_path("/index.html"), "text/html");
        assert_eq!(from_path("/app.js"), "application/javascript");
        assert_eq!(from_path("/style.CSS"), "text/css");
    }

    #[test]
    fn unknown_or_missing_extension_falls_back() {
        assert_eq!(from_path("/data.bin"), DEFAULT);
        assert_eq!(from_path("/noext"), DEFAULT);
    }

    #[test]
    fn gzip_suffix_is_stripped_before_lookup_by_caller() {
        // from_path is always called on the plain subpath, never on
        // "foo.js.gz" directly -- this just documents that contract.
        assert_eq!(from_path("/app.js"), "application/javascript");
    }
}
