//! Storage URL parsing
//!
//! Pure string functions; nothing here touches the network.

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;

/// Scheme prefix of bucket URLs
pub const GS_PREFIX: &str = "gs://";

static HTTP_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/b/(?P<bucket>.*)\.appspot\.com/o/(?P<path>[a-zA-Z0-9./\-_%]+)(?P<params>.*)")
        .expect("storage url pattern is valid")
});

/// Bucket and object path extracted from a storage URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// Bucket as a `gs://` URL
    pub bucket: String,
    /// Object path inside the bucket (`/` for the root)
    pub path: String,
}

/// Parse a download URL such as
/// `https://firebasestorage.googleapis.com/v0/b/<bucket>.appspot.com/o/<path>?alt=media`
///
/// Returns `None` when the URL does not have that shape or the path is not
/// valid percent-encoded UTF-8.
pub fn get_http_url_parts(url: &str) -> Option<UrlParts> {
    let captures = HTTP_URL.captures(url)?;
    let bucket = captures.name("bucket")?.as_str();
    let raw_path = captures.name("path")?.as_str();
    let path = percent_decode_str(raw_path).decode_utf8().ok()?;

    Some(UrlParts {
        bucket: format!("{}{}", GS_PREFIX, bucket),
        path: path.into_owned(),
    })
}

/// Split a `gs://bucket/path/to/object` URL
///
/// The bucket keeps its `gs://` prefix. A URL with no object part maps to
/// the root path `/`.
pub fn get_gs_url_parts(url: &str) -> UrlParts {
    let separator = url
        .get(GS_PREFIX.len()..)
        .and_then(|rest| rest.find('/'))
        .map(|i| i + GS_PREFIX.len());

    match separator {
        Some(i) => {
            let path = &url[i + 1..];
            UrlParts {
                bucket: url[..i].to_string(),
                path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            }
        }
        None => UrlParts {
            bucket: url.to_string(),
            path: "/".to_string(),
        },
    }
}
