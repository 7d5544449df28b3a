//! Content-Encoding negotiation and body compression.
//!
//! Only `gzip` is offered. The `Accept-Encoding` value is split on `", "` and
//! each token compared exactly; quality values and `*` are not interpreted.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
}

impl ContentEncoding {
    /// Picks an encoding from an `Accept-Encoding` header value.
    ///
    /// # Example
    ///
    /// ```
    /// # use tinyhttp::http::encoding::ContentEncoding;
    /// assert_eq!(ContentEncoding::negotiate(Some("br, gzip")), Some(ContentEncoding::Gzip));
    /// assert_eq!(ContentEncoding::negotiate(Some("gzip;q=1.0")), None);
    /// assert_eq!(ContentEncoding::negotiate(None), None);
    /// ```
    pub fn negotiate(accepted: Option<&str>) -> Option<Self> {
        accepted?
            .split(", ")
            .find_map(|token| match token {
                "gzip" => Some(ContentEncoding::Gzip),
                _ => None,
            })
    }

    /// The token sent in the `Content-Encoding` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
        }
    }

    /// Compresses `body` as a single stream at the fast level.
    pub fn encode(&self, body: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            ContentEncoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
                encoder.write_all(body)?;
                encoder.finish()
            }
        }
    }
}
