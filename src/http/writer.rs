use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::encoding::ContentEncoding;
use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes `resp` to wire bytes.
///
/// When `accepted_encodings` offers `gzip` the body is compressed and
/// `Content-Encoding` is added; `Content-Length` always describes the bytes
/// actually sent. Any `Content-Length` or `Content-Encoding` set by the handler
/// is ignored.
pub fn serialize_response(resp: &Response, accepted_encodings: Option<&str>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        if k == "Content-Length" || k == "Content-Encoding" {
            continue;
        }
        push_header(&mut buf, k, v);
    }

    match ContentEncoding::negotiate(accepted_encodings) {
        Some(encoding) => {
            let compressed = encoding.encode(&resp.body)?;
            push_header(&mut buf, "Content-Encoding", encoding.as_str());
            push_header(&mut buf, "Content-Length", &compressed.len().to_string());
            buf.extend_from_slice(b"\r\n");
            buf.extend_from_slice(&compressed);
        }
        None => {
            push_header(&mut buf, "Content-Length", &resp.body.len().to_string());
            buf.extend_from_slice(b"\r\n");
            buf.extend_from_slice(&resp.body);
        }
    }

    Ok(buf)
}

fn push_header(buf: &mut Vec<u8>, name: &str, value: &str) {
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Holds a serialized response and tracks how much of it reached the peer.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response, accepted_encodings: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            buffer: serialize_response(response, accepted_encodings)?,
            written: 0,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
