use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::http::parser::{Framing, parse_http_request, request_frame_len};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::routing::{HandlerContext, Router};

const READ_CHUNK: usize = 1024;

/// Bounds applied while reading a request.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    pub max_request_bytes: usize,
    pub read_timeout: Option<Duration>,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ConnectionLimits {
    fn from(cfg: &Config) -> Self {
        Self {
            max_request_bytes: cfg.max_request_bytes,
            read_timeout: cfg.read_timeout(),
        }
    }
}

/// Serves exactly one request on an accepted stream, then closes it.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    router: Arc<Router>,
    ctx: Arc<HandlerContext>,
    limits: ConnectionLimits,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

enum Frame {
    Complete(Bytes),
    TooLarge,
    InvalidContentLength,
    Empty,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        stream: S,
        router: Arc<Router>,
        ctx: Arc<HandlerContext>,
        limits: ConnectionLimits,
    ) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            router,
            ctx,
            limits,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_frame().await? {
                        Frame::Complete(bytes) => match parse_http_request(bytes) {
                            Ok(request) => ConnectionState::Processing(request),
                            Err(e) => {
                                tracing::warn!(error = %e, "Rejecting malformed request");
                                ConnectionState::Writing(ResponseWriter::new(
                                    &Response::bad_request(),
                                    None,
                                )?)
                            }
                        },
                        Frame::TooLarge => {
                            tracing::warn!(
                                limit = self.limits.max_request_bytes,
                                "Rejecting oversized request"
                            );
                            ConnectionState::Writing(ResponseWriter::new(
                                &Response::bad_request(),
                                None,
                            )?)
                        }
                        Frame::InvalidContentLength => {
                            tracing::warn!("Rejecting request with invalid Content-Length");
                            ConnectionState::Writing(ResponseWriter::new(
                                &Response::bad_request(),
                                None,
                            )?)
                        }
                        Frame::Empty => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(request) => {
                    let writer = self.respond(&request)?;
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(mut writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    if let Err(e) = self.stream.shutdown().await {
                        tracing::debug!(error = %e, "Shutdown after response failed");
                    }
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    fn respond(&self, request: &Request) -> anyhow::Result<ResponseWriter> {
        let writer = match self.router.find(request) {
            Some(route) => {
                let response = route.handle(request, &self.ctx);
                tracing::info!(
                    method = %request.method,
                    target = %request.target,
                    status = response.status.as_u16(),
                    "Request handled"
                );
                ResponseWriter::new(&response, request.header("Accept-Encoding"))
            }
            None => {
                tracing::info!(
                    method = %request.method,
                    target = %request.target,
                    status = 404,
                    "No route"
                );
                ResponseWriter::new(&Response::not_found(), None)
            }
        };

        writer.context("failed to serialize response")
    }

    /// Reads until one complete request is buffered, the peer stops sending,
    /// or the head shows the request cannot be accepted.
    async fn read_frame(&mut self) -> anyhow::Result<Frame> {
        loop {
            match request_frame_len(&self.buffer, self.limits.max_request_bytes) {
                Framing::Complete(len) => {
                    return Ok(Frame::Complete(self.buffer.split_to(len).freeze()));
                }
                Framing::TooLarge => return Ok(Frame::TooLarge),
                Framing::InvalidContentLength => return Ok(Frame::InvalidContentLength),
                Framing::Incomplete => {}
            }

            if self.buffer.len() >= self.limits.max_request_bytes {
                return Ok(Frame::TooLarge);
            }

            self.buffer.reserve(READ_CHUNK);
            let read = self.stream.read_buf(&mut self.buffer);
            let n = match self.limits.read_timeout {
                Some(limit) => tokio::time::timeout(limit, read)
                    .await
                    .context("timed out reading request")??,
                None => read.await?,
            };

            if n == 0 {
                // Client finished sending; parse whatever arrived.
                if self.buffer.is_empty() {
                    return Ok(Frame::Empty);
                }
                return Ok(Frame::Complete(self.buffer.split().freeze()));
            }
        }
    }
}
