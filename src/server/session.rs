use std::mem;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::router::{ResponseSender, Router};

/// Maximum time a session may spend on one read or one write.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

pub enum SessionState {
    Reading,
    Dispatching(Request),
    Writing(ResponseWriter, bool), // bool = reuse connection afterwards
    Closing,
    Closed,
}

/// One accepted connection.
///
/// Owns the stream and a read buffer that is drained and reused across
/// requests, never reallocated per request. The session task owns the
/// whole value, so all state machine steps are serialized even though
/// successive steps may run on different worker threads.
pub struct Session {
    stream: TcpStream,
    buffer: BytesMut,
    router: Arc<Router>,
    idle_timeout: Duration,
    state: SessionState,
}

impl Session {
    pub fn new(stream: TcpStream, router: Arc<Router>) -> Self {
        Self::with_idle_timeout(stream, router, IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(stream: TcpStream, router: Arc<Router>, idle_timeout: Duration) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            router,
            idle_timeout,
            state: SessionState::Reading,
        }
    }

    /// Drives the state machine until the connection is closed.
    ///
    /// `Reading → Dispatching → Writing → {Reading | Closing}`. A timeout
    /// in Reading or Writing aborts the pending operation and closes
    /// without producing a response; a clean peer EOF while reading closes
    /// silently. Request N+1 is never read before response N has been
    /// fully written.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match mem::replace(&mut self.state, SessionState::Closed) {
                SessionState::Reading => {
                    match timeout(self.idle_timeout, self.read_request()).await {
                        Ok(Ok(Some(request))) => {
                            self.state = SessionState::Dispatching(request);
                        }
                        Ok(Ok(None)) => {
                            // Peer closed the connection
                            self.state = SessionState::Closing;
                        }
                        Ok(Err(e)) => return Err(e),
                        Err(_) => {
                            debug!("Idle timeout while reading, closing");
                            self.state = SessionState::Closing;
                        }
                    }
                }

                SessionState::Dispatching(request) => {
                    let wants_keep_alive = request.keep_alive();

                    let (sender, response_rx) = ResponseSender::channel();
                    self.router.dispatch(request, sender).await;

                    // Exactly-once send contract: a handler that completes
                    // without sending drops the sender and ends up here
                    let response = response_rx
                        .await
                        .map_err(|_| anyhow::anyhow!("handler finished without sending a response"))?;

                    let reuse = wants_keep_alive && response.keep_alive;
                    self.state = SessionState::Writing(ResponseWriter::new(response), reuse);
                }

                SessionState::Writing(mut writer, reuse) => {
                    match timeout(self.idle_timeout, writer.write_to(&mut self.stream)).await {
                        Ok(Ok(())) => {
                            self.state = if reuse {
                                SessionState::Reading
                            } else {
                                SessionState::Closing
                            };
                        }
                        Ok(Err(e)) => return Err(e),
                        Err(_) => {
                            debug!("Idle timeout while writing, closing");
                            self.state = SessionState::Closing;
                        }
                    }
                }

                SessionState::Closing => {
                    // Half-close: shut down our send side, then drop everything
                    let _ = self.stream.shutdown().await;
                    self.state = SessionState::Closed;
                }

                SessionState::Closed => break,
            }
        }

        Ok(())
    }

    /// Reads until the buffer holds one full request, draining the
    /// consumed bytes. `Ok(None)` is a clean end of stream before any
    /// request byte arrived.
    async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data, fall through to read
                }

                Err(e) => {
                    return Err(anyhow::anyhow!("HTTP parse error: {:?}", e));
                }
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(anyhow::anyhow!("connection closed mid-request"));
            }
        }
    }
}
