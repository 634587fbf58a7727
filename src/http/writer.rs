use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{Body, Response};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Chunk size for streaming file bodies
const BUFFER_SIZE: usize = 8192;

fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b"\r\n");
    buf
}

/// Owns a response for the duration of its write.
///
/// The response is moved in on construction and dropped with the writer
/// once the session is done with it, so its storage outlives the
/// asynchronous write without any sharing.
pub struct ResponseWriter {
    head: Vec<u8>,
    body: Body,
}

impl ResponseWriter {
    pub fn new(response: Response) -> Self {
        Self {
            head: serialize_head(&response),
            body: response.body,
        }
    }

    /// Writes the head and the full body to `stream`.
    pub async fn write_to<S>(&mut self, stream: &mut S) -> anyhow::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        stream.write_all(&self.head).await?;

        match &mut self.body {
            Body::Bytes(bytes) => {
                stream.write_all(bytes).await?;
            }
            Body::File { file, .. } => {
                stream_body(file, stream).await?;
            }
        }

        stream.flush().await?;
        Ok(())
    }
}

async fn stream_body<R, S>(file: &mut R, stream: &mut S) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    S: AsyncWrite + Unpin,
{
    let mut chunk = [0u8; BUFFER_SIZE];

    loop {
        let n = file.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        stream.write_all(&chunk[..n]).await?;
    }

    Ok(())
}
