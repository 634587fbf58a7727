use std::collections::HashMap;
use std::io::ErrorKind;

use tokio::fs::File;

use crate::http::mime::mime_type;

/// Server identity string attached to every response.
pub const SERVER_NAME: &str = "adam server";

/// HTTP status codes produced by the engine.
///
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): Unknown method, illegal target or unknown route
/// - `NotFound` (404): File-backed route whose file is absent
/// - `InternalServerError` (500): I/O failure other than a missing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Response payload: either in-memory bytes or an open file streamed at
/// write time.
#[derive(Debug)]
pub enum Body {
    Bytes(Vec<u8>),
    File { file: File, len: u64 },
}

impl Body {
    /// Byte length, known ahead of transmission for both variants.
    pub fn len(&self) -> u64 {
        match self {
            Body::Bytes(b) => b.len() as u64,
            Body::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A complete HTTP response ready to be written.
///
/// The keep-alive flag mirrors the request that produced it; the session
/// consults it together with the request's own wish when deciding whether
/// to reuse the connection.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub keep_alive: bool,
    pub body: Body,
}

/// Fluent builder for responses.
///
/// `build()` stamps the headers every response carries: `Server`,
/// `Connection` and `Content-Length`.
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HashMap<String, String>,
    keep_alive: bool,
    body: Body,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            keep_alive: true,
            body: Body::Bytes(Vec::new()),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Bytes(body.into());
        self
    }

    pub fn file_body(mut self, file: File, len: u64) -> Self {
        self.body = Body::File { file, len };
        self
    }

    pub fn build(mut self) -> Response {
        self.headers
            .entry("Server".to_string())
            .or_insert_with(|| SERVER_NAME.to_string());

        self.headers.insert(
            "Connection".to_string(),
            if self.keep_alive { "keep-alive" } else { "close" }.to_string(),
        );

        self.headers
            .entry("Content-Length".to_string())
            .or_insert_with(|| self.body.len().to_string());

        Response {
            status: self.status,
            headers: self.headers,
            keep_alive: self.keep_alive,
            body: self.body,
        }
    }
}

impl Response {
    /// 200 response with an in-memory body; the extension hint (".txt",
    /// ".json", ...) selects the Content-Type.
    pub fn content(body: impl Into<Vec<u8>>, extension: &str, keep_alive: bool) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", mime_type(extension))
            .keep_alive(keep_alive)
            .body(body)
            .build()
    }

    /// 400 response carrying the rejection reason as its body.
    pub fn bad_request(why: &str, keep_alive: bool) -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .header("Content-Type", "text/html")
            .keep_alive(keep_alive)
            .body(why)
            .build()
    }

    /// 404 response naming the resource that was not found.
    pub fn not_found(resource: &str, keep_alive: bool) -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .header("Content-Type", "text/html")
            .keep_alive(keep_alive)
            .body(format!("The resource '{resource}' was not found."))
            .build()
    }

    /// 500 response carrying the underlying error message.
    pub fn server_error(what: &str, keep_alive: bool) -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError)
            .header("Content-Type", "text/html")
            .keep_alive(keep_alive)
            .body(format!("An error occurred: '{what}'"))
            .build()
    }

    /// Opens `path` and produces a streamed 200 response, or the matching
    /// error response: 404 when the file is absent (naming the request
    /// `target`), 500 for any other I/O failure.
    ///
    /// A non-empty `extension` overrides the Content-Type derived from the
    /// file's own extension.
    pub async fn file(path: &str, extension: &str, target: &str, keep_alive: bool) -> Self {
        let file = match File::open(path).await {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Self::not_found(target, keep_alive);
            }
            Err(e) => return Self::server_error(&e.to_string(), keep_alive),
        };

        let len = match file.metadata().await {
            Ok(m) => m.len(),
            Err(e) => return Self::server_error(&e.to_string(), keep_alive),
        };

        let content_type = if extension.is_empty() {
            mime_type(path)
        } else {
            mime_type(extension)
        };

        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type)
            .keep_alive(keep_alive)
            .file_body(file, len)
            .build()
    }
}
