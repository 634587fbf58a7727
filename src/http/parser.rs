use crate::http::request::{Method, Request};
use std::collections::HashMap;

/// Maximum size of the request head (request line + headers).
pub const MAX_HEAD_SIZE: usize = 8 * 1024;

/// Maximum accepted Content-Length.
pub const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidMethod,
    InvalidHeader,
    InvalidContentLength,
    /// Head or declared body exceeds the size limits.
    TooLarge,
    /// More bytes are needed before a full request can be parsed.
    Incomplete,
}

/// Attempts to parse one complete HTTP request from the front of `buf`.
///
/// Returns the request and the number of bytes consumed so the caller can
/// drain its buffer. `ParseError::Incomplete` means the caller should read
/// more bytes and retry; every other error is a protocol violation. The
/// head and body limits keep a peer from growing the caller's buffer
/// without bound before a request completes.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let headers_end = match find_headers_end(buf) {
        Some(pos) => pos,
        None if buf.len() > MAX_HEAD_SIZE => return Err(ParseError::TooLarge),
        None => return Err(ParseError::Incomplete),
    };
    if headers_end > MAX_HEAD_SIZE {
        return Err(ParseError::TooLarge);
    }
    let head = std::str::from_utf8(&buf[..headers_end]).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = head.split("\r\n");

    let (method, path, version) = parse_request_line(lines.next().ok_or(ParseError::InvalidRequest)?)?;
    let headers = parse_headers(lines)?;

    // Body length comes from Content-Length; GET requests normally have none
    let content_length = match headers.iter().find(|(k, _)| k.eq_ignore_ascii_case("Content-Length")) {
        Some((_, v)) => v.parse::<usize>().map_err(|_| ParseError::InvalidContentLength)?,
        None => 0,
    };
    if content_length > MAX_BODY_SIZE {
        return Err(ParseError::TooLarge);
    }

    let body_start = headers_end + 4;
    let body_bytes = &buf[body_start..];
    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body: body_bytes[..content_length].to_vec(),
    };

    Ok((request, body_start + content_length))
}

fn parse_request_line(line: &str) -> Result<(Method, &str, &str), ParseError> {
    let mut parts = line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;
    Ok((method, path, version))
}

fn parse_headers<'a>(
    lines: impl Iterator<Item = &'a str>,
) -> Result<HashMap<String, String>, ParseError> {
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        headers.insert(key.trim().to_string(), value.trim().to_string());
    }

    Ok(headers)
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn incomplete_until_blank_line() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
        assert_eq!(parse_http_request(req).unwrap_err(), ParseError::Incomplete);
    }
}
