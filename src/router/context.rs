use tokio::sync::oneshot;

use crate::http::request::Request;
use crate::http::response::Response;

/// Single-use capability for delivering the response of one request.
///
/// Every send method consumes the sender, so a handler cannot respond
/// twice; dropping it without sending is a handler bug the session
/// surfaces as an error.
pub struct ResponseSender {
    tx: oneshot::Sender<Response>,
}

impl ResponseSender {
    /// Creates a sender plus the receiver the session awaits.
    pub fn channel() -> (Self, oneshot::Receiver<Response>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn send(self, response: Response) {
        // The receiver only disappears if the session died; nothing to do then
        let _ = self.tx.send(response);
    }
}

/// What a route handler receives: the parsed request plus the one-shot
/// send capability. The convenience methods mirror the keep-alive wish of
/// the request into the response they build.
pub struct RequestContext {
    request: Request,
    sender: ResponseSender,
}

impl RequestContext {
    pub fn new(request: Request, sender: ResponseSender) -> Self {
        Self { request, sender }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Sends a prebuilt response.
    pub fn send_response(self, response: Response) {
        self.sender.send(response);
    }

    /// Sends a 200 plain-text response.
    pub fn send_text(self, body: impl Into<String>) {
        let response = Response::content(body.into(), ".txt", self.request.keep_alive());
        self.sender.send(response);
    }

    /// Sends a 200 JSON response (the body is passed through as-is).
    pub fn send_json(self, body: impl Into<String>) {
        let response = Response::content(body.into(), ".json", self.request.keep_alive());
        self.sender.send(response);
    }

    /// Sends the file at `path`, deriving Content-Type from its extension.
    /// A missing file becomes a 404 naming the request target; any other
    /// open failure becomes a 500.
    pub async fn send_file(self, path: &str) {
        self.send_file_as(path, "").await;
    }

    /// Like [`send_file`](Self::send_file) with an explicit extension
    /// overriding the Content-Type (e.g. serve "./data.bin" as ".json").
    pub async fn send_file_as(self, path: &str, extension: &str) {
        let keep_alive = self.request.keep_alive();
        let response = Response::file(path, extension, &self.request.path, keep_alive).await;
        self.sender.send(response);
    }
}
