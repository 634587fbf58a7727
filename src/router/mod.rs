//! Route table and request dispatch.
//!
//! Routes are registered with [`Router::add_get`] before serving starts;
//! the table is then frozen behind an `Arc` and consulted read-only by
//! every session on every worker thread. Registration during serving is
//! not supported.

pub mod context;

pub use context::{RequestContext, ResponseSender};

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::http::request::{Method, Request};
use crate::http::response::Response;

type HandlerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A registered route handler. Must deliver exactly one response through
/// the context's `ResponseSender`.
type Handler = Box<dyn Fn(RequestContext) -> HandlerFuture + Send + Sync>;

/// Exact-path route table for GET requests.
pub struct Router {
    routes: HashMap<String, Handler>,
}

impl Router {
    /// Creates a table with the built-in `GET /` status route.
    pub fn new() -> Self {
        let mut router = Self {
            routes: HashMap::new(),
        };
        router.add_get("/", |ctx| async move {
            ctx.send_text("Server is running");
        });
        router
    }

    /// Registers a GET handler for an exact path. Registering the same
    /// path again replaces the previous handler.
    pub fn add_get<F, Fut>(&mut self, path: impl Into<String>, handler: F)
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.routes
            .insert(path.into(), Box::new(move |ctx| Box::pin(handler(ctx))));
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Validates the request and routes it to its handler.
    ///
    /// Rejections all answer 400 with a reason body: a method other than
    /// GET, a target that is empty or not `/`-rooted, or a target with no
    /// registered handler. Otherwise the handler runs with a context
    /// holding the request and the one-shot sender.
    pub async fn dispatch(&self, request: Request, sender: ResponseSender) {
        let keep_alive = request.keep_alive();

        if request.method != Method::GET {
            sender.send(Response::bad_request("Unknown HTTP-method", keep_alive));
            return;
        }

        if request.path.is_empty() || !request.path.starts_with('/') {
            sender.send(Response::bad_request("Illegal request-target", keep_alive));
            return;
        }

        match self.routes.get(&request.path) {
            Some(handler) => handler(RequestContext::new(request, sender)).await,
            None => sender.send(Response::bad_request("Bad request-target", keep_alive)),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
