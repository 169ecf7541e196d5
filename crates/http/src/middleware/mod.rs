//! Middleware components for HTTP request processing
//!
//! A [`Handler`] consumes the request context and returns it with the
//! response populated. A [`Middleware`] wraps a handler to produce a new
//! handler; [`chain`] composes an ordered list of middlewares around a
//! terminal handler. A middleware short-circuits by filling the response
//! and returning the context without invoking the handler it wraps.

pub mod auth;
pub mod cors;
pub mod interceptor;

pub use auth::{admin_auth_middleware, is_public_path};
pub use cors::{cors_middleware, is_origin_allowed};
pub use interceptor::transport_interceptor_middleware;

use crate::context::RequestContext;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A request handler: consumes the context, returns it with the response
/// populated
pub type Handler = Arc<dyn Fn(RequestContext) -> BoxFuture<'static, RequestContext> + Send + Sync>;

/// A middleware: wraps a handler, yielding a new handler
pub type Middleware = Box<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Build a [`Handler`] from an async function
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RequestContext> + Send + 'static,
{
    Arc::new(move |ctx| -> BoxFuture<'static, RequestContext> { Box::pin(f(ctx)) })
}

/// Compose `middlewares` around `handler`.
///
/// The wrappers are applied right to left so that execution order is left
/// to right: the first middleware in the list observes the request first
/// and its short-circuit suppresses everything after it. An empty list
/// returns `handler` unchanged.
pub fn chain(handler: Handler, middlewares: Vec<Middleware>) -> Handler {
    let mut chained = handler;
    for middleware in middlewares.into_iter().rev() {
        chained = middleware(chained);
    }
    chained
}
