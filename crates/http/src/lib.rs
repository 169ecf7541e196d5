//! Gatehouse HTTP edge layer
//!
//! The middleware chain (CORS guard, admin gate, plugin interception), the
//! embedded admin UI with its login flow, and the axum adapter that serves
//! the composed chain.

#[macro_use]
extern crate tracing;

pub mod context;
pub mod cookie;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
pub(crate) mod test_util;

pub use context::{Headers, RequestContext, ResponseState};
pub use cookie::AuthCookie;
pub use error::{ErrorResponse, HttpError, Result};
pub use server::{EdgeDispatcher, GatewayServer};
pub use state::AppState;

// Re-export commonly used types
pub use middleware::{Handler, Middleware, chain, handler_fn};
