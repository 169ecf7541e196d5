//! Shared helpers for unit tests

use crate::context::{Headers, RequestContext};
use crate::middleware::{Handler, handler_fn};
use bytes::Bytes;
use gatehouse_core::GatewayConfig;
use http::Method;
use std::sync::Arc;

/// Request context with a default configuration
pub(crate) fn ctx(method: Method, path: &str) -> RequestContext {
    ctx_with_config(method, path, GatewayConfig::default())
}

/// Request context carrying `config` as its snapshot
pub(crate) fn ctx_with_config(method: Method, path: &str, config: GatewayConfig) -> RequestContext {
    RequestContext::new(
        method,
        path.to_string(),
        String::new(),
        Headers::new(),
        Bytes::new(),
        Arc::new(config),
    )
}

/// Terminal handler that writes `marker` into the response body
pub(crate) fn marker_handler(marker: &'static str) -> Handler {
    handler_fn(move |mut ctx: RequestContext| async move {
        ctx.response.body = Bytes::from_static(marker.as_bytes());
        ctx
    })
}
