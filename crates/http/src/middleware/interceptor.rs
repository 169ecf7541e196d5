//! Plugin interception pipeline
//!
//! Gives registered plugins a chance to rewrite request headers and the
//! JSON body before the request is forwarded. Plugin failures are isolated:
//! the pipeline logs them and carries on with the state from before the
//! failing plugin.

use super::{Handler, Middleware, handler_fn};
use crate::context::RequestContext;
use crate::error::{HttpError, send_error};
use gatehouse_core::JsonObject;
use std::collections::HashMap;

/// Transport interception middleware.
///
/// Engages only when at least one registered plugin exposes the
/// interception capability; otherwise the request passes through without
/// the body ever being parsed. A body that is not a JSON object also
/// bypasses interception unchanged.
pub fn transport_interceptor_middleware() -> Middleware {
    Box::new(|next: Handler| {
        handler_fn(move |mut ctx: RequestContext| {
            let next = next.clone();
            async move {
                let config = ctx.config.clone();
                if !config.plugins.iter().any(|p| p.transport_interceptor().is_some()) {
                    return next(ctx).await;
                }

                let mut headers: HashMap<String, String> = HashMap::new();
                let mut original_names: Vec<String> = Vec::with_capacity(ctx.headers.len());
                for (name, value) in ctx.headers.iter() {
                    headers.insert(name.to_string(), value.to_string());
                    original_names.push(name.to_string());
                }

                let mut body = JsonObject::new();
                if !ctx.body.is_empty() {
                    match serde_json::from_slice::<JsonObject>(&ctx.body) {
                        Ok(parsed) => body = parsed,
                        Err(err) => {
                            warn!(error = %err, "request body is not a JSON object, skipping interception");
                            return next(ctx).await;
                        }
                    }
                }

                let request_uri = ctx.request_uri();
                for plugin in &config.plugins {
                    let Some(interceptor) = plugin.transport_interceptor() else {
                        continue;
                    };
                    match interceptor.intercept(&request_uri, &headers, &body).await {
                        Ok((new_headers, new_body)) => {
                            headers = new_headers;
                            body = new_body;
                        }
                        Err(err) => {
                            warn!(
                                plugin = plugin.name(),
                                error = %err,
                                "plugin interception failed, keeping prior request state"
                            );
                        }
                    }
                }

                match serde_json::to_vec(&body) {
                    Ok(encoded) => ctx.body = encoded.into(),
                    Err(err) => {
                        send_error(
                            &mut ctx,
                            HttpError::Internal(format!("failed to serialize intercepted request body: {err}")),
                        );
                        return ctx;
                    }
                }

                // Reconcile: drop names the plugins removed, then apply the
                // final mapping.
                for name in &original_names {
                    if !headers.contains_key(name) {
                        ctx.headers.remove(name);
                    }
                }
                for (name, value) in &headers {
                    ctx.headers.set(name, value.clone());
                }

                next(ctx).await
            }
        })
    })
}
