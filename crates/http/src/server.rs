//! Server assembly: terminal dispatch, the composed chain, and the axum
//! adapter around it

use crate::context::{Headers, RequestContext};
use crate::error::{HttpError, send_error};
use crate::middleware::{
    Handler, Middleware, admin_auth_middleware, chain, cors_middleware, handler_fn,
    transport_interceptor_middleware,
};
use crate::routes::UiHandler;
use crate::state::AppState;
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    response::{IntoResponse, Response},
    routing::any,
};
use gatehouse_core::{AssetBundle, ConfigStore};
use http::Method;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Largest request body the edge layer will buffer
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Terminal handler behind the middleware chain.
///
/// Owns the split between the admin login flow, the API surface delegated
/// to the downstream handler, and the embedded UI served for everything
/// else a browser navigates to.
#[derive(Clone)]
pub struct EdgeDispatcher {
    ui: UiHandler,
    downstream: Handler,
}

impl EdgeDispatcher {
    /// Create a dispatcher over the UI handler, delegating API traffic to
    /// `downstream` when one is mounted
    pub fn new(ui: UiHandler, downstream: Option<Handler>) -> Self {
        Self {
            ui,
            downstream: downstream.unwrap_or_else(unmounted_api_handler),
        }
    }

    /// True for paths owned by the downstream API surface
    fn is_api_path(path: &str) -> bool {
        path == "/metrics"
            || path.starts_with("/v1/")
            || path.starts_with("/openai/")
            || path.starts_with("/api/")
    }

    /// Convert into a chainable [`Handler`]
    pub fn into_handler(self) -> Handler {
        handler_fn(move |mut ctx: RequestContext| {
            let dispatcher = self.clone();
            async move {
                if ctx.method == Method::GET && ctx.path == "/admin/login" {
                    dispatcher.ui.login_page(&mut ctx);
                } else if ctx.method == Method::POST && ctx.path == "/admin/login" {
                    dispatcher.ui.login_submit(&mut ctx);
                } else if ctx.method == Method::GET && ctx.path == "/admin/logout" {
                    dispatcher.ui.logout(&mut ctx);
                } else if Self::is_api_path(&ctx.path) {
                    return (dispatcher.downstream)(ctx).await;
                } else if ctx.method == Method::GET || ctx.method == Method::HEAD {
                    dispatcher.ui.serve_dashboard(&mut ctx);
                } else {
                    let message = format!("no handler for {} {}", ctx.method, ctx.path);
                    send_error(&mut ctx, HttpError::NotFound(message));
                }
                ctx
            }
        })
    }
}

/// Fallback for API paths when no downstream handler is mounted
fn unmounted_api_handler() -> Handler {
    handler_fn(|mut ctx: RequestContext| async move {
        let message = format!("no handler for {} {}", ctx.method, ctx.path);
        send_error(&mut ctx, HttpError::NotFound(message));
        ctx
    })
}

/// Builder wiring the middleware chain and terminal routes into an axum
/// [`Router`]
pub struct GatewayServer {
    config: Arc<ConfigStore>,
    assets: Arc<AssetBundle>,
    downstream: Option<Handler>,
}

impl GatewayServer {
    /// Create a server over the given configuration store and UI bundle
    pub fn new(config: Arc<ConfigStore>, assets: Arc<AssetBundle>) -> Self {
        Self {
            config,
            assets,
            downstream: None,
        }
    }

    /// Mount the downstream API handler consulted for `/v1/`, `/openai/`,
    /// `/api/` and `/metrics` traffic
    pub fn with_downstream(mut self, handler: Handler) -> Self {
        self.downstream = Some(handler);
        self
    }

    /// Assemble the chain once and return the router serving it.
    ///
    /// Order matters: CORS runs first so preflights never hit the admin
    /// gate, and interception runs last so only authorized or public
    /// traffic reaches the plugins.
    pub fn build_router(self) -> Router {
        let dispatcher = EdgeDispatcher::new(UiHandler::new(self.assets), self.downstream);
        let middlewares: Vec<Middleware> = vec![
            cors_middleware(),
            admin_auth_middleware(),
            transport_interceptor_middleware(),
        ];
        let handler = chain(dispatcher.into_handler(), middlewares);
        let state = AppState::new(self.config, handler);

        Router::new()
            .route("/", any(gateway_entry))
            .route("/{*path}", any(gateway_entry))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind `addr` and serve until the process is stopped
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let router = self.build_router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Gateway edge listening on {addr}");
        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Axum entry point: adapt the incoming request into a [`RequestContext`],
/// run the prebuilt chain, and adapt the final context back into a response
async fn gateway_entry(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return HttpError::BadRequest(format!("failed to read request body: {err}")).into_response();
        }
    };

    let mut headers = Headers::new();
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            headers.append(name.as_str(), value);
        }
    }

    let ctx = RequestContext::new(
        parts.method,
        parts.uri.path().to_string(),
        parts.uri.query().unwrap_or_default().to_string(),
        headers,
        body,
        state.config.snapshot(),
    );

    let ctx = (state.handler)(ctx).await;
    into_response(ctx)
}

fn into_response(ctx: RequestContext) -> Response {
    let mut builder = Response::builder().status(ctx.response.status);
    for (name, value) in ctx.response.headers.iter() {
        builder = builder.header(name, value);
    }
    match builder.body(Body::from(ctx.response.body)) {
        Ok(response) => response,
        Err(err) => {
            error!("failed to assemble response: {err}");
            HttpError::Internal("failed to assemble response".to_string()).into_response()
        }
    }
}
