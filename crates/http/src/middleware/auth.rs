//! Admin gate: credential check for non-public requests

use super::{Handler, Middleware, handler_fn};
use crate::context::RequestContext;
use crate::error::{HttpError, send_error};
use http::Method;
use url::form_urlencoded;

/// True for routes that bypass the admin gate.
///
/// Inference and version endpoints stay open so API clients work without a
/// browser session, and the login flow itself must be reachable while
/// unauthenticated.
pub fn is_public_path(method: &Method, path: &str) -> bool {
    if method == Method::GET && path == "/metrics" {
        return true;
    }
    if method == Method::POST && path.starts_with("/v1/") {
        return true;
    }
    if method == Method::POST && path.starts_with("/openai/") {
        return true;
    }
    if method == Method::GET && (path == "/openai/models" || path == "/openai/v1/models") {
        return true;
    }
    if path.starts_with("/admin/login") {
        return true;
    }
    if method == Method::GET && path == "/api/version" {
        return true;
    }
    false
}

/// Token from a `Bearer` authorization header, if the scheme matches.
///
/// The scheme comparison is case-insensitive and surrounding whitespace is
/// ignored on both the header and the token.
fn bearer_token(header: &str) -> Option<&str> {
    let trimmed = header.trim();
    let (scheme, token) = trimmed.split_at_checked(7)?;
    scheme.eq_ignore_ascii_case("bearer ").then(|| token.trim())
}

/// Whether an auth failure should be answered with JSON rather than a
/// redirect to the login page
fn wants_json(ctx: &RequestContext) -> bool {
    let accept = ctx.header("Accept").unwrap_or_default();
    let requested_with = ctx.header("X-Requested-With").unwrap_or_default();
    accept.to_ascii_lowercase().contains("application/json")
        || requested_with.eq_ignore_ascii_case("XMLHttpRequest")
        || ctx.path.starts_with("/api/")
}

/// Admin authorization middleware.
///
/// With no admin secret configured the gate is disabled and every request
/// passes. Otherwise non-public requests must present the secret as a
/// bearer token or in the admin cookie; failures get a JSON 401 for API
/// traffic and a redirect to the login page for browser navigation.
pub fn admin_auth_middleware() -> Middleware {
    Box::new(|next: Handler| {
        handler_fn(move |mut ctx: RequestContext| {
            let next = next.clone();
            async move {
                let config = ctx.config.clone();
                if config.admin_disabled() {
                    return next(ctx).await;
                }
                if is_public_path(&ctx.method, &ctx.path) {
                    return next(ctx).await;
                }

                let bearer_ok = ctx
                    .header("Authorization")
                    .and_then(bearer_token)
                    .is_some_and(|token| token == config.admin_secret);
                let cookie_ok = ctx
                    .cookie(config.cookie_name())
                    .is_some_and(|value| !value.is_empty() && value == config.admin_secret);
                if bearer_ok || cookie_ok {
                    return next(ctx).await;
                }

                if wants_json(&ctx) || ctx.path.starts_with("/v1/") || ctx.path.starts_with("/api/") {
                    send_error(
                        &mut ctx,
                        HttpError::AuthenticationRequired("admin authentication required".to_string()),
                    );
                    return ctx;
                }

                let next_param: String = form_urlencoded::byte_serialize(ctx.path.as_bytes()).collect();
                ctx.respond_redirect(&format!("/admin/login?next={next_param}"));
                ctx
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorResponse;
    use crate::middleware::chain;
    use crate::test_util::{ctx_with_config, marker_handler};
    use gatehouse_core::GatewayConfig;
    use http::StatusCode;

    fn secured() -> GatewayConfig {
        GatewayConfig {
            admin_secret: "s3cr3t".to_string(),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn public_path_table() {
        assert!(is_public_path(&Method::GET, "/metrics"));
        assert!(!is_public_path(&Method::POST, "/metrics"));

        assert!(is_public_path(&Method::POST, "/v1/chat/completions"));
        assert!(!is_public_path(&Method::GET, "/v1/chat/completions"));

        assert!(is_public_path(&Method::POST, "/openai/v1/chat/completions"));
        assert!(is_public_path(&Method::GET, "/openai/models"));
        assert!(is_public_path(&Method::GET, "/openai/v1/models"));
        assert!(!is_public_path(&Method::GET, "/openai/other"));

        assert!(is_public_path(&Method::GET, "/admin/login"));
        assert!(is_public_path(&Method::POST, "/admin/login"));

        assert!(is_public_path(&Method::GET, "/api/version"));
        assert!(!is_public_path(&Method::GET, "/api/config"));
        assert!(!is_public_path(&Method::GET, "/settings"));

        // Matching is on the raw path; percent-encoded forms never count as
        // public, so an encoded path falls through to the credential check.
        assert!(!is_public_path(&Method::POST, "/%76%31/chat/completions"));
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer s3cr3t"), Some("s3cr3t"));
        assert_eq!(bearer_token("  bearer   s3cr3t  "), Some("s3cr3t"));
        assert_eq!(bearer_token("BEARER s3cr3t"), Some("s3cr3t"));
        assert_eq!(bearer_token("Basic s3cr3t"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[tokio::test]
    async fn disabled_gate_passes_everything_through() {
        let handler = chain(marker_handler("downstream"), vec![admin_auth_middleware()]);

        let config = GatewayConfig {
            admin_secret: "   ".to_string(),
            ..GatewayConfig::default()
        };
        let result = handler(ctx_with_config(Method::GET, "/settings", config)).await;

        assert_eq!(result.response.status, StatusCode::OK);
        assert_eq!(result.response.body, "downstream");
    }

    #[tokio::test]
    async fn valid_bearer_token_passes() {
        let handler = chain(marker_handler("downstream"), vec![admin_auth_middleware()]);

        let mut ctx = ctx_with_config(Method::GET, "/settings", secured());
        ctx.headers.append("Authorization", "Bearer s3cr3t");
        let result = handler(ctx).await;

        assert_eq!(result.response.body, "downstream");
    }

    #[tokio::test]
    async fn valid_cookie_passes() {
        let handler = chain(marker_handler("downstream"), vec![admin_auth_middleware()]);

        let mut ctx = ctx_with_config(Method::GET, "/settings", secured());
        ctx.headers.append("Cookie", "bf_admin=s3cr3t");
        let result = handler(ctx).await;

        assert_eq!(result.response.body, "downstream");
    }

    #[tokio::test]
    async fn public_inference_route_passes_without_credentials() {
        let handler = chain(marker_handler("downstream"), vec![admin_auth_middleware()]);

        let result = handler(ctx_with_config(Method::POST, "/v1/chat/completions", secured())).await;

        assert_eq!(result.response.body, "downstream");
    }

    #[tokio::test]
    async fn browser_navigation_redirects_to_login_with_next() {
        let handler = chain(marker_handler("downstream"), vec![admin_auth_middleware()]);

        let mut ctx = ctx_with_config(Method::GET, "/settings", secured());
        ctx.headers.append("Accept", "text/html,application/xhtml+xml");
        let result = handler(ctx).await;

        assert_eq!(result.response.status, StatusCode::FOUND);
        assert_eq!(
            result.response.headers.get("Location"),
            Some("/admin/login?next=%2Fsettings")
        );
        assert!(result.response.body.is_empty());
    }

    #[tokio::test]
    async fn json_clients_get_a_structured_401() {
        let handler = chain(marker_handler("downstream"), vec![admin_auth_middleware()]);

        let mut ctx = ctx_with_config(Method::GET, "/settings", secured());
        ctx.headers.append("Accept", "application/json");
        let result = handler(ctx).await;

        assert_eq!(result.response.status, StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = serde_json::from_slice(&result.response.body).unwrap();
        assert_eq!(body.status, 401);
    }

    #[tokio::test]
    async fn xml_http_request_marker_is_treated_as_json() {
        let handler = chain(marker_handler("downstream"), vec![admin_auth_middleware()]);

        let mut ctx = ctx_with_config(Method::GET, "/settings", secured());
        ctx.headers.append("X-Requested-With", "xmlhttprequest");
        let result = handler(ctx).await;

        assert_eq!(result.response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn api_prefixed_paths_never_redirect() {
        let handler = chain(marker_handler("downstream"), vec![admin_auth_middleware()]);

        // GET /v1/... is not public; a browser Accept header still gets JSON.
        let mut ctx = ctx_with_config(Method::GET, "/v1/models", secured());
        ctx.headers.append("Accept", "text/html");
        let result = handler(ctx).await;

        assert_eq!(result.response.status, StatusCode::UNAUTHORIZED);
        assert!(result.response.headers.get("Location").is_none());
    }

    #[tokio::test]
    async fn wrong_bearer_and_cookie_are_rejected() {
        let handler = chain(marker_handler("downstream"), vec![admin_auth_middleware()]);

        let mut ctx = ctx_with_config(Method::GET, "/settings", secured());
        ctx.headers.append("Authorization", "Bearer wrong");
        ctx.headers.append("Cookie", "bf_admin=wrong");
        ctx.headers.append("Accept", "application/json");
        let result = handler(ctx).await;

        assert_eq!(result.response.status, StatusCode::UNAUTHORIZED);
    }
}
