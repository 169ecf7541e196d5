//! CORS guard for browser traffic
//!
//! Grants are advisory headers for allowed origins; apart from preflight
//! requests, disallowed origins still continue down the chain and rely on
//! the browser to enforce the missing grant.

use super::{Handler, Middleware, handler_fn};
use crate::context::RequestContext;
use http::{Method, StatusCode};
use std::collections::HashSet;
use url::{Host, Url};

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";
const MAX_AGE: &str = "86400";

/// True when `origin` is a loopback host (any scheme, any port) or an exact
/// member of the configured allow set
pub fn is_origin_allowed(origin: &str, allowed: &HashSet<String>) -> bool {
    if origin.is_empty() {
        return false;
    }
    if allowed.contains(origin) {
        return true;
    }
    let Ok(url) = Url::parse(origin) else {
        return false;
    };
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// CORS middleware.
///
/// Allowed origins receive the full set of grant headers with the origin
/// echoed back verbatim. `OPTIONS` preflights short-circuit with 200 when
/// allowed and 403 otherwise; every other method continues regardless.
pub fn cors_middleware() -> Middleware {
    Box::new(|next: Handler| {
        handler_fn(move |mut ctx: RequestContext| {
            let next = next.clone();
            async move {
                let origin = ctx.header("Origin").unwrap_or_default().to_string();
                let allowed = is_origin_allowed(&origin, &ctx.config.allowed_origins);

                if allowed {
                    let headers = &mut ctx.response.headers;
                    headers.set("Access-Control-Allow-Origin", origin);
                    headers.set("Access-Control-Allow-Methods", ALLOW_METHODS);
                    headers.set("Access-Control-Allow-Headers", ALLOW_HEADERS);
                    headers.set("Access-Control-Allow-Credentials", "true");
                    headers.set("Access-Control-Max-Age", MAX_AGE);
                }

                if ctx.method == Method::OPTIONS {
                    ctx.response.status = if allowed { StatusCode::OK } else { StatusCode::FORBIDDEN };
                    return ctx;
                }

                next(ctx).await
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::chain;
    use crate::test_util::{ctx_with_config, marker_handler};
    use gatehouse_core::GatewayConfig;

    fn run_config() -> GatewayConfig {
        GatewayConfig {
            allowed_origins: HashSet::from(["https://dash.example.com".to_string()]),
            ..GatewayConfig::default()
        }
    }

    async fn run(method: Method, origin: Option<&str>) -> RequestContext {
        let handler = chain(marker_handler("downstream"), vec![cors_middleware()]);
        let mut ctx = ctx_with_config(method, "/v1/models", run_config());
        if let Some(origin) = origin {
            ctx.headers.append("Origin", origin);
        }
        handler(ctx).await
    }

    #[test]
    fn loopback_origins_are_allowed_on_any_port_and_scheme() {
        let allowed = HashSet::new();
        assert!(is_origin_allowed("http://localhost:3000", &allowed));
        assert!(is_origin_allowed("https://localhost", &allowed));
        assert!(is_origin_allowed("http://127.0.0.1:8080", &allowed));
        assert!(is_origin_allowed("http://[::1]:5173", &allowed));
    }

    #[test]
    fn non_loopback_origins_require_an_exact_allowlist_match() {
        let allowed = HashSet::from(["https://dash.example.com".to_string()]);
        assert!(is_origin_allowed("https://dash.example.com", &allowed));
        assert!(!is_origin_allowed("https://dash.example.com:444", &allowed));
        assert!(!is_origin_allowed("https://evil.example.com", &allowed));
        assert!(!is_origin_allowed("not a url", &allowed));
        assert!(!is_origin_allowed("", &allowed));
    }

    #[tokio::test]
    async fn allowed_origin_gets_grant_headers_and_continues() {
        let result = run(Method::GET, Some("http://localhost:3000")).await;

        let headers = &result.response.headers;
        assert_eq!(headers.get("Access-Control-Allow-Origin"), Some("http://localhost:3000"));
        assert_eq!(headers.get("Access-Control-Allow-Methods"), Some(ALLOW_METHODS));
        assert_eq!(headers.get("Access-Control-Allow-Headers"), Some(ALLOW_HEADERS));
        assert_eq!(headers.get("Access-Control-Allow-Credentials"), Some("true"));
        assert_eq!(headers.get("Access-Control-Max-Age"), Some("86400"));
        assert_eq!(result.response.body, "downstream");
    }

    #[tokio::test]
    async fn preflight_from_allowed_origin_short_circuits_ok() {
        let result = run(Method::OPTIONS, Some("https://dash.example.com")).await;

        assert_eq!(result.response.status, StatusCode::OK);
        assert!(result.response.headers.contains("Access-Control-Allow-Origin"));
        assert!(result.response.body.is_empty());
    }

    #[tokio::test]
    async fn preflight_from_disallowed_origin_is_forbidden() {
        let result = run(Method::OPTIONS, Some("https://evil.example.com")).await;

        assert_eq!(result.response.status, StatusCode::FORBIDDEN);
        assert!(!result.response.headers.contains("Access-Control-Allow-Origin"));
        assert!(result.response.body.is_empty());
    }

    #[tokio::test]
    async fn disallowed_origin_still_continues_for_normal_methods() {
        let result = run(Method::GET, Some("https://evil.example.com")).await;

        assert!(!result.response.headers.contains("Access-Control-Allow-Origin"));
        assert_eq!(result.response.body, "downstream");
    }

    #[tokio::test]
    async fn missing_origin_header_gets_no_grants() {
        let result = run(Method::GET, None).await;

        assert!(!result.response.headers.contains("Access-Control-Allow-Origin"));
        assert_eq!(result.response.body, "downstream");
    }
}
