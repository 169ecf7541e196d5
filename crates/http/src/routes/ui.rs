//! Embedded admin UI and the login flow
//!
//! Serves a single-page application out of the in-memory asset bundle with
//! client-side routing fallback, and implements the cookie-based login and
//! logout endpoints the admin gate redirects browsers to.

use crate::context::RequestContext;
use crate::cookie::AuthCookie;
use crate::error::{HttpError, send_error};
use gatehouse_core::AssetBundle;
use http::StatusCode;
use std::sync::Arc;

/// Serves the embedded UI bundle and the admin login/logout flow
#[derive(Debug, Clone)]
pub struct UiHandler {
    assets: Arc<AssetBundle>,
}

impl UiHandler {
    /// Create a handler over `assets`
    pub fn new(assets: Arc<AssetBundle>) -> Self {
        Self { assets }
    }

    /// Resolve `ctx.path` against the asset bundle.
    ///
    /// Extensionless paths are treated as client-side routes: a miss falls
    /// back to the route's own `index.html` and then to the bundle root
    /// `index.html`. Paths whose last segment carries an extension are
    /// static assets and miss with a plain 404 instead, so a broken script
    /// reference never receives an HTML page.
    pub fn serve_dashboard(&self, ctx: &mut RequestContext) {
        let request_path = ctx.path.clone();
        let mut clean = clean_path(&request_path);

        // Route-data files pair a client route with `<route>/index.txt`.
        if let Some(base) = clean.strip_suffix(".txt") {
            let base = if base.is_empty() || base == "/" { "/index" } else { base };
            clean = format!("{base}/index.txt");
        }

        let root = self.assets.root();
        let mut resolved = if clean == "/" {
            format!("{root}/index.html")
        } else {
            format!("{root}{clean}")
        };

        let is_asset = resolved
            .rsplit('/')
            .next()
            .is_some_and(|segment| segment.contains('.'));

        let data = match self.assets.get(&resolved) {
            Some(data) => Some(data),
            None if is_asset => {
                ctx.respond_text(
                    StatusCode::NOT_FOUND,
                    format!("404 - static asset not found: {request_path}"),
                );
                return;
            }
            None => {
                let route_index = format!("{resolved}/index.html");
                let root_index = format!("{root}/index.html");
                if let Some(data) = self.assets.get(&route_index) {
                    resolved = route_index;
                    Some(data)
                } else if let Some(data) = self.assets.get(&root_index) {
                    resolved = root_index;
                    Some(data)
                } else {
                    None
                }
            }
        };

        let Some(data) = data else {
            ctx.respond_text(StatusCode::NOT_FOUND, "404 - file not found");
            return;
        };

        let content_type = mime_guess::from_path(&resolved).first_or_octet_stream();
        ctx.response.status = StatusCode::OK;
        ctx.response.headers.set("Content-Type", content_type.as_ref());
        ctx.response
            .headers
            .set("Cache-Control", cache_policy(&resolved, self.assets.immutable_prefix()));
        ctx.response.body = data;
    }

    /// Render the login form.
    ///
    /// The post-login target comes from the `next` query parameter and is
    /// carried through the form as a hidden field.
    pub fn login_page(&self, ctx: &mut RequestContext) {
        let next = ctx
            .query_param("next")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "/".to_string());
        ctx.respond_html(StatusCode::OK, login_form(&next, None));
    }

    /// Validate the submitted password and establish the admin cookie
    pub fn login_submit(&self, ctx: &mut RequestContext) {
        let config = ctx.config.clone();
        if config.admin_disabled() {
            send_error(
                ctx,
                HttpError::ServiceUnavailable("admin authentication is not configured".to_string()),
            );
            return;
        }

        let password = ctx.form_param("password").unwrap_or_default();
        let mut next = ctx.form_param("next").unwrap_or_default();
        if password.is_empty() {
            send_error(ctx, HttpError::BadRequest("password is required".to_string()));
            return;
        }
        if password != config.admin_secret {
            let target = if next.is_empty() { "/" } else { next.as_str() };
            ctx.respond_html(StatusCode::UNAUTHORIZED, login_form(target, Some("Invalid password")));
            return;
        }

        let cookie = AuthCookie::session(config.cookie_name(), &config.admin_secret);
        ctx.response.headers.append("Set-Cookie", cookie.to_header_value());

        // Absolute URLs are rejected to keep the redirect on this host.
        if next.is_empty() || next.contains("://") {
            next = "/".to_string();
        }
        ctx.respond_redirect(&next);
    }

    /// Clear the admin cookie and bounce back to the login page
    pub fn logout(&self, ctx: &mut RequestContext) {
        let cookie = AuthCookie::expired(ctx.config.cookie_name());
        ctx.response.headers.append("Set-Cookie", cookie.to_header_value());
        ctx.respond_redirect("/admin/login");
    }
}

/// Cache policy for a resolved bundle path
fn cache_policy(resolved: &str, immutable_prefix: &str) -> &'static str {
    if resolved.starts_with(immutable_prefix) {
        "public, max-age=31536000, immutable"
    } else if resolved.ends_with(".html") {
        "no-cache"
    } else {
        "public, max-age=3600"
    }
}

/// Lexically normalize a request path: resolve `.` and `..` segments and
/// collapse repeated slashes. The result always starts with `/` and `..`
/// never climbs above the root.
fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Minimal HTML escape for text interpolated into the login page
fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn login_form(next: &str, error: Option<&str>) -> String {
    let error_line = error
        .map(|message| format!("<p class=\"error\">{}</p>\n", html_escape(message)))
        .unwrap_or_default();
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Admin Login</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 420px; margin: 10vh auto; padding: 0 24px; }}
form {{ display: flex; flex-direction: column; gap: 12px; }}
input[type=password] {{ padding: 10px; font-size: 16px; }}
button {{ padding: 10px 14px; font-size: 16px; cursor: pointer; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<h2>Admin Login</h2>
{error_line}<form method="post" action="/admin/login">
<input type="hidden" name="next" value="{next}">
<label for="password">Password</label>
<input type="password" id="password" name="password" autofocus required>
<button type="submit">Sign in</button>
</form>
</body>
</html>
"#,
        next = html_escape(next),
    )
}
