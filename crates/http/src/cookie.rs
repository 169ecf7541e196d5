//! Admin credential cookie

use chrono::{DateTime, Utc};

/// A `Set-Cookie` payload for the admin credential.
///
/// Only the attributes the admin flow uses are modeled. Session cookies
/// carry no expiry; clearing a cookie pins `Expires` to the epoch and a
/// negative `Max-Age` for clients that prefer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub http_only: bool,
    pub expires: Option<DateTime<Utc>>,
    pub max_age: Option<i64>,
}

impl AuthCookie {
    /// Session-scoped credential cookie
    pub fn session(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            http_only: true,
            expires: None,
            max_age: None,
        }
    }

    /// Expired cookie clearing any stored credential
    pub fn expired(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            path: "/".to_string(),
            http_only: true,
            expires: Some(DateTime::UNIX_EPOCH),
            max_age: Some(-1),
        }
    }

    /// Serialize to a `Set-Cookie` header value
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(expires) = self.expires {
            out.push_str("; Expires=");
            out.push_str(&expires.format("%a, %d %b %Y %H:%M:%S GMT").to_string());
        }
        if let Some(max_age) = self.max_age {
            out.push_str(&format!("; Max-Age={max_age}"));
        }
        out.push_str("; Path=");
        out.push_str(&self.path);
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_has_no_expiry() {
        let value = AuthCookie::session("bf_admin", "s3cr3t").to_header_value();
        assert_eq!(value, "bf_admin=s3cr3t; Path=/; HttpOnly");
    }

    #[test]
    fn expired_cookie_clears_the_value() {
        let value = AuthCookie::expired("bf_admin").to_header_value();
        assert_eq!(
            value,
            "bf_admin=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=-1; Path=/; HttpOnly"
        );
    }
}
