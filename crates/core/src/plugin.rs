//! Plugin contract for the edge layer
//!
//! Plugins are carried in the runtime configuration and observed through
//! immutable per-request snapshots. A plugin that rewrites forwarded requests
//! exposes the [`TransportInterceptor`] capability; plugins without it ride
//! along in the registry untouched.

use crate::error::PluginResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// JSON object payload flowing through the interception pipeline
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// A registered gateway extension
pub trait GatewayPlugin: Send + Sync {
    /// Stable plugin name, used in logs
    fn name(&self) -> &str;

    /// Request interception capability, for plugins that rewrite forwarded
    /// requests. The default exposes none.
    fn transport_interceptor(&self) -> Option<&dyn TransportInterceptor> {
        None
    }
}

/// Capability to rewrite request headers and body before forwarding.
///
/// Interceptors run sequentially in registration order. Each receives the
/// cumulative output of its predecessors and returns replacement values
/// wholesale; partial edits are expressed by cloning and adjusting the inputs.
#[async_trait]
pub trait TransportInterceptor: Send + Sync {
    /// Transform the header map and JSON body for one request.
    ///
    /// `request_uri` is the full request target, path plus query string when
    /// one is present.
    async fn intercept(
        &self,
        request_uri: &str,
        headers: &HashMap<String, String>,
        body: &JsonObject,
    ) -> PluginResult<(HashMap<String, String>, JsonObject)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Passive;

    impl GatewayPlugin for Passive {
        fn name(&self) -> &str {
            "passive"
        }
    }

    struct Tagging;

    impl GatewayPlugin for Tagging {
        fn name(&self) -> &str {
            "tagging"
        }

        fn transport_interceptor(&self) -> Option<&dyn TransportInterceptor> {
            Some(self)
        }
    }

    #[async_trait]
    impl TransportInterceptor for Tagging {
        async fn intercept(
            &self,
            _request_uri: &str,
            headers: &HashMap<String, String>,
            body: &JsonObject,
        ) -> PluginResult<(HashMap<String, String>, JsonObject)> {
            let mut headers = headers.clone();
            headers.insert("X-Tag".to_string(), "1".to_string());
            Ok((headers, body.clone()))
        }
    }

    #[test]
    fn interception_capability_defaults_to_none() {
        let plugin = Passive;
        assert!(plugin.transport_interceptor().is_none());
    }

    #[tokio::test]
    async fn interceptor_returns_replacement_state() {
        let plugin = Tagging;
        let interceptor = plugin.transport_interceptor().unwrap();

        let headers = HashMap::from([("Accept".to_string(), "*/*".to_string())]);
        let body = JsonObject::new();
        let (headers, body) = interceptor.intercept("/v1/chat", &headers, &body).await.unwrap();

        assert_eq!(headers.get("X-Tag").map(String::as_str), Some("1"));
        assert_eq!(headers.get("Accept").map(String::as_str), Some("*/*"));
        assert!(body.is_empty());
    }
}
