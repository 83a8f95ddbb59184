//! Request context abstraction.
//!
//! The hosting environment injects per-request data (client address,
//! GeoIP variables resolved by an upstream appliance, HTTP host) as
//! server variables. Everything in this crate reads them through the
//! `RequestContext` trait instead of touching process globals, so tests
//! and embedders can supply their own.

use std::collections::HashMap;

/// Country code injected by a GeoIP appliance (ISO 3166-1 alpha-2).
pub const GEOIP_COUNTRY_CODE: &str = "GEOIP_COUNTRY_CODE";
/// Full country name injected by a GeoIP appliance.
pub const GEOIP_COUNTRY_NAME: &str = "GEOIP_COUNTRY_NAME";
pub const GEOIP_REGION: &str = "GEOIP_REGION";
pub const GEOIP_CITY: &str = "GEOIP_CITY";
pub const GEOIP_POSTAL_CODE: &str = "GEOIP_POSTAL_CODE";

/// Access to the ambient request environment.
pub trait RequestContext: Send + Sync {
    /// Raw server variable, `None` if unset.
    fn var(&self, name: &str) -> Option<String>;

    /// Server variable, trimmed, with empty values treated as unset.
    fn var_nonempty(&self, name: &str) -> Option<String> {
        self.var(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Best-effort client IP: explicit client header, then the first
    /// entry of the forwarded chain, then the socket peer address.
    fn client_ip(&self) -> Option<String> {
        if let Some(ip) = self.var_nonempty("HTTP_CLIENT_IP") {
            return Some(ip);
        }
        if let Some(chain) = self.var_nonempty("HTTP_X_FORWARDED_FOR") {
            let first = chain.split(',').next().unwrap_or("").trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
        self.var_nonempty("REMOTE_ADDR")
    }
}

/// Context backed by process environment variables — the shape the
/// hosting runtime actually provides.
#[derive(Debug, Default)]
pub struct EnvRequestContext;

impl RequestContext for EnvRequestContext {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed in-memory context for tests and CLI invocations.
#[derive(Debug, Default, Clone)]
pub struct FixedContext {
    vars: HashMap<String, String>,
}

impl FixedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }
}

impl RequestContext for FixedContext {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_prefers_client_header() {
        let ctx = FixedContext::new()
            .with_var("HTTP_CLIENT_IP", "203.0.113.7")
            .with_var("REMOTE_ADDR", "10.0.0.1");
        assert_eq!(ctx.client_ip(), Some("203.0.113.7".to_string()));
    }

    #[test]
    fn test_client_ip_forwarded_chain_takes_first() {
        let ctx = FixedContext::new()
            .with_var("HTTP_X_FORWARDED_FOR", "198.51.100.4, 10.0.0.2")
            .with_var("REMOTE_ADDR", "10.0.0.1");
        assert_eq!(ctx.client_ip(), Some("198.51.100.4".to_string()));
    }

    #[test]
    fn test_client_ip_falls_back_to_remote_addr() {
        let ctx = FixedContext::new().with_var("REMOTE_ADDR", "192.0.2.9");
        assert_eq!(ctx.client_ip(), Some("192.0.2.9".to_string()));
    }

    #[test]
    fn test_client_ip_none() {
        assert_eq!(FixedContext::new().client_ip(), None);
    }

    #[test]
    fn test_var_nonempty_treats_blank_as_unset() {
        let ctx = FixedContext::new().with_var(GEOIP_CITY, "   ");
        assert!(ctx.var_nonempty(GEOIP_CITY).is_none());
        assert!(ctx.var(GEOIP_CITY).is_some());
    }
}
