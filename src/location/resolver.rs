//! Geolocation resolver — one parameterized pipeline over the sources.
//!
//! Stage order: injected GeoIP variables → primary provider → fallback
//! provider. Later stages run only while the country is still empty, and
//! a stage never overwrites a field an earlier stage already set.
//!
//! The resolver is infallible by contract: provider failures collapse to
//! "no data" and at worst the caller receives a record of empty strings.

use crate::context::{
    EnvRequestContext, RequestContext, GEOIP_CITY, GEOIP_COUNTRY_CODE, GEOIP_COUNTRY_NAME,
    GEOIP_POSTAL_CODE, GEOIP_REGION,
};

use super::providers::{self, GeoProvider};
use super::types::{LocationRecord, LocationSource, ResolvedGeo};

pub struct GeoResolver {
    context: Box<dyn RequestContext>,
    providers: Vec<Box<dyn GeoProvider>>,
    offline: bool,
}

impl GeoResolver {
    /// Resolver over the process environment and the default provider
    /// chain.
    pub fn new() -> Self {
        Self::with_parts(Box::new(EnvRequestContext), providers::default_chain())
    }

    /// Resolver with an explicit context and provider chain.
    pub fn with_parts(
        context: Box<dyn RequestContext>,
        providers: Vec<Box<dyn GeoProvider>>,
    ) -> Self {
        Self {
            context,
            providers,
            offline: false,
        }
    }

    /// Skip all provider calls; only injected variables are consulted.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Resolve a location record for `ip` (or the request's client IP).
    pub fn resolve(&self, ip: Option<&str>) -> LocationRecord {
        self.resolve_with_source(ip).record
    }

    /// Resolve with provenance: which stage supplied the country.
    pub fn resolve_with_source(&self, ip: Option<&str>) -> ResolvedGeo {
        let mut record = self.injected_record();
        let mut source = if record.country.is_empty() {
            LocationSource::Unresolved
        } else {
            LocationSource::Injected
        };

        if record.country.is_empty() && !self.offline {
            if let Some(ip) = self.effective_ip(ip) {
                for (index, provider) in self.providers.iter().enumerate() {
                    if !record.country.is_empty() {
                        break;
                    }
                    match provider.lookup(&ip) {
                        Ok(fields) => {
                            fields.merge_into(&mut record);
                            if !record.country.is_empty() {
                                source = stage_source(index);
                            }
                        }
                        Err(e) => {
                            tracing::debug!(provider = provider.name(), %ip, error = %e, "geolocation lookup failed");
                        }
                    }
                }
            }
        }

        ResolvedGeo { record, source }
    }

    /// Whether the IP resolves to the United States. Fails closed: no
    /// IP, offline mode, or all-provider failure all yield `false`.
    pub fn is_us(&self, ip: Option<&str>) -> bool {
        // An injected country code settles it without any network call.
        if let Some(code) = self.context.var_nonempty(GEOIP_COUNTRY_CODE) {
            return code == "US";
        }

        if self.offline {
            return false;
        }

        let Some(ip) = self.effective_ip(ip) else {
            return false;
        };

        for provider in &self.providers {
            match provider.lookup(&ip) {
                Ok(fields) => {
                    if let Some(code) = fields.country_code.as_deref().map(str::trim) {
                        if !code.is_empty() {
                            return code == "US";
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(provider = provider.name(), %ip, error = %e, "country check failed");
                }
            }
        }

        false
    }

    /// Seed the record from injected GeoIP variables. Each field is read
    /// independently; partial availability is normal.
    fn injected_record(&self) -> LocationRecord {
        let country = self
            .context
            .var_nonempty(GEOIP_COUNTRY_NAME)
            .or_else(|| self.context.var_nonempty(GEOIP_COUNTRY_CODE))
            .unwrap_or_default();

        LocationRecord {
            city: self.context.var_nonempty(GEOIP_CITY).unwrap_or_default(),
            region: self.context.var_nonempty(GEOIP_REGION).unwrap_or_default(),
            country,
            postal_code: self
                .context
                .var_nonempty(GEOIP_POSTAL_CODE)
                .unwrap_or_default(),
        }
    }

    fn effective_ip(&self, ip: Option<&str>) -> Option<String> {
        match ip.map(str::trim).filter(|s| !s.is_empty()) {
            Some(ip) => Some(ip.to_string()),
            None => self.context.client_ip(),
        }
    }
}

impl Default for GeoResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn stage_source(index: usize) -> LocationSource {
    if index == 0 {
        LocationSource::Primary
    } else {
        LocationSource::Fallback
    }
}
