//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which stage of the pipeline supplied the country field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    /// GeoIP variables injected by the hosting environment.
    Injected,
    /// First external geolocation provider.
    Primary,
    /// Second external geolocation provider.
    Fallback,
    /// No stage produced a country. The record may still be all-empty
    /// because every provider failed, not because the IP is unknown.
    Unresolved,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Injected => write!(f, "injected"),
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// A resolved location. Absence of data is an empty string, never null;
/// an all-empty record means "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub city: String,
    pub region: String,
    pub country: String,
    pub postal_code: String,
}

impl LocationRecord {
    pub fn is_empty(&self) -> bool {
        self.city.is_empty()
            && self.region.is_empty()
            && self.country.is_empty()
            && self.postal_code.is_empty()
    }
}

/// A location record together with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedGeo {
    pub record: LocationRecord,
    pub source: LocationSource,
}

/// Structured postal lookup result. Latitude and longitude are kept as
/// the provider's strings, not parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalRecord {
    pub city: String,
    pub region: String,
    pub region_abbr: String,
    pub country: String,
    pub country_abbr: String,
    pub postal_code: String,
    pub latitude: String,
    pub longitude: String,
}

impl PostalRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Partial fields returned by one geolocation provider. `None` means the
/// provider did not supply the field.
#[derive(Debug, Clone, Default)]
pub struct GeoFields {
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

impl GeoFields {
    /// Fill still-empty fields of `record`; never overwrite a set field.
    pub fn merge_into(&self, record: &mut LocationRecord) {
        fill(&mut record.country, self.country.as_deref());
        fill(&mut record.region, self.region.as_deref());
        fill(&mut record.city, self.city.as_deref());
        fill(&mut record.postal_code, self.postal_code.as_deref());
    }
}

fn fill(slot: &mut String, value: Option<&str>) {
    if slot.is_empty() {
        if let Some(v) = value {
            let v = v.trim();
            if !v.is_empty() {
                *slot = v.to_string();
            }
        }
    }
}

/// Failures internal to a single provider call. Callers of the resolvers
/// never see these; they collapse to "no data".
#[derive(Debug)]
pub enum LookupError {
    Network(String),
    Status(u16),
    InvalidResponse(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::Status(code) => write!(f, "unexpected HTTP status {}", code),
            Self::InvalidResponse(msg) => write!(f, "invalid API response: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}
