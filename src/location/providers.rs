//! External geolocation providers.
//!
//! Two IP-to-location JSON APIs with differently shaped responses. They
//! are consumed through the `GeoProvider` trait so the resolver pipeline
//! and the tests never depend on a concrete endpoint.

use super::types::{GeoFields, LookupError};
use serde::Deserialize;

const USER_AGENT: &str = concat!("geolocus/", env!("CARGO_PKG_VERSION"));

/// One stage of the external resolution pipeline.
pub trait GeoProvider: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Look up an IP address. Partial results are fine; every field is
    /// optional.
    fn lookup(&self, ip: &str) -> Result<GeoFields, LookupError>;
}

fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, LookupError> {
    let response = ureq::get(url)
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| match e {
            ureq::Error::Status(code, _) => LookupError::Status(code),
            other => LookupError::Network(other.to_string()),
        })?;

    response
        .into_json()
        .map_err(|e| LookupError::InvalidResponse(e.to_string()))
}

// ─── Primary provider (ipapi.co) ────────────────────────────────

#[derive(Deserialize)]
struct IpApiCoBody {
    country_name: Option<String>,
    country_code: Option<String>,
    region: Option<String>,
    city: Option<String>,
    postal: Option<String>,
}

/// ipapi.co — `GET /{ip}/json/`. Supplies all four record fields.
#[derive(Debug, Default)]
pub struct IpApiCo;

impl GeoProvider for IpApiCo {
    fn name(&self) -> &'static str {
        "ipapi.co"
    }

    fn lookup(&self, ip: &str) -> Result<GeoFields, LookupError> {
        let url = format!("https://ipapi.co/{}/json/", ip);
        let body: IpApiCoBody = fetch_json(&url)?;
        Ok(GeoFields {
            country: body.country_name,
            country_code: body.country_code,
            region: body.region,
            city: body.city,
            postal_code: body.postal,
        })
    }
}

// ─── Fallback provider (ipwho.is) ───────────────────────────────

#[derive(Deserialize)]
struct IpWhoIsBody {
    country: Option<String>,
    country_code: Option<String>,
    region: Option<String>,
    city: Option<String>,
}

/// ipwho.is — `GET /{ip}`. No postal code in the consumed shape.
#[derive(Debug, Default)]
pub struct IpWhoIs;

impl GeoProvider for IpWhoIs {
    fn name(&self) -> &'static str {
        "ipwho.is"
    }

    fn lookup(&self, ip: &str) -> Result<GeoFields, LookupError> {
        let url = format!("https://ipwho.is/{}", ip);
        let body: IpWhoIsBody = fetch_json(&url)?;
        Ok(GeoFields {
            country: body.country,
            country_code: body.country_code,
            region: body.region,
            city: body.city,
            postal_code: None,
        })
    }
}

/// The fixed provider chain: ipapi.co first, ipwho.is as fallback.
pub fn default_chain() -> Vec<Box<dyn GeoProvider>> {
    vec![Box::new(IpApiCo), Box::new(IpWhoIs)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_body_parses_partial_json() {
        let body: IpApiCoBody =
            serde_json::from_str(r#"{"country_name": "United States", "city": "Beverly Hills"}"#)
                .unwrap();
        assert_eq!(body.country_name.as_deref(), Some("United States"));
        assert!(body.region.is_none());
        assert!(body.postal.is_none());
    }

    #[test]
    fn test_fallback_body_ignores_extra_fields() {
        let body: IpWhoIsBody = serde_json::from_str(
            r#"{"success": true, "country": "Sweden", "country_code": "SE",
                "region": "Stockholm County", "city": "Stockholm", "postal": "111 20"}"#,
        )
        .unwrap();
        assert_eq!(body.country_code.as_deref(), Some("SE"));
        assert_eq!(body.city.as_deref(), Some("Stockholm"));
    }

    #[test]
    fn test_default_chain_order() {
        let chain = default_chain();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].name(), "ipapi.co");
        assert_eq!(chain[1].name(), "ipwho.is");
    }
}
