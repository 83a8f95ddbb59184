//! US postal-code lookup.
//!
//! Input is normalized and validated before any network call; a ZIP that
//! does not look like `12345` or `12345-6789` is rejected locally. The
//! provider response follows the zippopotam wire shape: top-level postal
//! and country fields plus a `places` array, first entry wins.

use super::types::{LookupError, PostalRecord};
use serde::Deserialize;
use std::time::Duration;

const POSTAL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
pub struct PostalResponse {
    #[serde(rename = "post code")]
    pub post_code: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "country abbreviation")]
    pub country_abbreviation: Option<String>,
    #[serde(default)]
    pub places: Vec<PostalPlace>,
}

#[derive(Debug, Deserialize)]
pub struct PostalPlace {
    #[serde(rename = "place name")]
    pub place_name: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "state abbreviation")]
    pub state_abbreviation: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// ZIP-to-location provider seam, mockable in tests.
pub trait PostalProvider: Send + Sync {
    fn fetch(&self, zip: &str) -> Result<PostalResponse, LookupError>;
}

/// api.zippopotam.us — `GET /us/{zip}` with an explicit 10s timeout.
#[derive(Debug, Default)]
pub struct ZippopotamUs;

impl PostalProvider for ZippopotamUs {
    fn fetch(&self, zip: &str) -> Result<PostalResponse, LookupError> {
        let url = format!("https://api.zippopotam.us/us/{}", zip);
        let response = ureq::get(&url)
            .set(
                "User-Agent",
                concat!("geolocus/", env!("CARGO_PKG_VERSION")),
            )
            .timeout(POSTAL_TIMEOUT)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => LookupError::Status(code),
                other => LookupError::Network(other.to_string()),
            })?;

        response
            .into_json()
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))
    }
}

pub struct PostalResolver {
    provider: Box<dyn PostalProvider>,
}

impl PostalResolver {
    pub fn new() -> Self {
        Self::with_provider(Box::new(ZippopotamUs))
    }

    pub fn with_provider(provider: Box<dyn PostalProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a US ZIP code to a structured record. Malformed input and
    /// every provider failure yield the empty record.
    pub fn resolve_us(&self, zip: &str) -> PostalRecord {
        let normalized = normalize_zip(zip);
        if !is_valid_us_zip(&normalized) {
            return PostalRecord::default();
        }

        let response = match self.provider.fetch(&normalized) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(zip = %normalized, error = %e, "postal lookup failed");
                return PostalRecord::default();
            }
        };

        let Some(place) = response.places.first() else {
            return PostalRecord::default();
        };

        PostalRecord {
            city: place.place_name.clone().unwrap_or_default(),
            region: place.state.clone().unwrap_or_default(),
            region_abbr: place.state_abbreviation.clone().unwrap_or_default(),
            country: response.country.clone().unwrap_or_default(),
            country_abbr: response.country_abbreviation.clone().unwrap_or_default(),
            postal_code: response.post_code.clone().unwrap_or_default(),
            latitude: place.latitude.clone().unwrap_or_default(),
            longitude: place.longitude.clone().unwrap_or_default(),
        }
    }
}

impl Default for PostalResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip everything except ASCII digits and hyphens.
fn normalize_zip(zip: &str) -> String {
    zip.chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect()
}

/// `12345` or `12345-6789`, nothing else.
fn is_valid_us_zip(zip: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match zip.split_once('-') {
        None => zip.len() == 5 && all_digits(zip),
        Some((front, back)) => {
            front.len() == 5 && all_digits(front) && back.len() == 4 && all_digits(back)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubPostal {
        body: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl StubPostal {
        fn new(body: Option<&'static str>) -> (Box<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Box::new(Self {
                    body,
                    calls: calls.clone(),
                }),
                calls,
            )
        }
    }

    impl PostalProvider for StubPostal {
        fn fetch(&self, _zip: &str) -> Result<PostalResponse, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.body {
                Some(body) => serde_json::from_str(body)
                    .map_err(|e| LookupError::InvalidResponse(e.to_string())),
                None => Err(LookupError::Status(404)),
            }
        }
    }

    const BEVERLY_HILLS: &str = r#"{
        "post code": "90210",
        "country": "United States",
        "country abbreviation": "US",
        "places": [{
            "place name": "Beverly Hills",
            "state": "CA",
            "state abbreviation": "CA",
            "latitude": "34.09",
            "longitude": "-118.41"
        }]
    }"#;

    #[test]
    fn test_normalize_strips_stray_characters() {
        assert_eq!(normalize_zip("90210 "), "90210");
        assert_eq!(normalize_zip(" 90210-1234\n"), "90210-1234");
        assert_eq!(normalize_zip("zip: 90210!"), "90210");
    }

    #[test]
    fn test_zip_validation() {
        assert!(is_valid_us_zip("90210"));
        assert!(is_valid_us_zip("90210-1234"));
        assert!(!is_valid_us_zip("1234"));
        assert!(!is_valid_us_zip("123456"));
        assert!(!is_valid_us_zip("90210-123"));
        assert!(!is_valid_us_zip("90210-12345"));
        assert!(!is_valid_us_zip(""));
        assert!(!is_valid_us_zip("-1234"));
    }

    #[test]
    fn test_malformed_zip_makes_no_network_call() {
        for bad in ["", "1234", "123456", "90210-123", "abcde"] {
            let (provider, calls) = StubPostal::new(Some(BEVERLY_HILLS));
            let resolver = PostalResolver::with_provider(provider);
            assert!(resolver.resolve_us(bad).is_empty(), "accepted {:?}", bad);
            assert_eq!(calls.load(Ordering::SeqCst), 0, "network call for {:?}", bad);
        }
    }

    #[test]
    fn test_valid_zip_with_stray_whitespace() {
        let (provider, calls) = StubPostal::new(Some(BEVERLY_HILLS));
        let resolver = PostalResolver::with_provider(provider);

        let record = resolver.resolve_us("90210 ");
        assert_eq!(record.city, "Beverly Hills");
        assert_eq!(record.region, "CA");
        assert_eq!(record.region_abbr, "CA");
        assert_eq!(record.country_abbr, "US");
        assert_eq!(record.postal_code, "90210");
        assert_eq!(record.latitude, "34.09");
        assert_eq!(record.longitude, "-118.41");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_plus_four_accepted() {
        let (provider, calls) = StubPostal::new(Some(BEVERLY_HILLS));
        let resolver = PostalResolver::with_provider(provider);
        assert!(!resolver.resolve_us("90210-1234").is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_provider_failure_yields_empty_record() {
        let (provider, _) = StubPostal::new(None);
        let resolver = PostalResolver::with_provider(provider);
        assert!(resolver.resolve_us("90210").is_empty());
    }

    #[test]
    fn test_empty_places_yields_empty_record() {
        let (provider, _) = StubPostal::new(Some(
            r#"{"post code": "90210", "country": "United States", "places": []}"#,
        ));
        let resolver = PostalResolver::with_provider(provider);
        assert!(resolver.resolve_us("90210").is_empty());
    }

    #[test]
    fn test_missing_keys_default_to_empty_strings() {
        let (provider, _) = StubPostal::new(Some(
            r#"{"places": [{"place name": "Beverly Hills"}]}"#,
        ));
        let resolver = PostalResolver::with_provider(provider);

        let record = resolver.resolve_us("90210");
        assert_eq!(record.city, "Beverly Hills");
        assert_eq!(record.region, "");
        assert_eq!(record.country, "");
        assert_eq!(record.postal_code, "");
    }

    #[test]
    fn test_idempotent_for_identical_responses() {
        let (provider, _) = StubPostal::new(Some(BEVERLY_HILLS));
        let resolver = PostalResolver::with_provider(provider);

        let first = resolver.resolve_us("90210");
        let second = resolver.resolve_us("90210");
        assert_eq!(first, second);
    }
}
