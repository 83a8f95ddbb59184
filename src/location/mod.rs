//! Location subsystem.
//!
//! IP-based geolocation through injected GeoIP variables and a fixed
//! external provider chain, plus structured US postal-code lookup.

pub mod postal;
pub mod providers;
pub mod resolver;
pub mod types;

pub use postal::{PostalProvider, PostalResolver, ZippopotamUs};
pub use providers::{default_chain, GeoProvider, IpApiCo, IpWhoIs};
pub use resolver::GeoResolver;
pub use types::{GeoFields, LocationRecord, LocationSource, LookupError, PostalRecord, ResolvedGeo};
