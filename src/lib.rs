//! geolocus — request-scoped geolocation utilities.
//!
//! Resolves a client IP to a city/region/country/postal record through a
//! fixed-order pipeline (injected GeoIP variables, then two external
//! providers), looks up structured US postal-code data, and exposes small
//! environment-detection helpers. All ambient state is reached through
//! the [`context::RequestContext`] trait.

pub mod context;
pub mod environment;
pub mod location;
pub mod server;

pub use context::{EnvRequestContext, FixedContext, RequestContext};
pub use location::{GeoResolver, LocationRecord, PostalRecord, PostalResolver};
