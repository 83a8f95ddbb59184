use crate::location::{GeoResolver, PostalResolver};
use std::sync::Mutex;

pub struct AppState {
    pub resolver: Mutex<GeoResolver>,
    pub postal: PostalResolver,
}
