//! Weather data and collaborators for Skycast
//!
//! Defines the forecast model, a tolerant parser for the provider payload and
//! the capabilities the resolver consumes: weather fetching, positioning and
//! connectivity probing.

pub mod client;
pub mod connectivity;
pub mod location;
pub mod types;
pub mod wire;

pub use client::{FetchError, WeatherApiClient, WeatherClient};
pub use connectivity::{ConnectivityProbe, TcpReachabilityProbe};
pub use location::{FixedLocationProvider, LocationError, LocationProvider};
pub use types::*;
pub use wire::{parse_forecast, ParseError};
