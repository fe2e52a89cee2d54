//! Location-to-forecast resolution for Skycast.
//!
//! [`ForecastResolver`] owns the refresh pipeline and is the only writer of
//! the resolver-owned fields of [`AppState`]; the presentation layer observes
//! the state through [`StateStore::subscribe`] and forwards user intents back
//! into the resolver.

pub mod app_state;
pub mod bootstrap;
pub mod error_mapping;
pub mod notice;
pub mod permission;
pub mod resolver;

pub use app_state::{AppState, Fallback, StateStore};
pub use bootstrap::bootstrap;
pub use notice::Notice;
pub use permission::PermissionGate;
pub use resolver::{AttemptId, ForecastResolver, ResolverSettings};
