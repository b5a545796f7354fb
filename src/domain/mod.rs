//! Domain layer: entities, ports, and the error taxonomy they share.
//!
//! Nothing under `domain` depends on `sqlx`, `reqwest`, or `axum` directly
//! — those live in `infrastructure` and are wired in behind the traits
//! declared in `domain::ports`.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CoreError, CoreResult};
