//! HTTP-facing infrastructure: the minimal health surface and the
//! reqwest-backed webhook sender. Everything else an API gateway would
//! normally front (JWKS validation, CORS, security headers) lives outside
//! this crate; see `infrastructure::auth` for the `Claims` shape it hands
//! us.

pub mod health;
pub mod webhook_sender;

pub use health::health_router;
pub use webhook_sender::ReqwestWebhookSender;
