//! Browser facing tier. Holds the admin session and talks to the internal
//! API over HTTP with the session's bearer token.

pub mod client;
pub mod gate;
mod routes;
pub mod session;

pub use client::{AdminProfile, ApiLoginResponse, InternalApiClient, ProxyError};
pub use gate::{AdminContext, GateError, admin_gate, wants_json};
pub use routes::router;
pub use session::{SESSION_COOKIE, Session, SessionStore, session_id};
