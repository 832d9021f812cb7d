//! Admin identity: token issuing and the bearer check guarding the
//! internal API.

mod middleware;
mod token;

pub use middleware::{bearer_token, require_bearer};
pub use token::{AdminClaims, TokenError, TokenIssuer, TokenKind, TokenPair, expires_at};
