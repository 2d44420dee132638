//! The boundary with the identity gateway.
//!
//! The gateway authenticates voters and hands them a signed token; this service
//! only verifies that token and reads the voter ID and registration claims from it.

mod claims;
mod token;

pub use claims::RegistrationClaims;
pub use token::{GatewayClaims, VoterToken, AUTH_TOKEN_COOKIE};

#[cfg(test)]
pub use token::examples::gateway_token;
