//! Authentication module
//!
//! Supports: Basic, Bearer, Custom Headers
//!
//! Credentials are applied to every request the transport sends. How the
//! server validates them is outside this crate.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;
