//! Bearer-token authentication and role guards.
//!
//! Tokens are issued elsewhere; this feature only verifies them and exposes
//! the resolved caller to handlers through request extensions.

mod validator;

pub mod guards;
pub mod model;

pub use validator::JwtValidator;
