//! Access/refresh token handling.

pub mod claims;
pub mod secret;
pub mod store;
