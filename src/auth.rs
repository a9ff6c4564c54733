//! Credentials and signed-in state: token parsing, token persistence, and the auth state
//! container built on top of the API client.

pub mod state;
pub mod token;

pub use state::*;
pub use token::{claims::*, secret::*, store::*};
