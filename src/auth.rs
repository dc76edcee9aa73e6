//! Auth-domain primitives: the cached bearer token and the grant selector.

pub mod grant;
pub mod token;

pub use grant::*;
pub use token::*;
