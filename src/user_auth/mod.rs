//! Identity provider
//!
//! Registration and login over the `users` table, HS256 bearer tokens, and
//! the middleware that turns a token into a [`Caller`] request extension.

pub mod handlers;
pub mod middleware;
pub mod service;

pub use middleware::{Caller, jwt_auth_middleware};
pub use service::{
    AuthError, AuthResponse, Claims, LoginRequest, RegisterRequest, TokenIssuer, UserAuthService,
};
