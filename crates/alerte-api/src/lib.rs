//! alerte-api — account service client and session glue for MonAlerte.
//!
//! [`client::AuthClient`] is the thin REST surface (login, registration,
//! password reset). [`session::Session`] ties it to the credential cache:
//! a successful login or registration persists the token+email pair through
//! every cache tier, logout clears them, and app start restores the prior
//! session from whichever tier survived.

pub mod client;
pub mod logging;
pub mod session;

pub use client::{AuthApi, AuthClient, AuthResponse, RegisterRequest};
pub use session::Session;
