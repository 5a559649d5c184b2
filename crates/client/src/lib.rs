//! Clients for the services a rule pass talks to.
//!
//! This crate provides:
//! - `RuleStore`, `TokenIssuer`, and `ActionApi` traits for the external collaborators
//! - `ApiClient`, the GraphQL/REST implementation of the rule store and action APIs
//! - `JwtTokenIssuer`, which signs per-user bearer tokens

pub mod auth;
pub mod graphql;
pub mod traits;
mod wire;

pub use auth::JwtTokenIssuer;
pub use graphql::ApiClient;
pub use traits::{ActionApi, ClientError, RuleStore, TokenIssuer};
