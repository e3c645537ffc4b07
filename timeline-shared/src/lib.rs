//! Wire model shared between the timeline server and its clients.
//!
//! The `graphql` feature derives the GraphQL object/input types used by the
//! server schema; the `client` feature adds a small GraphQL-over-HTTP client.

pub mod api;
pub mod domain;
