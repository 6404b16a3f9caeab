//! GraphQL API client module for the inkpost server.
//!
//! This module provides the `ApiClient` for issuing the query and mutation
//! documents the front-end needs. Every request is a JSON POST of
//! `{query, variables}` to a single endpoint; every response is a
//! `{data: {<Operation>: {...}}}` envelope whose payload carries its own
//! `success` flag.
//!
//! Requests go through the `Transport` trait so the client can be exercised
//! without a network.

pub mod client;
pub mod error;
pub mod graphql;
pub mod transport;

pub use client::{ApiClient, PostLookup, PostMutation};
pub use error::ApiError;
pub use graphql::{GraphqlRequest, Operation};
pub use transport::{HttpTransport, RawReply, Transport};
