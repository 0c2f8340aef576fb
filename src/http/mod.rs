//! HTTP client module
//!
//! Plain HTTP access to the dashboard origin and the GraphQL endpoint.

mod client;
#[cfg(test)]
pub mod stub;

pub use client::{HttpClient, HttpError, HttpRequest};
