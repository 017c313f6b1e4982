//! The API deployed as one function per endpoint.
//!
//! [`api`] mirrors the endpoint tree, one module per path. [`host`] is a thin axum service
//! standing in for the function platform: it resolves each request to its function and invokes
//! it with a fresh [`Invocation`].

pub mod api;
pub mod host;
pub mod invocation;

pub use invocation::{FunctionRequest, Invocation};
