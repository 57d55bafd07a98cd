//! Session gateway implementations.

pub mod http;

pub use http::HttpSessionGateway;
