//! HTTP request handlers outside the account flows.

pub mod http;

pub use http::*;
