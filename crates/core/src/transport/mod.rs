//! HTTP transport abstraction.
//!
//! This module provides a `Transport` trait so the lookup, redemption and
//! notification steps can run against reqwest in production and a scripted
//! mock in tests.

mod http;
mod types;

pub use http::HttpTransport;
pub use types::*;
