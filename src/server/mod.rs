//! # Server Module
//!
//! HTTP plumbing around the mux: request parsing, response flushing, the
//! `may_minihttp` service adapter, and a typed server lifecycle handle.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_query_params, parse_request, ParsedRequest};
pub use service::RouterService;
