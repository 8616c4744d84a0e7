//! # Switchback
//!
//! **Switchback** is a coroutine-powered HTTP request router built on a
//! backtracking path trie with composable middleware chains.
//!
//! ## Overview
//!
//! Routes are patterns of literal segments, `:name` parameters, and trailing
//! `*name` wildcards. Matching prefers the most specific branch per segment
//! (literal over parameter over wildcard) and backtracks through parent
//! references when a greedy descent dead-ends, so a less specific route
//! shadowed at one level can still win the full path. Handlers are composed
//! with middleware at registration time; dispatch runs one pre-composed
//! chain with no per-request allocation beyond the pooled capture sink.
//!
//! ## Architecture
//!
//! - **[`trie`]** - The route tree: arena-allocated nodes, backtracking
//!   search, path cleaning
//! - **[`chain`]** - Handler and middleware types plus the composition
//!   function and built-in wrappers (CORS, request logging)
//! - **[`mux`]** - The registration and dispatch facade: groups, middleware
//!   stacks, method fallbacks, error mapping
//! - **[`context`]** - The per-request value handed to handlers
//! - **[`params`]** - Captured path parameters and their reuse pool
//! - **[`server`]** - HTTP plumbing on `may_minihttp`
//! - **[`error`]** - Typed handler errors carrying HTTP status codes
//!
//! ## Example
//!
//! ```rust
//! use switchback::{handler_fn, Mux};
//! use http::Method;
//!
//! let mut mux = Mux::new();
//! mux.get("/users/:id", handler_fn(|ctx| {
//!     let id = ctx.param("id").unwrap_or("unknown").to_string();
//!     ctx.text(&id);
//!     Ok(())
//! }));
//!
//! let mut ctx = switchback::Context::new(Method::GET, "/users/42");
//! mux.dispatch(&mut ctx);
//! assert_eq!(ctx.response_body(), b"42");
//! ```

pub mod chain;
pub mod context;
pub mod error;
pub mod mux;
pub mod params;
pub mod server;
pub mod trie;

pub use chain::{connect, cors, handler_fn, logging, wrapper_fn, Handler, Wrapper};
pub use context::Context;
pub use error::HttpError;
pub use mux::Mux;
pub use params::{ParamPool, PathParams};
pub use server::{HttpServer, RouterService, ServerHandle};
pub use trie::{any_method, clean_path, NodeId, NodeKind, RouteTrie};
