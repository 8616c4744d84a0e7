//! # Chain Module
//!
//! Middleware composition for the router. A [`Handler`] is a shared callable
//! over the request [`Context`](crate::context::Context); a [`Wrapper`] takes
//! the next handler in the chain and returns a new one around it.
//!
//! [`connect`] applies wrappers in reverse registration order, so the
//! first-registered wrapper ends up outermost: its pre-logic runs first and
//! it can short-circuit without ever invoking the inner chain (the built-in
//! [`cors`] wrapper answers preflights this way).

mod builtin;
mod core;

pub use builtin::{cors, logging};
pub use core::{connect, handler_fn, wrapper_fn, Handler, Wrapper};
