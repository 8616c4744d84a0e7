//! # Mux Module
//!
//! The registration and dispatch facade. A [`Mux`] owns a route tree, a
//! middleware stack, a group prefix, and a not-found fallback, and turns a
//! populated [`Context`](crate::context::Context) into a response by
//! searching the tree and running the composed handler chain.

mod core;

pub use core::Mux;
