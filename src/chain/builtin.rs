use http::Method;
use std::time::Instant;
use tracing::info;

use super::{handler_fn, wrapper_fn, Wrapper};

/// Permissive CORS wrapper.
///
/// Sets `Access-Control-Allow-*` headers on every response and answers
/// `OPTIONS` preflights with 204 without invoking the inner chain.
/// Suitable for development; production deployments should restrict
/// origins with their own wrapper.
#[must_use]
pub fn cors() -> Wrapper {
    wrapper_fn(|next| {
        handler_fn(move |ctx| {
            ctx.set_header("Access-Control-Allow-Origin", "*");
            ctx.set_header("Access-Control-Allow-Credentials", "true");

            if ctx.is(&Method::OPTIONS) {
                ctx.set_header("Access-Control-Allow-Methods", "POST, PUT, PATCH, DELETE");
                ctx.set_header("Access-Control-Allow-Headers", "*");
                ctx.set_header("Access-Control-Max-Age", "86400");
                ctx.set_status(204);
                return Ok(());
            }

            next(ctx)
        })
    })
}

/// Request logging wrapper emitting one structured event per request.
#[must_use]
pub fn logging() -> Wrapper {
    wrapper_fn(|next| {
        handler_fn(move |ctx| {
            let started = Instant::now();
            let result = next(ctx);
            info!(
                method = %ctx.method(),
                path = %ctx.path(),
                status = ctx.status(),
                latency_us = started.elapsed().as_micros() as u64,
                "request handled"
            );
            result
        })
    })
}
