use http::Method;
use tracing::{debug, warn};

use crate::chain::{connect, handler_fn, Handler, Wrapper};
use crate::context::Context;
use crate::error::HttpError;
use crate::params::ParamPool;
use crate::trie::{any_method, RouteTrie};

/// Route registry and request dispatcher.
///
/// Registration is a builder-phase concern and takes `&mut self`;
/// [`dispatch`](Mux::dispatch) takes `&self` and is safe to call from many
/// worker coroutines once the mux is behind an `Arc`.
pub struct Mux {
    trie: RouteTrie,
    not_found: Handler,
    prefix: String,
    stack: Vec<Wrapper>,
    pool: ParamPool,
}

impl Default for Mux {
    fn default() -> Self {
        Self::new()
    }
}

impl Mux {
    #[must_use]
    pub fn new() -> Self {
        Self {
            trie: RouteTrie::new(),
            not_found: handler_fn(|ctx| {
                ctx.set_status(404);
                Ok(())
            }),
            prefix: String::new(),
            stack: Vec::new(),
            pool: ParamPool::new(),
        }
    }

    /// Replace the fallback handler invoked when no route matches.
    pub fn set_not_found(&mut self, handler: Handler) {
        self.not_found = handler;
    }

    /// Push a wrapper onto the middleware stack. It applies to every route
    /// registered afterwards within the current group scope.
    pub fn wrap(&mut self, wrapper: Wrapper) {
        self.stack.push(wrapper);
    }

    /// Register routes under a path prefix with an isolated middleware
    /// scope. Wrappers pushed inside the closure do not outlive it, and the
    /// prefix nests across inner groups.
    pub fn group(&mut self, prefix: &str, routes: impl FnOnce(&mut Self)) {
        let prefix_len = self.prefix.len();
        let stack_len = self.stack.len();
        self.prefix.push_str(prefix);
        routes(self);
        self.prefix.truncate(prefix_len);
        self.stack.truncate(stack_len);
    }

    /// Register a handler for a method given as text, e.g. from a route
    /// table loaded at startup. The token is uppercased first.
    ///
    /// # Panics
    ///
    /// Panics when the token is not a valid method name, or when the
    /// pattern is malformed (see [`RouteTrie::insert`]).
    pub fn register(&mut self, method: &str, pattern: &str, handler: Handler) {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .unwrap_or_else(|_| panic!("invalid method token {method:?}"));
        self.route(method, pattern, handler);
    }

    /// Register a handler for a method and pattern under the current group
    /// prefix, composed with the middleware stack in effect right now.
    pub fn route(&mut self, method: Method, pattern: &str, handler: Handler) {
        self.route_with(method, pattern, handler, &[]);
    }

    /// [`route`](Mux::route) with extra per-route wrappers, composed inside
    /// the group stack so they run closest to the handler.
    pub fn route_with(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Handler,
        wrappers: &[Wrapper],
    ) {
        let full = format!("{}{}", self.prefix, pattern);
        debug!(method = %method, pattern = %full, "registering route");
        let node = self.trie.declare(&full, self.stack.clone());
        let handler = connect(handler, wrappers);
        self.trie.attach(node, method, handler);
    }

    pub fn get(&mut self, pattern: &str, handler: Handler) {
        self.route(Method::GET, pattern, handler);
    }

    pub fn post(&mut self, pattern: &str, handler: Handler) {
        self.route(Method::POST, pattern, handler);
    }

    pub fn put(&mut self, pattern: &str, handler: Handler) {
        self.route(Method::PUT, pattern, handler);
    }

    pub fn delete(&mut self, pattern: &str, handler: Handler) {
        self.route(Method::DELETE, pattern, handler);
    }

    pub fn patch(&mut self, pattern: &str, handler: Handler) {
        self.route(Method::PATCH, pattern, handler);
    }

    pub fn options(&mut self, pattern: &str, handler: Handler) {
        self.route(Method::OPTIONS, pattern, handler);
    }

    pub fn head(&mut self, pattern: &str, handler: Handler) {
        self.route(Method::HEAD, pattern, handler);
    }

    /// Register a fallback handler matched for any method the pattern has
    /// no exact registration for.
    pub fn any(&mut self, pattern: &str, handler: Handler) {
        self.route(any_method().clone(), pattern, handler);
    }

    /// Route the request in `ctx` and run the matching chain, leaving the
    /// buffered response in the context.
    ///
    /// Resolution order on a structural match: the exact method first, then
    /// the ANY fallback. A matched node with handlers for other methods
    /// only yields a 405 with a sorted `Allow` header; a matched node with
    /// no handlers at all falls through to the not-found handler, same as a
    /// structural miss.
    pub fn dispatch(&self, ctx: &mut Context) {
        let mut captures = self.pool.checkout();
        let found = self.trie.search(ctx.path(), &mut captures);
        ctx.set_params(captures);

        match found {
            Some(node) => {
                let resolved = self
                    .trie
                    .handler(node, ctx.method())
                    .or_else(|| self.trie.handler(node, any_method()));
                if let Some(handler) = resolved {
                    self.invoke(handler, ctx);
                } else if self.trie.has_handlers(node) {
                    let allow = self
                        .trie
                        .allowed_methods(node)
                        .iter()
                        .map(Method::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    ctx.set_status(405);
                    ctx.set_header("Allow", allow);
                } else {
                    self.invoke(&self.not_found, ctx);
                }
            }
            None => self.invoke(&self.not_found, ctx),
        }

        self.pool.checkin(ctx.take_params());
    }

    /// Run a composed chain, converting an error result into the JSON error
    /// envelope. A typed [`HttpError`] anywhere in the chain keeps its
    /// code; everything else becomes a 500.
    fn invoke(&self, handler: &Handler, ctx: &mut Context) {
        if let Err(err) = handler(ctx) {
            let payload = match err.downcast_ref::<HttpError>() {
                Some(typed) => typed.clone(),
                None => HttpError::new(500, err.to_string()),
            };
            warn!(
                method = %ctx.method(),
                path = %ctx.path(),
                code = payload.code,
                error = %payload,
                "handler returned error"
            );
            ctx.clear_body();
            ctx.set_status(payload.code);
            if ctx.json(&payload).is_err() {
                ctx.set_status(500);
            }
        }
    }
}
