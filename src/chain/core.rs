use std::sync::Arc;

use crate::context::Context;

/// A shared request handler. Processes the context and yields success or an
/// error; a typed [`HttpError`](crate::error::HttpError) in the chain sets
/// the response code, anything else maps to 500.
pub type Handler = Arc<dyn Fn(&mut Context) -> anyhow::Result<()> + Send + Sync>;

/// A middleware link: receives the next handler and returns one wrapping it.
pub type Wrapper = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Wrap a closure into a [`Handler`].
pub fn handler_fn<F>(f: F) -> Handler
where
    F: Fn(&mut Context) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure into a [`Wrapper`].
pub fn wrapper_fn<F>(f: F) -> Wrapper
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Compose a handler with an ordered list of wrappers.
///
/// Wrappers are applied innermost-last: the first wrapper in the slice is
/// the outermost link and runs first, and post-logic unwinds in reverse.
/// Composition is pure; composing the same inputs twice yields behaviorally
/// identical handlers.
#[must_use]
pub fn connect(handler: Handler, wrappers: &[Wrapper]) -> Handler {
    wrappers.iter().rev().fold(handler, |next, wrap| wrap(next))
}
