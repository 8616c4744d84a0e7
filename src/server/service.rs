use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::warn;

use super::request::parse_request;
use super::response::{write_context, write_json_error};
use crate::context::Context;
use crate::mux::Mux;

/// `may_minihttp` service adapter driving a shared [`Mux`].
///
/// One clone exists per worker coroutine; they all dispatch against the
/// same routing state through the `Arc`.
#[derive(Clone)]
pub struct RouterService {
    mux: Arc<Mux>,
}

impl RouterService {
    #[must_use]
    pub fn new(mux: Arc<Mux>) -> Self {
        Self { mux }
    }
}

impl HttpService for RouterService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);

        let method = match Method::from_bytes(parsed.method.as_bytes()) {
            Ok(method) => method,
            Err(_) => {
                warn!(method = %parsed.method, "unparseable method token");
                write_json_error(res, 400, json!({"code": 400, "message": "bad method"}));
                return Ok(());
            }
        };

        let mut ctx = Context::new(method, parsed.path)
            .with_headers(parsed.headers)
            .with_query(parsed.query_params)
            .with_cookies(parsed.cookies)
            .with_body(parsed.body);

        self.mux.dispatch(&mut ctx);
        write_context(res, &ctx);
        Ok(())
    }
}
