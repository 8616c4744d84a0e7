use may_minihttp::Response;

use crate::context::Context;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        418 => "I'm a teapot",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Flush the buffered response side of a [`Context`] into the wire response.
///
/// `may_minihttp` keeps header lines as `&'static str`, so each dynamic
/// header is leaked; acceptable at a handful of small strings per response.
pub fn write_context(res: &mut Response, ctx: &Context) {
    res.status_code(usize::from(ctx.status()), status_reason(ctx.status()));
    for (name, value) in ctx.response_headers() {
        res.header(Box::leak(format!("{name}: {value}").into_boxed_str()));
    }
    res.body_vec(ctx.response_body().to_vec());
}

/// Write a bare JSON error body, used before a [`Context`] exists (e.g. an
/// unparseable method token).
pub fn write_json_error(res: &mut Response, status: u16, body: serde_json::Value) {
    res.status_code(usize::from(status), status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}
