use serde::Serialize;
use std::fmt;

/// Typed handler error carrying an explicit HTTP status code.
///
/// Handlers return `anyhow::Result<()>`; when the error chain holds an
/// `HttpError` the dispatcher responds with its code and a JSON body of the
/// form `{"code": 418, "message": "..."}`. Any other error is collapsed into
/// a 500 with the error's message.
///
/// # Example
///
/// ```rust,ignore
/// use switchback::HttpError;
///
/// fn get_user(ctx: &mut Context) -> anyhow::Result<()> {
///     let id = ctx.param("id").ok_or_else(|| HttpError::new(400, "missing id"))?;
///     // ...
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpError {
    /// HTTP status code to respond with
    pub code: u16,
    /// Client-visible message; omitted from the JSON body when empty
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl HttpError {
    /// Create a new error with the given status code and message.
    #[must_use]
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "http error {}", self.code)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for HttpError {}
