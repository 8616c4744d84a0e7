use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

/// Parsed HTTP request data used by [`RouterService`](super::RouterService).
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method token as received
    pub method: String,
    /// Request path with the query string stripped
    pub path: String,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Cookies from the Cookie header
    pub cookies: HashMap<String, String>,
    /// URL-decoded query string parameters
    pub query_params: HashMap<String, String>,
    /// JSON body, when one was present and parsed
    pub body: Option<serde_json::Value>,
}

/// Split the `Cookie` header into name/value pairs.
pub fn parse_cookies(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .get("cookie")
        .map(|c| {
            c.split(';')
                .filter_map(|pair| {
                    let mut parts = pair.trim().splitn(2, '=');
                    let name = parts.next()?.trim().to_string();
                    let value = parts.next().unwrap_or("").trim().to_string();
                    Some((name, value))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parse and URL-decode the query string of a raw request path, e.g.
/// `/users?limit=10&offset=20`.
pub fn parse_query_params(path: &str) -> HashMap<String, String> {
    match path.find('?') {
        Some(pos) => url::form_urlencoded::parse(path[pos + 1..].as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        None => HashMap::new(),
    }
}

/// Extract method, path, headers, cookies, query parameters, and JSON body
/// from a raw `may_minihttp` request.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let cookies = parse_cookies(&headers);
    let query_params = parse_query_params(&raw_path);

    let body = {
        let mut body_str = String::new();
        match req.body().read_to_string(&mut body_str) {
            Ok(size) if size > 0 => match serde_json::from_str(&body_str) {
                Ok(json) => Some(json),
                Err(err) => {
                    debug!(error = %err, size, "request body is not valid JSON");
                    None
                }
            },
            _ => None,
        }
    };

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        query_count = query_params.len(),
        has_body = body.is_some(),
        "request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        cookies,
        query_params,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookies() {
        let mut h = HashMap::new();
        h.insert("cookie".to_string(), "session=abc; theme=dark".to_string());
        let cookies = parse_cookies(&h);
        assert_eq!(cookies.get("session"), Some(&"abc".to_string()));
        assert_eq!(cookies.get("theme"), Some(&"dark".to_string()));
    }

    #[test]
    fn test_parse_cookies_missing_header() {
        assert!(parse_cookies(&HashMap::new()).is_empty());
    }

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/users?limit=10&name=a%20b");
        assert_eq!(q.get("limit"), Some(&"10".to_string()));
        assert_eq!(q.get("name"), Some(&"a b".to_string()));
    }

    #[test]
    fn test_parse_query_params_without_query() {
        assert!(parse_query_params("/users").is_empty());
    }
}
