use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Overrides the session timeout for this request only.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Set request body from string
    pub fn set_body(&mut self, body: String) {
        self.body = Some(body.into_bytes());
    }

    /// Set a header
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) {
            if let Ok(header_value) = HeaderValue::from_str(value) {
                self.headers.insert(header_name, header_value);
            }
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Create a GET request
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// GET with the fields appended to the query string
    pub fn get_with_query(mut url: Url, fields: &[(String, String)]) -> Self {
        if !fields.is_empty() {
            url.query_pairs_mut().extend_pairs(fields.iter());
        }
        Self::get(url)
    }

    /// POST with an urlencoded body
    pub fn post_form(url: Url, fields: &[(String, String)]) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish();
        let mut req = Self::new(Method::POST, url);
        req.set_body(body);
        req.set_header("Content-Type", "application/x-www-form-urlencoded");
        req
    }
}
