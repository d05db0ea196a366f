//! Session context: one cookie jar, one identity, and scope enforcement for
//! every request issued against the target.

use crate::core::scope::Scope;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{header, redirect::Policy, Client, Method};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

const MAX_REDIRECTS: usize = 10;

/// Identity and defaults applied to every request of a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub user_agent: String,
    pub timeout: Duration,
    pub headers: HashMap<String, String>,
    /// Raw `name=value; name2=value2` cookie string seeded into the jar.
    pub cookies: Option<String>,
}

/// Cheap to clone: clones share the connection pool and the cookie jar.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    jar: Arc<Jar>,
    scope: Scope,
    default_headers: HashMap<String, String>,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(scope: Scope, options: SessionOptions, seed_url: &Url) -> Result<Self> {
        let jar = Arc::new(Jar::default());

        if let Some(ref cookies) = options.cookies {
            for pair in cookies.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                jar.add_cookie_str(pair, seed_url);
            }
        }

        // Redirects are followed by hand so the hop count and final URL are
        // observable and every hop passes the scope check.
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(Policy::none())
            .cookie_provider(jar.clone())
            .user_agent(options.user_agent)
            .timeout(options.timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            jar,
            scope,
            default_headers: options.headers,
            timeout: options.timeout,
        })
    }

    /// Cookies the jar would send to `url`.
    pub fn cookies_for(&self, url: &Url) -> HashMap<String, String> {
        let Some(value) = self.jar.cookies(url) else {
            return HashMap::new();
        };
        value
            .to_str()
            .unwrap_or("")
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub async fn execute(&self, req: HttpRequest) -> Result<HttpResponse> {
        if !self.scope.is_in_scope(&req.url) {
            anyhow::bail!("Blocked out-of-scope request: {}", req.url);
        }

        let start = Instant::now();
        let timeout = req.timeout.unwrap_or(self.timeout);

        let mut method = req.method;
        let mut url = req.url;
        let mut headers = req.headers;
        let mut body = req.body;
        let mut redirects = 0;

        loop {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .headers(headers.clone())
                .timeout(timeout);

            for (key, value) in &self.default_headers {
                if let Ok(header_name) = header::HeaderName::from_bytes(key.as_bytes()) {
                    if let Ok(header_value) = header::HeaderValue::from_str(value) {
                        request = request.header(header_name, header_value);
                    }
                }
            }

            if let Some(ref bytes) = body {
                request = request.body(bytes.clone());
            }

            let response = request.send().await?;
            let status = response.status();

            if status.is_redirection() && redirects < MAX_REDIRECTS {
                let next = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|loc| url.join(loc).ok());

                if let Some(next) = next {
                    if self.scope.is_in_scope(&next) {
                        // 307/308 replay the request; everything else becomes a GET.
                        if !matches!(status.as_u16(), 307 | 308) {
                            method = Method::GET;
                            body = None;
                            headers.remove(header::CONTENT_TYPE);
                        }
                        tracing::debug!("Following redirect {} -> {}", url, next);
                        url = next;
                        redirects += 1;
                        continue;
                    }
                    tracing::debug!("Not following out-of-scope redirect to {}", next);
                }
            }

            let final_url = response.url().clone();
            let mut headers = HashMap::new();
            for (k, v) in response.headers().iter() {
                headers.insert(k.to_string(), v.to_str().unwrap_or("").to_string());
            }

            let body_bytes = response.bytes().await?;

            return Ok(HttpResponse {
                status: status.as_u16(),
                headers,
                body: body_bytes.to_vec(),
                final_url,
                redirects,
                elapsed_ms: start.elapsed().as_millis(),
            });
        }
    }
}
