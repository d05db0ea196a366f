//! Target reconnaissance: reachability, baseline metadata, and candidate
//! login page discovery.

use crate::core::config::Config;
use crate::core::error::ReconError;
use crate::core::profile::TargetProfile;
use crate::http::client::HttpClient;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::scanner::fingerprint::fingerprint_response;
use std::time::Duration;
use url::Url;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Recon {
    pub common_paths: Vec<String>,
    pub timeout: Duration,
    pub success_indicators: Vec<String>,
    pub failure_indicators: Vec<String>,
}

impl Recon {
    pub fn from_config(config: &Config) -> Self {
        Self {
            common_paths: config.login_detection.common_login_paths.clone(),
            timeout: config.timeout(),
            success_indicators: config.response_analysis.success_indicators.clone(),
            failure_indicators: config.response_analysis.failure_indicators.clone(),
        }
    }

    /// Baseline GET against the target. Anything but a completed 2xx/3xx
    /// exchange is fatal.
    pub async fn probe(&self, client: &HttpClient, target: &Url) -> Result<TargetProfile, ReconError> {
        let fail = |reason: String| ReconError::UnreachableTarget {
            url: target.to_string(),
            reason,
        };

        let req = HttpRequest::get(target.clone()).with_timeout(self.timeout);
        let resp = client
            .execute(req)
            .await
            .map_err(|e| fail(e.to_string()))?;

        if !(200..400).contains(&resp.status) {
            return Err(fail(format!("status {}", resp.status)));
        }

        let mut profile = TargetProfile::new(target.as_str(), authority(target))?;
        profile.fingerprint = fingerprint_response(&resp);
        profile.headers = resp.headers.clone();
        profile.cookies = client.cookies_for(target);
        profile.success_indicators = self.success_indicators.clone();
        profile.failure_indicators = self.failure_indicators.clone();
        profile.reachable = true;

        tracing::info!("Target: {}", profile.domain);
        tracing::info!(
            "Server: {}",
            profile.fingerprint.server.as_deref().unwrap_or("Unknown")
        );
        tracing::info!(
            "Powered by: {}",
            profile.fingerprint.powered_by.as_deref().unwrap_or("Unknown")
        );
        tracing::info!(
            "Baseline: status={} time={}ms size={} cookies={}",
            resp.status,
            resp.elapsed_ms,
            resp.body.len(),
            profile.cookies.len()
        );

        Ok(profile)
    }

    /// Base URL first, then every configured path answering 200, in
    /// configured order.
    pub async fn discover_candidate_pages(&self, client: &HttpClient, base: &Url) -> Vec<Url> {
        let mut pages = vec![base.clone()];

        for path in &self.common_paths {
            let Ok(candidate) = base.join(path) else {
                tracing::debug!("Skipping unjoinable path {}", path);
                continue;
            };

            let req = HttpRequest::get(candidate.clone()).with_timeout(PROBE_TIMEOUT);
            match client.execute(req).await {
                Ok(resp) if resp.status == 200 => {
                    tracing::info!("Discovered login page: {}", candidate);
                    if !pages.contains(&candidate) {
                        pages.push(candidate);
                    }
                }
                Ok(resp) => tracing::debug!("{} -> {}", candidate, resp.status),
                Err(e) => tracing::debug!("Probe failed for {}: {}", candidate, e),
            }
        }

        pages
    }

    /// Pre-flight reachability check; never errors.
    pub async fn test_connectivity(&self, client: &HttpClient, url: &Url) -> bool {
        let req = HttpRequest::get(url.clone()).with_timeout(PROBE_TIMEOUT);
        match client.execute(req).await {
            Ok(resp) => {
                if let Some(next) = unfollowed_redirect(&resp) {
                    tracing::warn!(
                        "{} redirects to {}, which is outside the target host or past the hop limit; \
                         pass that URL as the target instead",
                        resp.final_url,
                        next
                    );
                }
                resp.is_success()
            }
            Err(e) => {
                tracing::debug!("Connectivity check failed for {}: {}", url, e);
                false
            }
        }
    }
}

/// Location of a 3xx the session handed back instead of following.
pub fn unfollowed_redirect(resp: &HttpResponse) -> Option<Url> {
    if !(300..400).contains(&resp.status) {
        return None;
    }
    let location = resp.header("location")?;
    resp.final_url.join(location).ok()
}

/// Host plus explicit port, as written in the URL.
pub fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scope::Scope;
    use crate::http::client::SessionOptions;
    use crate::http::test_server::{TestResponse, TestServer};
    use std::collections::HashMap;

    fn client_for(base: &Url) -> HttpClient {
        let options = SessionOptions {
            user_agent: "authsmith-test".to_string(),
            timeout: Duration::from_secs(5),
            headers: HashMap::new(),
            cookies: None,
        };
        HttpClient::new(Scope::new(base).unwrap(), options, base).unwrap()
    }

    fn recon(paths: &[&str]) -> Recon {
        let mut config = Config::default();
        config.login_detection.common_login_paths = paths.iter().map(|s| s.to_string()).collect();
        Recon::from_config(&config)
    }

    #[test]
    fn test_authority_keeps_explicit_port() {
        assert_eq!(authority(&Url::parse("http://example.com/a").unwrap()), "example.com");
        assert_eq!(
            authority(&Url::parse("http://example.com:8080/a").unwrap()),
            "example.com:8080"
        );
    }

    #[tokio::test]
    async fn test_probe_records_metadata() {
        let server = TestServer::start(|_| {
            TestResponse::html(200, "<html></html>")
                .with_header("Server", "nginx/1.25")
                .with_header("Set-Cookie", "session=xyz; Path=/")
        })
        .await;
        let base = Url::parse(&server.url("/")).unwrap();
        let client = client_for(&base);

        let profile = recon(&[]).probe(&client, &base).await.unwrap();
        assert_eq!(profile.domain, server.addr.to_string());
        assert_eq!(profile.fingerprint.server.as_deref(), Some("nginx/1.25"));
        assert_eq!(profile.headers.get("server").map(String::as_str), Some("nginx/1.25"));
        assert_eq!(profile.cookies.get("session").map(String::as_str), Some("xyz"));
        assert!(profile.reachable);
        assert_eq!(profile.failure_indicators.len(), 5);
    }

    #[tokio::test]
    async fn test_probe_fails_on_server_error() {
        let server = TestServer::start(|_| TestResponse::html(500, "boom")).await;
        let base = Url::parse(&server.url("/")).unwrap();
        let client = client_for(&base);

        let err = recon(&[]).probe(&client, &base).await.unwrap_err();
        assert!(matches!(err, ReconError::UnreachableTarget { .. }));
    }

    #[tokio::test]
    async fn test_probe_fails_when_nothing_listens() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{}/", addr)).unwrap();
        let client = client_for(&base);
        let err = recon(&[]).probe(&client, &base).await.unwrap_err();
        assert!(matches!(err, ReconError::UnreachableTarget { .. }));
        assert!(!recon(&[]).test_connectivity(&client, &base).await);
    }

    #[tokio::test]
    async fn test_discovery_keeps_configured_order() {
        let server = TestServer::start(|req| match req.path.as_str() {
            "/admin" | "/login" => TestResponse::html(200, "page"),
            _ => TestResponse::html(404, "missing"),
        })
        .await;
        let base = Url::parse(&server.url("/")).unwrap();
        let client = client_for(&base);

        let pages = recon(&["/signin", "/admin", "/login"])
            .discover_candidate_pages(&client, &base)
            .await;
        let paths: Vec<&str> = pages.iter().map(|u| u.path()).collect();
        assert_eq!(paths, vec!["/", "/admin", "/login"]);
    }

    #[tokio::test]
    async fn test_discovery_with_no_hits_returns_only_base() {
        let server = TestServer::start(|req| match req.path.as_str() {
            "/" => TestResponse::html(200, "home"),
            "/auth" => TestResponse::redirect(301, "/gone"),
            _ => TestResponse::html(403, "forbidden"),
        })
        .await;
        let base = Url::parse(&server.url("/")).unwrap();
        let client = client_for(&base);

        let pages = recon(&["/login", "/auth", "/admin"])
            .discover_candidate_pages(&client, &base)
            .await;
        assert_eq!(pages, vec![base]);
    }

    #[tokio::test]
    async fn test_connectivity_requires_success_status() {
        let server = TestServer::start(|req| match req.path.as_str() {
            "/" => TestResponse::html(200, "ok"),
            _ => TestResponse::html(503, "down"),
        })
        .await;
        let base = Url::parse(&server.url("/")).unwrap();
        let client = client_for(&base);
        let recon = recon(&[]);

        assert!(recon.test_connectivity(&client, &base).await);
        assert!(!recon.test_connectivity(&client, &base.join("/down").unwrap()).await);
    }

    #[tokio::test]
    async fn test_connectivity_fails_on_off_host_redirect() {
        let server = TestServer::start(|_| TestResponse::redirect(302, "http://www.elsewhere.invalid/")).await;
        let base = Url::parse(&server.url("/")).unwrap();
        let client = client_for(&base);

        assert!(!recon(&[]).test_connectivity(&client, &base).await);

        let resp = client.execute(HttpRequest::get(base.clone())).await.unwrap();
        assert_eq!(resp.status, 302);
        assert_eq!(
            unfollowed_redirect(&resp).map(|u| u.to_string()),
            Some("http://www.elsewhere.invalid/".to_string())
        );
    }

    #[tokio::test]
    async fn test_followed_redirect_is_not_reported() {
        let server = TestServer::start(|req| match req.path.as_str() {
            "/" => TestResponse::redirect(302, "/home"),
            _ => TestResponse::html(200, "home"),
        })
        .await;
        let base = Url::parse(&server.url("/")).unwrap();
        let client = client_for(&base);

        let resp = client.execute(HttpRequest::get(base.clone())).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.redirects, 1);
        assert!(unfollowed_redirect(&resp).is_none());
        assert!(recon(&[]).test_connectivity(&client, &base).await);
    }
}
