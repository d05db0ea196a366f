use url::Url;

/// Host allow-list: every request the pipeline issues must stay on the
/// target's host. Scheme and port may change (http to https upgrades).
#[derive(Debug, Clone)]
pub struct Scope {
    host: String,
}

impl Scope {
    pub fn new(target: &Url) -> anyhow::Result<Self> {
        let host = target
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("target URL has no host: {}", target))?;

        Ok(Self {
            host: host.to_ascii_lowercase(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_in_scope(&self, url: &Url) -> bool {
        url.host_str()
            .map(|h| h.eq_ignore_ascii_case(&self.host))
            .unwrap_or(false)
    }
}
