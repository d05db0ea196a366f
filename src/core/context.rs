//! Global context for a run

use crate::cli::args::{Cli, OutputFormat};
use crate::core::config::Config;
use crate::core::scope::Scope;
use crate::http::client::SessionOptions;
use crate::reporting::model::RunMode;
use anyhow::{bail, Context as _};
use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

pub struct Context {
    pub target: Url,
    pub scope: Scope,
    /// File config with CLI overrides already applied.
    pub config: Config,
    pub mode: RunMode,
    pub wordlist: Option<PathBuf>,
    pub usernames: Vec<String>,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
    // Session
    pub cookies: Option<String>,
    pub headers: HashMap<String, String>,
}

impl Context {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let target = Url::parse(&cli.target)
            .with_context(|| format!("invalid target URL '{}'", cli.target))?;
        if !matches!(target.scheme(), "http" | "https") {
            bail!("unsupported scheme '{}' in target URL", target.scheme());
        }
        let scope = Scope::new(&target)?;

        let mut config = Config::load(cli.config.as_deref())?;
        apply_overrides(&mut config, &cli);

        let mode = if cli.recon_only {
            RunMode::ReconOnly
        } else if cli.forms_only {
            RunMode::FormsOnly
        } else {
            RunMode::Full
        };

        let mut headers = HashMap::new();
        for header in &cli.headers {
            match header.split_once(':') {
                Some((key, value)) => {
                    headers.insert(key.trim().to_string(), value.trim().to_string());
                }
                None => tracing::warn!("Ignoring malformed header '{}'", header),
            }
        }

        let mut usernames: Vec<String> = Vec::new();
        for name in cli.usernames.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
            if !usernames.iter().any(|u| u == name) {
                usernames.push(name.to_string());
            }
        }

        Ok(Self {
            target,
            scope,
            config,
            mode,
            wordlist: cli.wordlist,
            usernames,
            output_format: cli.format,
            output_file: cli.output,
            cookies: cli.cookie,
            headers,
        })
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            user_agent: self.config.user_agent().to_string(),
            timeout: self.config.timeout(),
            headers: self.headers.clone(),
            cookies: self.cookies.clone(),
        }
    }
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(threads) = cli.threads {
        config.default_settings.max_workers = threads.max(1);
    }
    if let Some(timeout) = cli.timeout {
        config.default_settings.timeout = timeout;
    }
    if let Some(ref ua) = cli.user_agent {
        config.default_settings.user_agents.insert(0, ua.clone());
    }
    if let Some(delay) = cli.delay {
        config.default_settings.delay_between_attempts = delay;
        let mut rl = config.rate_limiting();
        rl.default_delay = delay;
        config.rate_limiting = Some(rl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn ctx(args: &[&str]) -> anyhow::Result<Context> {
        let mut argv = vec!["authsmith"];
        argv.extend_from_slice(args);
        Context::from_cli(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_cli_overrides_config_defaults() {
        let ctx = ctx(&[
            "-t",
            "http://t.test/app",
            "-w",
            "pw.txt",
            "--threads",
            "3",
            "--delay",
            "0.5",
            "--timeout",
            "4",
            "--user-agent",
            "probe/1.0",
        ])
        .unwrap();

        assert_eq!(ctx.mode, RunMode::Full);
        assert_eq!(ctx.config.default_settings.max_workers, 3);
        assert_eq!(ctx.config.rate_limiting().default_delay, 0.5);
        assert_eq!(ctx.config.timeout().as_secs(), 4);
        assert_eq!(ctx.config.user_agent(), "probe/1.0");
        assert_eq!(ctx.scope.host(), "t.test");
    }

    #[test]
    fn test_headers_and_usernames_are_normalised() {
        let ctx = ctx(&[
            "-t",
            "http://t.test",
            "--forms-only",
            "-H",
            "X-Token:  abc ",
            "-H",
            "garbage",
            "-u",
            "admin",
            " root ",
            "admin",
        ])
        .unwrap();

        assert_eq!(ctx.mode, RunMode::FormsOnly);
        assert_eq!(ctx.headers.get("X-Token").map(String::as_str), Some("abc"));
        assert_eq!(ctx.headers.len(), 1);
        assert_eq!(ctx.usernames, vec!["admin", "root"]);
    }

    #[test]
    fn test_rejects_non_http_target() {
        assert!(ctx(&["-t", "ftp://t.test", "--recon-only"]).is_err());
        assert!(ctx(&["-t", "not a url", "--recon-only"]).is_err());
    }

    #[test]
    fn test_unreadable_config_is_an_error() {
        assert!(ctx(&["-t", "http://t.test", "--recon-only", "--config", "/nonexistent/c.json"]).is_err());
    }
}
