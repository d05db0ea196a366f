//! AUTHSMITH core engine
//!
//! Runs the pipeline for one target: reconnaissance, login page discovery,
//! form inference, password space expansion, then the attack.

use crate::attack::AttackEngine;
use crate::cli::args::OutputFormat;
use crate::core::context::Context;
use crate::core::error::RunFailure;
use crate::core::profile::TargetProfile;
use crate::http::client::HttpClient;
use crate::payload::loader::load_wordlist;
use crate::payload::mutations::PasswordSpace;
use crate::reporting::model::{RunMode, RunReport, RunResult};
use crate::reporting::reporter::Reporter;
use crate::scanner::forms::FormInference;
use crate::scanner::recon::Recon;
use anyhow::Context as _;
use std::sync::Arc;

pub struct Engine {
    ctx: Context,
}

impl Engine {
    pub fn new(ctx: Context) -> anyhow::Result<Self> {
        Ok(Self { ctx })
    }

    /// Only an unreachable target (or a broken session setup) is an error;
    /// every other way a run can end is described by the returned report.
    pub async fn run(&self) -> anyhow::Result<RunReport> {
        let ctx = &self.ctx;
        tracing::info!("Starting AUTHSMITH run against {} ({} mode)", ctx.target, ctx.mode);

        if ctx.cookies.is_some() || !ctx.headers.is_empty() {
            tracing::info!("Using seeded session");
            if ctx.cookies.is_some() {
                tracing::info!("  Cookie: <redacted>");
            }
            if !ctx.headers.is_empty() {
                tracing::info!("  Custom headers: {}", ctx.headers.len());
            }
        }

        let client = HttpClient::new(ctx.scope.clone(), ctx.session_options(), &ctx.target)?;
        let recon = Recon::from_config(&ctx.config);

        // -------------------------------------------------
        // Reconnaissance (fatal on failure)
        // -------------------------------------------------
        let mut profile = recon.probe(&client, &ctx.target).await?;

        if ctx.mode != RunMode::FormsOnly && !recon.test_connectivity(&client, &ctx.target).await {
            tracing::error!("Target failed the connectivity check");
            return Ok(failed(ctx.mode, &profile, RunFailure::ConnectivityCheckFailed));
        }

        if ctx.mode == RunMode::ReconOnly {
            let mut report = RunReport::new(ctx.mode, Some(&profile));
            report.result = RunResult::Completed;
            return Ok(report);
        }

        // -------------------------------------------------
        // Login surface discovery
        // -------------------------------------------------
        self.discover_forms(&client, &recon, &mut profile).await;

        if profile.form_count() == 0 {
            tracing::error!("No login forms found");
            return Ok(failed(ctx.mode, &profile, RunFailure::NoFormsFound));
        }
        tracing::info!("Found {} login form(s)", profile.form_count());

        if ctx.mode == RunMode::FormsOnly {
            let mut report = RunReport::new(ctx.mode, Some(&profile));
            report.result = RunResult::Completed;
            return Ok(report);
        }

        // -------------------------------------------------
        // Password space
        // -------------------------------------------------
        let base = self.load_passwords();
        if base.is_empty() {
            tracing::error!("No passwords loaded");
            return Ok(failed(ctx.mode, &profile, RunFailure::NoPasswordsLoaded));
        }

        let passwords =
            PasswordSpace::from_config(&ctx.config.password_generation).expand(&base, &ctx.usernames);
        tracing::info!(
            "Password space: {} candidates ({} from wordlist) for {} username(s)",
            passwords.len(),
            base.len(),
            ctx.usernames.len()
        );

        // -------------------------------------------------
        // Attack
        // -------------------------------------------------
        let reporter = Arc::new(Reporter::new());
        let attack = AttackEngine::new(client, &profile, &ctx.config, reporter.clone());
        let found = attack.run_attack(&ctx.usernames, &passwords).await;

        let mut report = RunReport::new(ctx.mode, Some(&profile));
        report.stats = reporter.stats();
        report.result = match found {
            Some(credential) => RunResult::Found { credential },
            None => RunResult::NotFound,
        };

        Ok(report)
    }

    async fn discover_forms(&self, client: &HttpClient, recon: &Recon, profile: &mut TargetProfile) {
        let pages = recon.discover_candidate_pages(client, &self.ctx.target).await;
        tracing::info!("Discovered {} candidate page(s)", pages.len());

        let inference = FormInference::from_config(&self.ctx.config);
        for page in &pages {
            let forms = inference.extract_forms(client, page).await;
            tracing::debug!("{}: {} form(s)", page, forms.len());

            for form in forms {
                let action = form.action_url().to_string();
                let method = form.method();
                if profile.add_login_form(form) {
                    tracing::info!("  Login form: {} {}", method.to_string().to_uppercase(), action);
                }
            }
        }
    }

    /// A wordlist that cannot be read counts as an empty one.
    fn load_passwords(&self) -> Vec<String> {
        let Some(ref path) = self.ctx.wordlist else {
            return Vec::new();
        };

        match load_wordlist(path) {
            Ok(wordlist) => {
                tracing::info!("Loaded {} passwords from {}", wordlist.entries.len(), wordlist.name);
                wordlist.entries
            }
            Err(e) => {
                tracing::error!("{:#}", e);
                Vec::new()
            }
        }
    }

    /// Render the report and print it or write it to `--output`.
    pub fn emit(&self, report: &RunReport) -> anyhow::Result<()> {
        let rendered = match self.ctx.output_format {
            OutputFormat::Json => crate::reporting::json::render(report)?,
            OutputFormat::Text => crate::reporting::text::render(report),
        };

        match self.ctx.output_file {
            Some(ref path) => {
                std::fs::write(path, rendered)
                    .with_context(|| format!("cannot write report to {}", path.display()))?;
                tracing::info!("Report written to {}", path.display());
            }
            None => println!("{}", rendered),
        }

        Ok(())
    }
}

fn failed(mode: RunMode, profile: &TargetProfile, reason: RunFailure) -> RunReport {
    let mut report = RunReport::new(mode, Some(profile));
    report.result = RunResult::Failed {
        reason: reason.to_string(),
    };
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::Cli;
    use crate::core::profile::Credential;
    use crate::http::test_server::{TestRequest, TestResponse, TestServer};
    use clap::Parser;
    use std::path::PathBuf;

    const LOGIN_PAGE: &str = r#"
        <html><body>
          <form action="/login" method="POST">
            <input type="hidden" name="csrf" value="t0k">
            <input type="text" name="user">
            <input type="password" name="pass">
            <input type="submit" value="Sign in">
          </form>
        </body></html>"#;

    fn site(req: &TestRequest) -> TestResponse {
        match (req.method.as_str(), req.path.as_str()) {
            ("GET", "/") | ("GET", "/login") => {
                TestResponse::html(200, LOGIN_PAGE).with_header("Server", "nginx/1.25")
            }
            ("POST", "/login") => {
                let form = req.form();
                let ok = form.get("user").map(String::as_str) == Some("admin")
                    && form.get("pass").map(String::as_str) == Some("admin123")
                    && form.get("csrf").map(String::as_str) == Some("t0k");
                if ok {
                    TestResponse::redirect(302, "/dashboard")
                } else {
                    TestResponse::html(200, "<p>Invalid credentials</p>")
                }
            }
            ("GET", "/dashboard") => TestResponse::html(200, "<h1>Dashboard</h1>"),
            _ => TestResponse::html(404, "not found"),
        }
    }

    fn wordlist(tag: &str, lines: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "authsmith-engine-{}-{}.txt",
            tag,
            std::process::id()
        ));
        std::fs::write(&path, lines).unwrap();
        path
    }

    fn engine(target: &str, extra: &[&str]) -> Engine {
        let mut argv = vec!["authsmith", "-t", target, "--delay", "0", "--threads", "1"];
        argv.extend_from_slice(extra);
        let ctx = Context::from_cli(Cli::try_parse_from(argv).unwrap()).unwrap();
        Engine::new(ctx).unwrap()
    }

    #[tokio::test]
    async fn test_full_run_finds_credentials() {
        let server = TestServer::start(site).await;
        let words = wordlist("full", "wrong1\nwrong2\nadmin123\n");
        let target = server.url("/");

        let report = engine(&target, &["-w", words.to_str().unwrap()]).run().await.unwrap();
        std::fs::remove_file(&words).ok();

        assert_eq!(
            report.result,
            RunResult::Found {
                credential: Credential::new("admin", "admin123")
            }
        );
        assert!(report.is_success());
        assert_eq!(report.forms.len(), 1);
        assert_eq!(report.stats.attempts, 3);
        assert_eq!(report.stats.failures, 2);
        assert_eq!(
            report.target.as_ref().and_then(|t| t.server.as_deref()),
            Some("nginx/1.25")
        );
        assert_eq!(
            server.requests().iter().filter(|r| r.method == "POST").count(),
            3
        );
    }

    #[tokio::test]
    async fn test_recon_only_issues_no_attempts() {
        let server = TestServer::start(site).await;
        let report = engine(&server.url("/"), &["--recon-only"]).run().await.unwrap();

        assert_eq!(report.result, RunResult::Completed);
        assert!(report.forms.is_empty());
        assert!(server.requests().iter().all(|r| r.method == "GET"));
        assert_eq!(server.hits("/login"), 0);
    }

    #[tokio::test]
    async fn test_forms_only_reports_forms() {
        let server = TestServer::start(site).await;
        let report = engine(&server.url("/"), &["--forms-only"]).run().await.unwrap();

        assert_eq!(report.result, RunResult::Completed);
        assert_eq!(report.forms.len(), 1);
        assert_eq!(report.forms[0].auxiliary_fields.get("csrf").map(String::as_str), Some("t0k"));
        assert!(server.requests().iter().all(|r| r.method == "GET"));
    }

    #[tokio::test]
    async fn test_no_forms_is_a_run_failure() {
        let server = TestServer::start(|req| match req.path.as_str() {
            "/" => TestResponse::html(200, "<p>nothing to see</p>"),
            _ => TestResponse::html(404, "not found"),
        })
        .await;
        let words = wordlist("noforms", "a\n");

        let report = engine(&server.url("/"), &["-w", words.to_str().unwrap()])
            .run()
            .await
            .unwrap();
        std::fs::remove_file(&words).ok();

        assert_eq!(
            report.result,
            RunResult::Failed {
                reason: RunFailure::NoFormsFound.to_string()
            }
        );
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_empty_wordlist_is_a_run_failure() {
        let server = TestServer::start(site).await;
        let words = wordlist("empty", "\n   \n");

        let report = engine(&server.url("/"), &["-w", words.to_str().unwrap()])
            .run()
            .await
            .unwrap();
        std::fs::remove_file(&words).ok();

        assert_eq!(
            report.result,
            RunResult::Failed {
                reason: RunFailure::NoPasswordsLoaded.to_string()
            }
        );
        assert!(server.requests().iter().all(|r| r.method == "GET"));
    }

    #[tokio::test]
    async fn test_unreachable_target_is_fatal() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let target = format!("http://{}/", addr);
        assert!(engine(&target, &["--recon-only"]).run().await.is_err());
    }

    #[tokio::test]
    async fn test_emit_writes_json_report() {
        let server = TestServer::start(site).await;
        let out = std::env::temp_dir().join(format!("authsmith-report-{}.json", std::process::id()));

        let engine = engine(
            &server.url("/"),
            &["--forms-only", "--format", "json", "-o", out.to_str().unwrap()],
        );
        let report = engine.run().await.unwrap();
        engine.emit(&report).unwrap();

        let raw = std::fs::read_to_string(&out).unwrap();
        std::fs::remove_file(&out).ok();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["mode"], "forms_only");
        assert_eq!(value["forms"][0]["username_field"], "user");
    }
}
