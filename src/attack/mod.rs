//! Credential attack engine
//!
//! Walks forms (outer), usernames, then passwords (inner), one request per
//! triple over the shared session, and stops at the first accepted pair.
//! With more than one worker, attempts against a single form are spread
//! over a bounded set of tasks; forms are still tried in order.

pub mod outcome;

use crate::core::config::{Config, RateLimiting};
use crate::core::profile::{Credential, FormMethod, LoginForm, TargetProfile};
use crate::core::rate_limit::Pacer;
use crate::http::client::HttpClient;
use crate::http::request::HttpRequest;
use crate::validation::verdict::{ResponseClassifier, Verdict};
use outcome::{AttemptOutcome, OutcomeSink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinSet;
use url::Url;

struct Inner {
    client: HttpClient,
    forms: Vec<LoginForm>,
    classifier: ResponseClassifier,
    rate: RateLimiting,
    workers: usize,
    sink: Arc<dyn OutcomeSink>,
    attempts: AtomicUsize,
}

#[derive(Clone)]
pub struct AttackEngine {
    inner: Arc<Inner>,
}

/// Attempt counter for one `run_attack` call.
struct Progress {
    issued: AtomicUsize,
    total: usize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            issued: AtomicUsize::new(0),
            total,
        }
    }

    fn finished(&self) -> bool {
        self.issued.load(Ordering::SeqCst) >= self.total
    }
}

/// Shared state for one form's worker pool.
struct FormRun {
    form: LoginForm,
    usernames: Arc<Vec<String>>,
    passwords: Arc<Vec<String>>,
    cursor: AtomicUsize,
    total: usize,
    /// No form follows this one.
    last_form: bool,
    progress: Arc<Progress>,
    stop: watch::Sender<bool>,
    found: Mutex<Option<Credential>>,
}

impl AttackEngine {
    pub fn new(
        client: HttpClient,
        profile: &TargetProfile,
        config: &Config,
        sink: Arc<dyn OutcomeSink>,
    ) -> Self {
        let classifier = ResponseClassifier::from_config(
            &config.response_analysis,
            &profile.success_indicators,
            &profile.failure_indicators,
        );

        Self {
            inner: Arc::new(Inner {
                client,
                forms: profile.login_forms().to_vec(),
                classifier,
                rate: config.rate_limiting(),
                workers: config.default_settings.max_workers.max(1),
                sink,
                attempts: AtomicUsize::new(0),
            }),
        }
    }

    /// Attempts issued so far, across every run of this engine.
    pub fn attempts(&self) -> usize {
        self.inner.attempts.load(Ordering::SeqCst)
    }

    /// One attempt outside the attack loop; not counted or reported.
    pub async fn test_credentials(&self, form: &LoginForm, username: &str, password: &str) -> AttemptOutcome {
        self.inner.test_credentials(form, username, password).await
    }

    pub async fn run_attack(&self, usernames: &[String], passwords: &[String]) -> Option<Credential> {
        let inner = &self.inner;
        let total = inner.forms.len() * usernames.len() * passwords.len();
        if total == 0 {
            tracing::warn!("Nothing to attack: no forms, usernames or passwords");
            return None;
        }

        tracing::info!(
            "Starting attack: {} attempts ({} forms x {} usernames x {} passwords, {} workers)",
            total,
            inner.forms.len(),
            usernames.len(),
            passwords.len(),
            inner.workers
        );

        let start = Instant::now();
        let progress = Arc::new(Progress::new(total));
        let result = if inner.workers <= 1 {
            self.run_sequential(usernames, passwords, &progress).await
        } else {
            self.run_pooled(usernames, passwords, progress).await
        };

        match &result {
            Some(cred) => tracing::info!(
                "Credentials found for '{}' in {:.2} seconds",
                cred.username,
                start.elapsed().as_secs_f64()
            ),
            None => tracing::info!("Attack completed. No valid credentials found."),
        }

        result
    }

    async fn run_sequential(
        &self,
        usernames: &[String],
        passwords: &[String],
        progress: &Progress,
    ) -> Option<Credential> {
        let mut pacer = Pacer::from_config(&self.inner.rate);

        for form in &self.inner.forms {
            tracing::info!("Testing form: {} ({})", form.action_url(), form.method());

            for username in usernames {
                for password in passwords {
                    let outcome = self.inner.attempt(form, username, password, progress).await;
                    if outcome.is_success() {
                        return Some(Credential::new(username.as_str(), password.as_str()));
                    }

                    if !progress.finished() {
                        pacer.observe(outcome.is_throttled());
                        pacer.wait().await;
                    }
                }
            }
        }

        None
    }

    async fn run_pooled(
        &self,
        usernames: &[String],
        passwords: &[String],
        progress: Arc<Progress>,
    ) -> Option<Credential> {
        let usernames = Arc::new(usernames.to_vec());
        let passwords = Arc::new(passwords.to_vec());
        let forms = self.inner.forms.len();

        for (i, form) in self.inner.forms.iter().enumerate() {
            tracing::info!("Testing form: {} ({})", form.action_url(), form.method());

            let (stop, _) = watch::channel(false);
            let run = Arc::new(FormRun {
                form: form.clone(),
                usernames: usernames.clone(),
                passwords: passwords.clone(),
                cursor: AtomicUsize::new(0),
                total: usernames.len() * passwords.len(),
                last_form: i + 1 == forms,
                progress: progress.clone(),
                stop,
                found: Mutex::new(None),
            });

            let mut workers = JoinSet::new();
            for _ in 0..self.inner.workers.min(run.total) {
                workers.spawn(worker(self.inner.clone(), run.clone()));
            }
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined {
                    tracing::error!("Attack worker failed: {}", e);
                }
            }

            let found = run.found.lock().ok().and_then(|mut slot| slot.take());
            if found.is_some() {
                return found;
            }
        }

        None
    }
}

async fn worker(inner: Arc<Inner>, run: Arc<FormRun>) {
    let mut pacer = Pacer::from_config(&inner.rate);
    let mut stop = run.stop.subscribe();

    loop {
        if *stop.borrow() {
            break;
        }

        let idx = run.cursor.fetch_add(1, Ordering::SeqCst);
        if idx >= run.total {
            break;
        }
        let username = &run.usernames[idx / run.passwords.len()];
        let password = &run.passwords[idx % run.passwords.len()];

        let outcome = tokio::select! {
            outcome = inner.attempt(&run.form, username, password, &run.progress) => outcome,
            _ = stop.changed() => break,
        };

        if outcome.is_success() {
            if let Ok(mut slot) = run.found.lock() {
                slot.get_or_insert_with(|| Credential::new(username.as_str(), password.as_str()));
            }
            run.stop.send_replace(true);
            break;
        }

        // Nothing left to claim and no later form: the attempt was final.
        if run.last_form && run.cursor.load(Ordering::SeqCst) >= run.total {
            break;
        }

        pacer.observe(outcome.is_throttled());
        tokio::select! {
            _ = pacer.wait() => {}
            _ = stop.changed() => break,
        }
    }
}

impl Inner {
    async fn attempt(
        &self,
        form: &LoginForm,
        username: &str,
        password: &str,
        progress: &Progress,
    ) -> AttemptOutcome {
        let outcome = self.test_credentials(form, username, password).await;
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let n = progress.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.sink.record(n, progress.total, &outcome);
        outcome
    }

    async fn test_credentials(&self, form: &LoginForm, username: &str, password: &str) -> AttemptOutcome {
        let start = Instant::now();
        let mut outcome = AttemptOutcome {
            username: username.to_string(),
            password: password.to_string(),
            action_url: form.action_url().to_string(),
            verdict: Verdict::Failure,
            elapsed_ms: 0,
            status: None,
            error: None,
        };

        let url = match Url::parse(form.action_url()) {
            Ok(url) => url,
            Err(e) => {
                outcome.error = Some(format!("bad action URL: {}", e));
                return outcome;
            }
        };

        let fields = form.fill(username, password);
        let req = match form.method() {
            FormMethod::Post => HttpRequest::post_form(url, &fields),
            FormMethod::Get => HttpRequest::get_with_query(url, &fields),
        };

        match self.client.execute(req).await {
            Ok(resp) => {
                let classification = self.classifier.classify(&resp);
                tracing::debug!(
                    "{} -> status={} redirects={} rule={:?}",
                    form.action_url(),
                    resp.status,
                    resp.redirects,
                    classification.rule
                );
                outcome.verdict = classification.verdict;
                outcome.status = Some(resp.status);
            }
            Err(e) => outcome.error = Some(e.to_string()),
        }

        outcome.elapsed_ms = start.elapsed().as_millis();
        outcome
    }
}
