use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// AUTHSMITH – login surface discovery and credential testing
#[derive(Parser, Debug)]
#[command(
    name = "authsmith",
    version,
    about = "AUTHSMITH – login surface discovery and credential testing",
    long_about = r#"
AUTHSMITH finds the authentication surface of a web target and tests
credential pairs against it:

  • Reconnaissance (reachability, server fingerprint, session cookies)
  • Login page discovery over well-known paths
  • Form and field inference, with API endpoint fallback
  • Username-derived password candidates
  • Heuristic success/failure classification of every response

Only use this tool against systems you own or are explicitly authorized
to test. Requests never leave the target host.
"#,
    after_help = r#"EXAMPLES:

Full run:
  authsmith -t https://example.com -w passwords.txt
  authsmith -t https://example.com -w passwords.txt -u admin root --threads 4

Discovery only:
  authsmith -t https://example.com --recon-only
  authsmith -t https://example.com --forms-only --format json

Session:
  authsmith -t https://example.com -w pw.txt --cookie "session=abc123"
  authsmith -t https://example.com -w pw.txt -H "X-Api-Key: k"

Reporting:
  authsmith -t https://example.com -w pw.txt --format json -o result.json"#
)]
pub struct Cli {
    /// Target URL (e.g. https://example.com)
    #[arg(short, long)]
    pub target: String,

    /// Password wordlist, one candidate per line
    #[arg(
        short,
        long,
        required_unless_present_any = ["recon_only", "forms_only"]
    )]
    pub wordlist: Option<PathBuf>,

    /// Usernames to test
    #[arg(short, long, num_args = 1.., default_values_t = vec!["admin".to_string()])]
    pub usernames: Vec<String>,

    // ═══════════════════════════════════════════════════════════════════
    // MODES
    // ═══════════════════════════════════════════════════════════════════

    /// Only probe the target and check connectivity
    #[arg(long, conflicts_with = "forms_only", help_heading = "MODES")]
    pub recon_only: bool,

    /// Only discover login pages and extract forms
    #[arg(long, help_heading = "MODES")]
    pub forms_only: bool,

    // ═══════════════════════════════════════════════════════════════════
    // PERFORMANCE
    // ═══════════════════════════════════════════════════════════════════

    /// Concurrent workers per form (overrides the config file)
    #[arg(long, help_heading = "PERFORMANCE")]
    pub threads: Option<usize>,

    /// Delay between attempts in seconds (overrides the config file)
    #[arg(short, long, help_heading = "PERFORMANCE")]
    pub delay: Option<f64>,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, help_heading = "PERFORMANCE")]
    pub timeout: Option<u64>,

    // ═══════════════════════════════════════════════════════════════════
    // SESSION
    // ═══════════════════════════════════════════════════════════════════

    /// JSON configuration file
    #[arg(long, help_heading = "SESSION")]
    pub config: Option<PathBuf>,

    /// User-Agent header (overrides the config file)
    #[arg(long, help_heading = "SESSION")]
    pub user_agent: Option<String>,

    /// Extra request header, "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", help_heading = "SESSION")]
    pub headers: Vec<String>,

    /// Cookies to seed the session with ("a=1; b=2")
    #[arg(long, help_heading = "SESSION")]
    pub cookie: Option<String>,

    // ═══════════════════════════════════════════════════════════════════
    // OUTPUT
    // ═══════════════════════════════════════════════════════════════════

    /// Skip the banner display
    #[arg(long, help_heading = "OUTPUT")]
    pub no_banner: bool,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, help_heading = "OUTPUT")]
    pub quiet: bool,

    /// Verbose output (debug level)
    #[arg(short, long, help_heading = "OUTPUT")]
    pub verbose: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, help_heading = "OUTPUT")]
    pub log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long, help_heading = "OUTPUT")]
    pub log_file: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, help_heading = "OUTPUT")]
    pub format: OutputFormat,

    /// Report file path
    #[arg(short, long, help_heading = "OUTPUT")]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// `--verbose` and `--quiet` win over `--log-level`.
    pub fn effective_log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            self.log_level.into()
        }
    }
}
