//! Error taxonomy for the credential-testing pipeline

use thiserror::Error;

/// Fatal reconnaissance failures.
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("invalid target URL '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("target {url} is unreachable: {reason}")]
    UnreachableTarget { url: String, reason: String },
}

/// Login form construction errors. These are data invariant violations and
/// are returned at construction time, never swallowed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("login form action URL cannot be empty")]
    MissingAction,

    #[error("login form username field cannot be empty")]
    MissingUsernameField,

    #[error("login form password field cannot be empty")]
    MissingPasswordField,

    #[error("unsupported form method '{0}' (expected get or post)")]
    InvalidMethod(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Run-level outcomes that stop the pipeline without being fatal errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RunFailure {
    #[error("no login forms found")]
    NoFormsFound,

    #[error("no passwords loaded")]
    NoPasswordsLoaded,

    #[error("target failed the connectivity check")]
    ConnectivityCheckFailed,
}
