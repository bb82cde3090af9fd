use thiserror::Error;

/// Link shown alongside unexpected failures and permission problems.
pub const BUG_REPORT_URL: &str =
    "https://github.com/allenai/naacl-utils/issues/new?assignees=&labels=bug&template=bug_report.md";

pub const DOCS_URL: &str = "https://github.com/allenai/naacl-2021-reproducibility-utils";

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures reported by the remote platform, classified by HTTP semantics.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Request failed: {status} {url} - {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },
    #[error("Failed to reach Beaker: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("No Beaker credentials found, did you forget to run the 'naacl-utils setup' command? ({0})")]
    Config(String),

    #[error(
        "You don't have access to the workspace '{workspace}'. \
         Please complete the setup steps at {docs} and run 'naacl-utils setup --force'. \
         If you think this is a bug, please open an issue: {bugs}",
        docs = DOCS_URL,
        bugs = BUG_REPORT_URL
    )]
    Permission { workspace: String },

    #[error(
        "Beaker denied access ({0}). \
         Please complete the setup steps at {docs} and run 'naacl-utils setup --force'.",
        docs = DOCS_URL
    )]
    AccessDenied(String),

    #[error("Invalid run name '{0}': use only letters, digits and dashes (at most 100 characters)")]
    InvalidRunName(String),

    #[error("Could not parse {flag} '{value}': unbalanced quotes")]
    InvalidCommand { flag: &'static str, value: String },

    #[error("Failed to read expected output {path}: {source}")]
    ReadExpected {
        path: String,
        source: std::io::Error,
    },

    #[error("The expected output has no content")]
    EmptyExpectedOutput,

    #[error("No run named '{0}' was found")]
    RunNotFound(String),

    #[error("Run '{0}' has not completed successfully yet")]
    RunNotCompleted(String),

    #[error("A run with the name '{0}' already exists, try using a different name.")]
    RunExists(String),

    #[error("The logs of run '{0}' do not contain the expected output")]
    OutputMismatch(String),

    #[error(transparent)]
    Platform(PlatformError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Credential problems are the user's to fix, whichever call hits them.
impl From<PlatformError> for Error {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Unauthorized(_) => {
                Error::Config("Beaker rejected the user token".to_string())
            }
            PlatformError::Forbidden(reason) => Error::AccessDenied(reason),
            other => Error::Platform(other),
        }
    }
}

impl Error {
    /// Whether the message alone is enough for the user; other errors are
    /// reported with their full context.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Error::Platform(_) | Error::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_expected() {
        assert!(Error::EmptyExpectedOutput.is_expected());
        assert!(Error::RunExists("run-1".into()).is_expected());
        assert!(Error::Permission {
            workspace: "NAACL/alice".into()
        }
        .is_expected());
    }

    #[test]
    fn test_platform_errors_are_unexpected() {
        let err = Error::from(PlatformError::Status {
            status: 500,
            url: "https://beaker.org/api/v3/user".into(),
            body: "boom".into(),
        });
        assert!(!err.is_expected());
    }

    #[test]
    fn test_credential_failures_are_expected() {
        let err = Error::from(PlatformError::Unauthorized("bad token".into()));
        assert!(matches!(err, Error::Config(_)));
        assert!(err.is_expected());

        let err = Error::from(PlatformError::Forbidden("images".into()));
        assert!(matches!(err, Error::AccessDenied(ref reason) if reason == "images"));
        assert!(err.is_expected());
        assert!(err.to_string().contains("naacl-utils setup --force"));
    }

    #[test]
    fn test_config_error_mentions_setup() {
        let msg = Error::Config("no token".into()).to_string();
        assert!(msg.contains("did you forget to run the 'naacl-utils setup' command"));
    }

    #[test]
    fn test_permission_error_links_docs_and_bug_report() {
        let msg = Error::Permission {
            workspace: "NAACL/alice".into(),
        }
        .to_string();
        assert!(msg.contains(DOCS_URL));
        assert!(msg.contains(BUG_REPORT_URL));
        assert!(msg.contains("NAACL/alice"));
    }
}
