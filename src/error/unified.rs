//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Server,
    Api,
    Configuration,
    Serialization,
    ToolExecution,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryLater,
    CheckCredentials,
    CheckConfiguration,
    CheckToolImplementation,
    ContactSupport,
}

impl RecoverySuggestion {
    /// One-line hint shown after a fatal error.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::RetryLater => "the service may be busy or unreachable; try again shortly",
            Self::CheckCredentials => "sign in with `az login` (or `azd auth login`) and check project access",
            Self::CheckConfiguration => "set PROJECT_ENDPOINT and MODEL_DEPLOYMENT_NAME (or pass --endpoint/--model)",
            Self::CheckToolImplementation => "a local tool function failed; check its arguments and output directory",
            Self::ContactSupport => "inspect the error above; rerun with RUST_LOG=debug for details",
        }
    }
}
