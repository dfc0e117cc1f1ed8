//! Credential lookup.
//!
//! Credentials are resolved on every tool call from a [`CredentialSource`],
//! so a source backed by the process environment sees changes between calls.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// API key for the OpenRouter model routing provider.
pub const OPENROUTER_API_KEY_VAR: &str = "OPENROUTER_API_KEY";

/// Access token for GitHub.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// A required credential was absent or empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{name} is not set")]
pub struct MissingCredential {
    pub name: &'static str,
}

/// Somewhere named secret values can be read from.
pub trait CredentialSource: Send + Sync {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads credentials from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl CredentialSource for EnvSource {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Credentials needed for one agent run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub openrouter_api_key: String,
    pub github_token: String,
}

impl Credentials {
    /// Resolve both credentials. The API key is checked first.
    pub fn resolve(source: &dyn CredentialSource) -> Result<Self, MissingCredential> {
        Ok(Self {
            openrouter_api_key: require(source, OPENROUTER_API_KEY_VAR)?,
            github_token: require(source, GITHUB_TOKEN_VAR)?,
        })
    }
}

// Keep secrets out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openrouter_api_key", &"***")
            .field("github_token", &"***")
            .finish()
    }
}

fn require(
    source: &dyn CredentialSource,
    name: &'static str,
) -> Result<String, MissingCredential> {
    match source.lookup(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(MissingCredential { name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_both() {
        let creds = Credentials::resolve(&source(&[
            (OPENROUTER_API_KEY_VAR, "or-key"),
            (GITHUB_TOKEN_VAR, "gh-token"),
        ]))
        .unwrap();
        assert_eq!(creds.openrouter_api_key, "or-key");
        assert_eq!(creds.github_token, "gh-token");
    }

    #[test]
    fn test_missing_api_key_reported_first() {
        let err = Credentials::resolve(&source(&[])).unwrap_err();
        assert_eq!(err.name, OPENROUTER_API_KEY_VAR);
        assert_eq!(err.to_string(), "OPENROUTER_API_KEY is not set");
    }

    #[test]
    fn test_empty_token_is_missing() {
        let err = Credentials::resolve(&source(&[
            (OPENROUTER_API_KEY_VAR, "or-key"),
            (GITHUB_TOKEN_VAR, ""),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "GITHUB_TOKEN is not set");
    }

    #[test]
    fn test_debug_redacts() {
        let creds = Credentials {
            openrouter_api_key: "or-secret".to_string(),
            github_token: "gh-secret".to_string(),
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("secret"));
    }
}
