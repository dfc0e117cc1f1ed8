//! Goose agent backed by the `goose` CLI.
//!
//! Each session gets its own checkout under the workspace directory, keyed by
//! the session name and the repository it is bound to. The repository is
//! cloned on first use and reused by later runs of the same session.

use std::path::PathBuf;
use std::process::{Output, Stdio};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{AgentError, AgentExecutor, AgentFactory, SessionOptions};
use crate::config::{AgentConfig, GITHUB_TOKEN_VAR, OPENROUTER_API_KEY_VAR};

/// Settings shared by every goose session.
#[derive(Debug, Clone)]
pub struct GooseSettings {
    pub goose_bin: String,
    pub goose_provider: String,
    pub model: Option<String>,
    pub workspace_dir: PathBuf,
}

impl From<&AgentConfig> for GooseSettings {
    fn from(config: &AgentConfig) -> Self {
        Self {
            goose_bin: config.goose_bin.clone(),
            goose_provider: config.goose_provider.clone(),
            model: config.model.clone(),
            workspace_dir: config.workspace_dir.clone(),
        }
    }
}

/// Creates [`GooseAgent`]s.
#[derive(Debug, Clone)]
pub struct GooseFactory {
    settings: GooseSettings,
}

impl GooseFactory {
    pub fn new(settings: GooseSettings) -> Self {
        Self { settings }
    }
}

impl AgentFactory for GooseFactory {
    fn create(&self, options: SessionOptions) -> Result<Box<dyn AgentExecutor>, AgentError> {
        Ok(Box::new(GooseAgent::new(self.settings.clone(), options)?))
    }
}

/// One goose session bound to a repository checkout.
pub struct GooseAgent {
    settings: GooseSettings,
    options: SessionOptions,
    session_dir: PathBuf,
    remote_url: String,
}

impl GooseAgent {
    pub fn new(settings: GooseSettings, options: SessionOptions) -> Result<Self, AgentError> {
        let github = &options.github;
        let remote_url = remote_url(&github.host, &github.repo)?;
        let dir_name = checkout_dir_name(&options.session_id, &github.host, &github.repo)?;
        let session_dir = settings.workspace_dir.join(dir_name);
        Ok(Self {
            settings,
            options,
            session_dir,
            remote_url,
        })
    }

    /// Make sure the session has a complete checkout, cloning if needed.
    ///
    /// A clone is staged in a temporary directory next to the checkout and
    /// only moved into place once git succeeds.
    async fn ensure_checkout(&self, cancel: &CancellationToken) -> Result<(), AgentError> {
        if self.session_dir.exists() {
            if self.session_dir.join(".git").exists() && self.has_head(cancel).await? {
                debug!(dir = %self.session_dir.display(), "Reusing session checkout");
                return Ok(());
            }
            warn!(dir = %self.session_dir.display(), "Discarding incomplete checkout");
            tokio::fs::remove_dir_all(&self.session_dir).await?;
        }

        tokio::fs::create_dir_all(&self.settings.workspace_dir).await?;
        let staging = tempfile::Builder::new()
            .prefix(".clone-")
            .tempdir_in(&self.settings.workspace_dir)?;
        let target = staging.path().join("checkout");

        info!(
            repo = %self.options.github.repo,
            dir = %self.session_dir.display(),
            "Cloning repository"
        );

        let mut cmd = self.git_command();
        cmd.args(["clone", "--depth", "1", self.remote_url.as_str()])
            .arg(&target);

        let output = run_to_completion(cmd, "git", cancel).await?;
        if !output.status.success() {
            return Err(AgentError::Clone {
                repo: self.options.github.repo.clone(),
                stderr: self.redact(&output.stderr),
            });
        }

        tokio::fs::rename(&target, &self.session_dir).await?;
        Ok(())
    }

    async fn has_head(&self, cancel: &CancellationToken) -> Result<bool, AgentError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.session_dir)
            .args(["rev-parse", "--verify", "--quiet", "HEAD"])
            .env("GIT_TERMINAL_PROMPT", "0");
        let output = run_to_completion(cmd, "git", cancel).await?;
        Ok(output.status.success())
    }

    /// `git` with the token supplied as an HTTP header through the
    /// environment, so it never reaches the argument list or `.git/config`.
    fn git_command(&self) -> Command {
        let basic = STANDARD.encode(format!("x-access-token:{}", self.options.github.token));
        let mut cmd = Command::new("git");
        cmd.env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_CONFIG_COUNT", "1")
            .env("GIT_CONFIG_KEY_0", "http.extraHeader")
            .env("GIT_CONFIG_VALUE_0", format!("Authorization: Basic {}", basic));
        cmd
    }

    fn goose_command(&self, prompt: &str) -> Command {
        let mut cmd = Command::new(&self.settings.goose_bin);
        cmd.args(goose_args(
            &self.options.session_id,
            prompt,
            &self.options.instruction,
        ))
        .current_dir(&self.session_dir)
        .env(OPENROUTER_API_KEY_VAR, &self.options.api_key)
        .env(GITHUB_TOKEN_VAR, &self.options.github.token)
        .env("GOOSE_PROVIDER", &self.settings.goose_provider);
        if let Some(model) = &self.settings.model {
            cmd.env("GOOSE_MODEL", model);
        }
        cmd
    }

    /// Decode child stderr with every secret of this session masked.
    fn redact(&self, stderr: &[u8]) -> String {
        let token = &self.options.github.token;
        let basic = STANDARD.encode(format!("x-access-token:{}", token));
        let text = String::from_utf8_lossy(stderr);
        redact(
            text.trim(),
            &[basic.as_str(), token.as_str(), self.options.api_key.as_str()],
        )
    }
}

#[async_trait]
impl AgentExecutor for GooseAgent {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        prompt: &str,
    ) -> Result<Vec<u8>, AgentError> {
        self.ensure_checkout(cancel).await?;

        info!(session = %self.options.session_id, "Running goose");
        let output = run_to_completion(
            self.goose_command(prompt),
            &self.settings.goose_bin,
            cancel,
        )
        .await?;

        if !output.status.success() {
            warn!(session = %self.options.session_id, status = %output.status, "goose failed");
            return Err(AgentError::Exited {
                status: output.status.to_string(),
                stderr: self.redact(&output.stderr),
            });
        }

        debug!(
            session = %self.options.session_id,
            bytes = output.stdout.len(),
            "goose finished"
        );
        Ok(output.stdout)
    }
}

/// Spawn `cmd` and collect its output, killing it if `cancel` fires first.
async fn run_to_completion(
    mut cmd: Command,
    program: &str,
    cancel: &CancellationToken,
) -> Result<Output, AgentError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| AgentError::Spawn {
        program: program.to_string(),
        source,
    })?;

    tokio::select! {
        output = child.wait_with_output() => Ok(output?),
        _ = cancel.cancelled() => {
            warn!(program, "Cancelled, killing child process");
            Err(AgentError::Cancelled)
        }
    }
}

fn goose_args(session_id: &str, prompt: &str, instruction: &str) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--name".to_string(),
        session_id.to_string(),
        "--text".to_string(),
        prompt.to_string(),
    ];
    if !instruction.is_empty() {
        args.push("--system".to_string());
        args.push(instruction.to_string());
    }
    args
}

/// Map a session onto a single safe path component.
///
/// The readable prefix is the sanitized session name. The suffix hashes the
/// raw name together with the remote, so names that sanitize alike and
/// sessions rebound to another repository get distinct checkouts.
fn checkout_dir_name(session_id: &str, host: &str, repo: &str) -> Result<String, AgentError> {
    let name: String = session_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        return Err(AgentError::InvalidSession(format!(
            "cannot derive a directory from session name {:?}",
            session_id
        )));
    }

    let mut hasher = Sha256::new();
    for part in [session_id, host, repo] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let suffix: String = hasher.finalize()[..6]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();

    Ok(format!("{}-{}", name, suffix))
}

/// Build the clone URL for `repo` on `host`. Credentials are never part of it.
fn remote_url(host: &str, repo: &str) -> Result<String, AgentError> {
    let (scheme, rest) = host
        .split_once("://")
        .filter(|(scheme, _)| matches!(*scheme, "https" | "http" | "file"))
        .ok_or_else(|| AgentError::InvalidSession(format!("unsupported host URL: {}", host)))?;

    let rest = rest.trim_end_matches('/');
    let repo = repo.trim_matches('/');
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if rest.is_empty() || repo.is_empty() {
        return Err(AgentError::InvalidSession(format!(
            "cannot build clone URL for {:?} on {:?}",
            repo, host
        )));
    }

    Ok(format!("{}://{}/{}.git", scheme, rest, repo))
}

fn redact(text: &str, secrets: &[&str]) -> String {
    secrets
        .iter()
        .filter(|secret| !secret.is_empty())
        .fold(text.to_string(), |text, secret| text.replace(secret, "***"))
}
