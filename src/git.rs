use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::process::{Command as StdCommand, Stdio};

/// A git subcommand that exited non-zero.
///
/// Carries the exit code so the top level can forward it as the process exit
/// status, and the captured stderr when the command was not run with
/// inherited stdio.
#[derive(Debug)]
pub struct GitFailure {
    pub command: String,
    pub code: i32,
    pub stderr: String,
}

impl fmt::Display for GitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            write!(f, "git {} exited with status {}", self.command, self.code)
        } else {
            write!(f, "{}", stderr)
        }
    }
}

impl std::error::Error for GitFailure {}

/// Service for running git subcommands
#[derive(Debug, Clone)]
pub struct Git {
    debug: bool,
    work_dir: Option<PathBuf>,
}

impl Git {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            work_dir: None,
        }
    }

    /// Run every subcommand inside `dir` instead of the current directory.
    /// Used by tests against fixture repositories.
    pub fn in_dir(dir: impl Into<PathBuf>, debug: bool) -> Self {
        Self {
            debug,
            work_dir: Some(dir.into()),
        }
    }

    fn command(&self, args: &[&str]) -> StdCommand {
        let mut cmd = StdCommand::new("git");
        cmd.args(args);
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Execute a git subcommand, capturing its output.
    ///
    /// In debug mode the invocation is echoed and stdio is passed through to
    /// the terminal instead of being captured.
    pub async fn run(&self, args: &[&str]) -> Result<()> {
        if self.debug {
            return self.run_inherited(args).await;
        }

        let output = self
            .command(args)
            .output()
            .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

        if !output.status.success() {
            return Err(GitFailure {
                command: args.join(" "),
                code: output.status.code().unwrap_or(1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Execute a git subcommand with stdio passed through to the terminal.
    ///
    /// Used for commit and push, whose output belongs to the user. Failures
    /// carry only the exit code; git has already written its error text.
    pub async fn run_inherited(&self, args: &[&str]) -> Result<()> {
        if self.debug {
            println!("🔧 git {}", args.join(" "));
        }

        let status = self
            .command(args)
            .status()
            .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

        if !status.success() {
            return Err(GitFailure {
                command: args.join(" "),
                code: status.code().unwrap_or(1),
                stderr: String::new(),
            }
            .into());
        }

        Ok(())
    }

    /// True when the subcommand exits successfully. Output is discarded
    /// unless debug mode passes it through.
    pub async fn succeeds(&self, args: &[&str]) -> bool {
        let mut cmd = self.command(args);
        if self.debug {
            println!("🔧 git {}", args.join(" "));
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        cmd.status().map(|status| status.success()).unwrap_or(false)
    }

    /// Trimmed stdout of the subcommand, or `None` when it fails or prints
    /// nothing. Stdout is always captured; debug mode only echoes the
    /// invocation.
    pub async fn query(&self, args: &[&str]) -> Option<String> {
        if self.debug {
            println!("🔧 git {}", args.join(" "));
        }

        let output = self
            .command(args)
            .stderr(Stdio::null())
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8(output.stdout).ok()?;
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn succeeds_is_false_outside_a_repository() {
        let dir = tempdir().unwrap();
        let git = Git::in_dir(dir.path(), false);

        assert!(!git.succeeds(&["rev-parse", "--is-inside-work-tree"]).await);
    }

    #[tokio::test]
    async fn query_returns_trimmed_stdout() {
        let dir = tempdir().unwrap();
        let git = Git::in_dir(dir.path(), false);
        git.run(&["init", "-b", "main"]).await.unwrap();

        let inside = git.query(&["rev-parse", "--is-inside-work-tree"]).await;
        assert_eq!(inside.as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn query_returns_none_on_failure() {
        let dir = tempdir().unwrap();
        let git = Git::in_dir(dir.path(), false);

        let result = git.query(&["rev-parse", "--is-inside-work-tree"]).await;
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn debug_mode_does_not_change_outcomes() {
        let dir = tempdir().unwrap();
        let git = Git::in_dir(dir.path(), true);
        git.run(&["init", "-b", "main"]).await.unwrap();

        assert!(git.succeeds(&["rev-parse", "--is-inside-work-tree"]).await);
        assert!(!git.succeeds(&["rev-parse", "--verify", "no-such-ref"]).await);

        let inside = git.query(&["rev-parse", "--is-inside-work-tree"]).await;
        assert_eq!(inside.as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn run_failure_carries_exit_code_and_stderr() {
        let dir = tempdir().unwrap();
        let git = Git::in_dir(dir.path(), false);
        git.run(&["init", "-b", "main"]).await.unwrap();

        let err = git
            .run(&["rev-parse", "--verify", "no-such-ref"])
            .await
            .unwrap_err();

        let failure = err.downcast_ref::<GitFailure>().unwrap();
        assert_ne!(failure.code, 0);
        assert!(!failure.stderr.is_empty());
        assert_eq!(failure.command, "rev-parse --verify no-such-ref");
    }

    #[test]
    fn failure_display_prefers_stderr() {
        let failure = GitFailure {
            command: "push -u origin main".to_string(),
            code: 128,
            stderr: "fatal: unable to access remote\n".to_string(),
        };
        assert_eq!(failure.to_string(), "fatal: unable to access remote");

        let silent = GitFailure {
            command: "push -u origin main".to_string(),
            code: 128,
            stderr: String::new(),
        };
        assert_eq!(
            silent.to_string(),
            "git push -u origin main exited with status 128"
        );
    }
}
