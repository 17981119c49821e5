use anyhow::Result;

use crate::cli::PushArgs;
use crate::config::PushConfig;
use crate::git::Git;

/// Where the branch switch should land, in strict preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchTarget {
    /// The branch already exists locally
    Local,
    /// The branch exists on the remote only; check it out tracking
    RemoteTracking,
    /// The branch is new; create it from the default branch
    CreateFromDefault,
}

/// Pick the checkout target. Local wins over remote, remote over creation.
pub fn select_branch_target(local_exists: bool, remote_exists: bool) -> BranchTarget {
    if local_exists {
        BranchTarget::Local
    } else if remote_exists {
        BranchTarget::RemoteTracking
    } else {
        BranchTarget::CreateFromDefault
    }
}

/// A commit is issued only when something is staged, unless allow-empty
/// forces one.
pub fn should_commit(has_staged_changes: bool, allow_empty: bool) -> bool {
    has_staged_changes || allow_empty
}

/// Strip the remote prefix from a short symbolic ref like `origin/main`.
pub fn short_branch_name<'a>(symbolic_ref: &'a str, remote: &str) -> &'a str {
    symbolic_ref
        .strip_prefix(remote)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(symbolic_ref)
}

/// The stage / switch / commit / push sequence
pub struct PushCommand {
    remote: String,
    fallback_branch: String,
}

impl PushCommand {
    pub fn new(config: &PushConfig) -> Self {
        Self {
            remote: config.remote.clone(),
            fallback_branch: config.default_branch.clone(),
        }
    }

    /// Run the full sequence: verify repository, fetch, switch or create the
    /// branch, stage everything, commit when warranted, push with upstream
    /// tracking.
    pub async fn execute(&self, args: &PushArgs, git: &Git) -> Result<()> {
        self.ensure_repository(git).await?;

        git.run(&["fetch", &self.remote, "--prune"]).await?;

        let base = self.default_branch(git).await;
        self.switch_to(git, &args.branch, &base).await?;

        git.run(&["add", "-A"]).await?;

        // git diff --cached --quiet exits non-zero when the index differs
        // from HEAD
        let has_staged_changes = !git.succeeds(&["diff", "--cached", "--quiet"]).await;
        if should_commit(has_staged_changes, args.allow_empty) {
            let mut commit_args = vec!["commit"];
            if args.allow_empty {
                commit_args.push("--allow-empty");
            }
            commit_args.push("-m");
            commit_args.push(&args.message);
            git.run_inherited(&commit_args).await?;
        }

        git.run_inherited(&["push", "-u", &self.remote, &args.branch])
            .await?;

        println!("✅ pushed to {}/{}", self.remote, args.branch);
        Ok(())
    }

    async fn ensure_repository(&self, git: &Git) -> Result<()> {
        if git.succeeds(&["rev-parse", "--is-inside-work-tree"]).await {
            return Ok(());
        }
        anyhow::bail!("The current directory is not a git repository (run `git init` and try again)")
    }

    /// Branch the remote's symbolic HEAD points to, or the configured
    /// fallback when it is not set.
    async fn default_branch(&self, git: &Git) -> String {
        let head_ref = format!("refs/remotes/{}/HEAD", self.remote);
        match git.query(&["symbolic-ref", "--short", "-q", &head_ref]).await {
            Some(head) => short_branch_name(&head, &self.remote).to_string(),
            None => self.fallback_branch.clone(),
        }
    }

    /// Land on `branch`, preferring a local match, then a remote tracking
    /// checkout, then creation from `base`. `git switch` is tried first with
    /// `git checkout` as the fallback for older git versions.
    async fn switch_to(&self, git: &Git, branch: &str, base: &str) -> Result<()> {
        let local_ref = format!("refs/heads/{}", branch);
        let local_exists = git
            .succeeds(&["show-ref", "--verify", "--quiet", &local_ref])
            .await;
        let remote_exists = if local_exists {
            false
        } else {
            git.succeeds(&["ls-remote", "--exit-code", "--heads", &self.remote, branch])
                .await
        };

        match select_branch_target(local_exists, remote_exists) {
            BranchTarget::Local => {
                if !git.succeeds(&["switch", branch]).await {
                    git.run(&["checkout", branch]).await?;
                }
            }
            BranchTarget::RemoteTracking => {
                let tracking = format!("{}/{}", self.remote, branch);
                if !git.succeeds(&["switch", "-t", &tracking]).await {
                    git.run(&["checkout", "-t", &tracking]).await?;
                }
            }
            BranchTarget::CreateFromDefault => {
                let tracking_base = format!("{}/{}", self.remote, base);
                let on_base = git.succeeds(&["switch", base]).await
                    || git.succeeds(&["switch", "-t", &tracking_base]).await
                    || git.succeeds(&["checkout", base]).await;
                if !on_base {
                    git.run(&["checkout", "-t", &tracking_base]).await?;
                }

                if !git.succeeds(&["switch", "-c", branch]).await {
                    git.run(&["checkout", "-b", branch]).await?;
                }
            }
        }

        Ok(())
    }
}
