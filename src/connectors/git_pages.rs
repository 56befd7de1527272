/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Git branch hosting connector
//!
//! Publishes the build directory as the sole content of a branch
//! (`gh-pages` by default) of a git remote, using the `git` executable.
//! Nothing is pushed unless a complete commit exists, and a build
//! identical to the branch tip produces no commit at all.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use uuid::Uuid;

use crate::connectors::traits::{ConnectorInfo, HostingConnector};
use crate::error::{MapError, MapResult};
use crate::models::{PublishOutcome, RunJob};
use crate::services::build_dir;

/// Identity used for publication commits when none is configured
const DEFAULT_EMAIL: &str = "race-map@users.noreply.github.com";

/// Git branch hosting connector
pub struct GitPages {
    /// Remote URL (may carry a token)
    remote: String,

    /// Branch whose content is replaced
    branch: String,

    /// Commit author
    author_name: String,
    author_email: String,
}

impl GitPages {
    /// Create a new GitPages connector
    ///
    /// # Arguments
    /// * `remote` - URL or path of the remote to push to
    /// * `branch` - Branch to publish, e.g. "gh-pages"
    pub fn new(remote: impl Into<String>, branch: impl Into<String>) -> Self {
        let author_name = whoami::fallible::username().unwrap_or_else(|_| "race-map".to_string());
        GitPages {
            remote: remote.into(),
            branch: branch.into(),
            author_name,
            author_email: DEFAULT_EMAIL.to_string(),
        }
    }

    /// Connector for the `origin` remote of the repository at `repo_dir`
    pub async fn from_origin(repo_dir: &Path, branch: impl Into<String>) -> MapResult<Self> {
        let remote = run_git(repo_dir, &["remote", "get-url", "origin"]).await?;
        Ok(GitPages::new(remote.trim(), branch))
    }

    /// Remote with credentials masked, for logs
    pub fn display_remote(&self) -> String {
        redact_credentials(&self.remote)
    }

    /// Whether the remote already has the branch
    async fn branch_exists(&self, worktree: &Path) -> MapResult<bool> {
        let heads = run_git(
            worktree,
            &["ls-remote", "--heads", "origin", &format!("refs/heads/{}", self.branch)],
        )
        .await?;
        Ok(!heads.trim().is_empty())
    }

    /// Build the commit in `worktree` and push it
    ///
    /// Returns whether a commit was pushed, and the resulting tree hash.
    async fn publish_in(
        &self,
        worktree: &Path,
        build_dir: &Path,
        files: &[PathBuf],
        job: &mut RunJob,
    ) -> MapResult<(bool, String)> {
        run_git(worktree, &["init", "--quiet"]).await?;
        run_git(worktree, &["remote", "add", "origin", &self.remote]).await?;

        let existed = self.branch_exists(worktree).await?;
        if existed {
            job.log(format!("Fetching {} from {}", self.branch, self.display_remote()));
            run_git(worktree, &["fetch", "--quiet", "--depth", "1", "origin", &self.branch]).await?;
            run_git(worktree, &["checkout", "--quiet", "-B", &self.branch, "FETCH_HEAD"]).await?;
        } else {
            job.log(format!("Creating branch {}", self.branch));
            run_git(worktree, &["checkout", "--quiet", "--orphan", &self.branch]).await?;
        }

        build_dir::clear_dir(worktree, &[".git"]).await?;
        build_dir::copy_files(build_dir, worktree, files).await?;
        // Forced so ignore rules of the host never drop build files
        run_git(worktree, &["add", "--all", "--force"]).await?;

        let status = run_git(worktree, &["status", "--porcelain"]).await?;
        let changed = !existed || !status.trim().is_empty();

        if changed {
            let message = format!("Publish map ({:?} run {})", job.trigger, job.base.job_id);
            run_git(
                worktree,
                &[
                    "-c",
                    &format!("user.name={}", self.author_name),
                    "-c",
                    &format!("user.email={}", self.author_email),
                    "commit",
                    "--quiet",
                    "--message",
                    &message,
                ],
            )
            .await?;
            job.log(format!("Pushing {} to {}", self.branch, self.display_remote()));
            run_git(
                worktree,
                &["push", "--quiet", "origin", &format!("HEAD:refs/heads/{}", self.branch)],
            )
            .await?;
        } else {
            job.log(format!("{} already matches the build", self.branch));
        }

        let tree = run_git(worktree, &["rev-parse", "HEAD^{tree}"]).await?;
        Ok((changed, tree.trim().to_string()))
    }
}

impl ConnectorInfo for GitPages {
    fn connector_id(&self) -> &str {
        "git-pages"
    }

    fn display_name(&self) -> &str {
        "Git pages branch"
    }
}

#[async_trait]
impl HostingConnector for GitPages {
    async fn publish(&self, build_dir: &Path, job: &mut RunJob) -> MapResult<PublishOutcome> {
        let files = build_dir::list_files(build_dir).await?;
        let worktree = std::env::temp_dir().join(format!("race-map-publish-{}", Uuid::new_v4()));
        fs::create_dir_all(&worktree).await?;

        let result = self.publish_in(&worktree, build_dir, &files, job).await;

        if let Err(e) = fs::remove_dir_all(&worktree).await {
            tracing::warn!("Could not remove {}: {}", worktree.display(), e);
        }

        let (changed, tree) = result?;
        tracing::info!(
            "Published {} files to {} (tree {})",
            files.len(),
            self.branch,
            tree
        );

        Ok(PublishOutcome {
            connector_id: self.connector_id().to_string(),
            target: format!("{}#{}", self.display_remote(), self.branch),
            files: files.len(),
            changed,
            revision: Some(tree),
            url: None,
        })
    }

    async fn get_url(&self) -> MapResult<String> {
        Ok(pages_url(&self.remote).unwrap_or_else(|| format!("{}#{}", self.display_remote(), self.branch)))
    }
}

/// Run `git` in `dir` and return its stdout
async fn run_git(dir: &Path, args: &[&str]) -> MapResult<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .await?;

    if !output.status.success() {
        return Err(MapError::Git {
            command: redact_credentials(&args.join(" ")),
            stderr: redact_credentials(String::from_utf8_lossy(&output.stderr).trim()),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Mask `user:secret@` in URLs
fn redact_credentials(text: &str) -> String {
    text.split(' ')
        .map(|word| match (word.find("://"), word.find('@')) {
            (Some(scheme), Some(at)) if at > scheme => {
                format!("{}://***{}", &word[..scheme], &word[at..])
            }
            _ => word.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// GitHub Pages address of a github.com remote
fn pages_url(remote: &str) -> Option<String> {
    let path = remote
        .split("github.com")
        .nth(1)?
        .trim_start_matches([':', '/'])
        .trim_end_matches(".git");
    let (owner, repo) = path.split_once('/')?;
    Some(format!("https://{}.github.io/{}/", owner.to_lowercase(), repo))
}
