/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Filesystem hosting connector
//!
//! Mirrors the build directory into a local directory.
//! This is useful for local development and testing.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::connectors::traits::{ConnectorInfo, HostingConnector};
use crate::error::MapResult;
use crate::models::{PublishOutcome, RunJob};
use crate::services::build_dir;

/// Filesystem hosting connector
///
/// Files are first copied into a staging directory next to the target,
/// which then replaces the target. A failed copy leaves the previous
/// publication untouched.
pub struct FsHosting {
    /// Directory that receives the published site
    hosting_path: PathBuf,

    /// Page opened by `get_url`
    entry_file: String,
}

impl FsHosting {
    /// Create a new FsHosting connector
    ///
    /// # Arguments
    /// * `hosting_path` - Directory that receives the published site
    /// * `entry_file` - Name of the main page inside it
    pub fn new(hosting_path: PathBuf, entry_file: impl Into<String>) -> Self {
        FsHosting {
            hosting_path,
            entry_file: entry_file.into(),
        }
    }

    fn staging_dir(&self) -> PathBuf {
        let name = self
            .hosting_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "public".to_string());
        self.hosting_path
            .with_file_name(format!(".{}.staging-{}", name, Uuid::new_v4()))
    }

    /// Copy the build into staging, then swap it in
    async fn replace_with(&self, build_dir: &Path, files: &[PathBuf], job: &mut RunJob) -> MapResult<()> {
        let staging = self.staging_dir();
        job.log(format!("Staging {} files in {}", files.len(), staging.display()));

        if let Err(e) = build_dir::copy_files(build_dir, &staging, files).await {
            let _ = fs::remove_dir_all(&staging).await;
            return Err(e);
        }

        if fs::metadata(&self.hosting_path).await.is_ok() {
            fs::remove_dir_all(&self.hosting_path).await?;
        }
        if let Some(parent) = self.hosting_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(&staging, &self.hosting_path).await?;
        Ok(())
    }
}

impl ConnectorInfo for FsHosting {
    fn connector_id(&self) -> &str {
        "fs-hosting"
    }

    fn display_name(&self) -> &str {
        "File system hosting"
    }
}

#[async_trait]
impl HostingConnector for FsHosting {
    async fn publish(&self, build_dir: &Path, job: &mut RunJob) -> MapResult<PublishOutcome> {
        let files = build_dir::list_files(build_dir).await?;
        let target = self.hosting_path.display().to_string();

        let changed = !build_dir::same_content(build_dir, &self.hosting_path).await?;
        if changed {
            self.replace_with(build_dir, &files, job).await?;
            job.log(format!("Published {} files to {}", files.len(), target));
        } else {
            job.log(format!("{} already up to date", target));
        }

        Ok(PublishOutcome {
            connector_id: self.connector_id().to_string(),
            target,
            files: files.len(),
            changed,
            revision: None,
            url: None,
        })
    }

    async fn get_url(&self) -> MapResult<String> {
        let file_path = self.hosting_path.join(&self.entry_file);
        Ok(format!("file://{}", file_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TriggerKind;

    fn job() -> RunJob {
        RunJob::new("test".into(), TriggerKind::Local, "publish".into())
    }

    #[tokio::test]
    async fn publish_replaces_previous_content() {
        let tmp = tempfile::tempdir().unwrap();
        let build = tmp.path().join("build");
        let public = tmp.path().join("public");
        fs::create_dir_all(&build).await.unwrap();
        fs::create_dir_all(&public).await.unwrap();
        fs::write(build.join("index.html"), "map").await.unwrap();
        fs::write(public.join("stale.html"), "old").await.unwrap();

        let hosting = FsHosting::new(public.clone(), "index.html");
        let outcome = hosting.publish(&build, &mut job()).await.unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.files, 1);
        assert_eq!(
            build_dir::list_files(&public).await.unwrap(),
            vec![PathBuf::from("index.html")]
        );
    }

    #[tokio::test]
    async fn second_identical_publish_is_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let build = tmp.path().join("build");
        fs::create_dir_all(&build).await.unwrap();
        fs::write(build.join("index.html"), "map").await.unwrap();

        let hosting = FsHosting::new(tmp.path().join("site"), "index.html");
        assert!(hosting.publish(&build, &mut job()).await.unwrap().changed);
        assert!(!hosting.publish(&build, &mut job()).await.unwrap().changed);
    }

    #[tokio::test]
    async fn url_points_at_entry_file() {
        let hosting = FsHosting::new(PathBuf::from("/srv/site"), "index.html");
        assert_eq!(hosting.get_url().await.unwrap(), "file:///srv/site/index.html");
    }
}
