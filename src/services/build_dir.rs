/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Build directory helpers
//!
//! The build directory is the only thing shared between generation and
//! publication. These helpers create it fresh, list it, and copy it.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{MapError, MapResult};

/// Remove whatever is at `dir` and create it empty
pub async fn prepare(dir: &Path) -> MapResult<()> {
    if fs::metadata(dir).await.is_ok() {
        fs::remove_dir_all(dir).await?;
    }
    fs::create_dir_all(dir).await?;
    tracing::debug!("Prepared fresh build directory {}", dir.display());
    Ok(())
}

/// Relative paths of all files under `dir`, sorted
pub async fn list_files(dir: &Path) -> MapResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![PathBuf::new()];

    while let Some(relative) = pending.pop() {
        let mut entries = fs::read_dir(dir.join(&relative)).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = relative.join(entry.file_name());
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Files of a build directory that is ready to publish
///
/// Fails with `EmptyBuild` when the directory is missing or holds no file.
pub async fn publishable_files(dir: &Path) -> MapResult<Vec<PathBuf>> {
    let empty = || MapError::EmptyBuild(dir.display().to_string());
    match fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return Err(empty()),
    }
    let files = list_files(dir).await?;
    if files.is_empty() {
        return Err(empty());
    }
    Ok(files)
}

/// Copy `files` (relative to `src`) into `dst`, creating parents
pub async fn copy_files(src: &Path, dst: &Path, files: &[PathBuf]) -> MapResult<()> {
    for file in files {
        let target = dst.join(file);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(src.join(file), &target).await?;
    }
    Ok(())
}

/// Remove every entry of `dir` except the names in `keep`
pub async fn clear_dir(dir: &Path, keep: &[&str]) -> MapResult<()> {
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if keep.iter().any(|k| name == *k) {
            continue;
        }
        if entry.file_type().await?.is_dir() {
            fs::remove_dir_all(entry.path()).await?;
        } else {
            fs::remove_file(entry.path()).await?;
        }
    }
    Ok(())
}

/// Whether two directories hold the same files with the same bytes
pub async fn same_content(a: &Path, b: &Path) -> MapResult<bool> {
    if fs::metadata(a).await.is_err() || fs::metadata(b).await.is_err() {
        return Ok(false);
    }

    let files = list_files(a).await?;
    if files != list_files(b).await? {
        return Ok(false);
    }
    for file in &files {
        if fs::read(a.join(file)).await? != fs::read(b.join(file)).await? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(path, content).await.unwrap();
    }

    #[tokio::test]
    async fn prepare_empties_existing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let build = tmp.path().join("build");
        write(&build, "stale/old.html", "old").await;

        prepare(&build).await.unwrap();

        assert!(build.is_dir());
        assert!(list_files(&build).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn publishable_requires_files() {
        let tmp = tempfile::tempdir().unwrap();
        let build = tmp.path().join("build");

        assert!(matches!(
            publishable_files(&build).await,
            Err(MapError::EmptyBuild(_))
        ));

        fs::create_dir_all(build.join("nested")).await.unwrap();
        assert!(matches!(
            publishable_files(&build).await,
            Err(MapError::EmptyBuild(_))
        ));

        write(&build, "nested/index.html", "map").await;
        assert_eq!(
            publishable_files(&build).await.unwrap(),
            vec![PathBuf::from("nested/index.html")]
        );
    }

    #[tokio::test]
    async fn copy_and_compare() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        write(&src, "index.html", "map").await;
        write(&src, "assets/app.css", "body{}").await;

        let files = list_files(&src).await.unwrap();
        copy_files(&src, &dst, &files).await.unwrap();
        assert!(same_content(&src, &dst).await.unwrap());

        write(&dst, "index.html", "changed").await;
        assert!(!same_content(&src, &dst).await.unwrap());
    }

    #[tokio::test]
    async fn clear_keeps_listed_entries() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), ".git/HEAD", "ref").await;
        write(tmp.path(), "old/page.html", "x").await;
        write(tmp.path(), "index.html", "x").await;

        clear_dir(tmp.path(), &[".git"]).await.unwrap();

        assert_eq!(
            list_files(tmp.path()).await.unwrap(),
            vec![PathBuf::from(".git/HEAD")]
        );
    }
}
