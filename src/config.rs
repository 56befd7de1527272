/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Configuration for race-map
//!
//! Loads settings from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{MapError, MapResult};

/// Default calendar listing page
pub const DEFAULT_START_URL: &str = "https://fftri.t2area.com/calendrier.html";

/// Which hosting connector publishes the build directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingKind {
    /// Push to a branch of a git remote (gh-pages)
    Git,
    /// Mirror into a local directory
    Fs,
}

impl HostingKind {
    /// ID of the connector implementing this kind
    pub fn connector_id(self) -> &'static str {
        match self {
            HostingKind::Git => "git-pages",
            HostingKind::Fs => "fs-hosting",
        }
    }
}

impl FromStr for HostingKind {
    type Err = MapError;

    fn from_str(s: &str) -> MapResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "git" | "git-pages" => Ok(HostingKind::Git),
            "fs" | "fs-hosting" => Ok(HostingKind::Fs),
            other => Err(MapError::InvalidInput(format!(
                "unknown hosting connector '{}'",
                other
            ))),
        }
    }
}

/// Run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// First calendar listing page; pagination is appended as `?limitstart=N`
    pub start_url: String,

    /// Listing pages are requested for offsets `0..page_limit` stepping by `page_step`
    pub page_limit: usize,
    pub page_step: usize,

    /// Directory the generator writes into, and the publisher reads from
    pub build_dir: PathBuf,

    /// Name of the generated map page inside `build_dir`
    pub output_file: String,

    /// Initial map centre (lat, lon) and zoom, also used by the reset button
    pub center: (f64, f64),
    pub zoom: u8,

    /// Maximum number of event pages fetched at once
    pub fetch_concurrency: usize,

    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,

    /// Selected hosting connector
    pub hosting: HostingKind,

    /// Branch the git connector publishes to
    pub publish_branch: String,

    /// Git remote to publish to. `None` means the `origin` of the current repository.
    pub remote: Option<String>,

    /// Target directory of the filesystem connector
    pub hosting_path: PathBuf,

    /// Pushes to any other branch do not trigger a run
    pub main_branch: String,

    /// Port of the preview server
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - RACE_MAP_START_URL: Calendar listing URL
    /// - RACE_MAP_PAGE_LIMIT / RACE_MAP_PAGE_STEP: Pagination (default: 200 / 10)
    /// - RACE_MAP_BUILD_DIR: Output directory (default: "build")
    /// - RACE_MAP_OUTPUT_FILE: Map page name (default: "index.html")
    /// - RACE_MAP_CENTER: "lat,lon" (default: Paris)
    /// - RACE_MAP_ZOOM: Initial zoom (default: 6)
    /// - RACE_MAP_FETCH_CONCURRENCY: Parallel event fetches (default: 4)
    /// - RACE_MAP_HTTP_TIMEOUT_SECS: Request timeout (default: 30)
    /// - RACE_MAP_HOSTING: "git" or "fs" (default: "git")
    /// - RACE_MAP_PUBLISH_BRANCH: Target branch (default: "gh-pages")
    /// - RACE_MAP_REMOTE: Git remote URL (default: GitHub Actions remote, else origin)
    /// - RACE_MAP_HOSTING_PATH: fs hosting target (default: "public")
    /// - RACE_MAP_MAIN_BRANCH: Branch whose pushes trigger a run (default: "main")
    /// - RACE_MAP_PORT: Preview server port (default: 6806)
    pub fn from_env() -> MapResult<Self> {
        // Try to load .env file, but don't fail if it doesn't exist
        let _ = dotenvy::dotenv();

        let defaults = Config::default();

        let center = match env::var("RACE_MAP_CENTER") {
            Ok(raw) => parse_center(&raw)?,
            Err(_) => defaults.center,
        };

        let hosting = match env::var("RACE_MAP_HOSTING") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.hosting,
        };

        let remote = env::var("RACE_MAP_REMOTE").ok().or_else(github_actions_remote);

        Ok(Config {
            start_url: env::var("RACE_MAP_START_URL").unwrap_or(defaults.start_url),
            page_limit: env_parse("RACE_MAP_PAGE_LIMIT").unwrap_or(defaults.page_limit),
            page_step: env_parse("RACE_MAP_PAGE_STEP")
                .filter(|step| *step > 0)
                .unwrap_or(defaults.page_step),
            build_dir: env::var("RACE_MAP_BUILD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.build_dir),
            output_file: env::var("RACE_MAP_OUTPUT_FILE").unwrap_or(defaults.output_file),
            center,
            zoom: env_parse("RACE_MAP_ZOOM").unwrap_or(defaults.zoom),
            fetch_concurrency: env_parse("RACE_MAP_FETCH_CONCURRENCY")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.fetch_concurrency),
            http_timeout_secs: env_parse("RACE_MAP_HTTP_TIMEOUT_SECS")
                .unwrap_or(defaults.http_timeout_secs),
            hosting,
            publish_branch: env::var("RACE_MAP_PUBLISH_BRANCH").unwrap_or(defaults.publish_branch),
            remote,
            hosting_path: env::var("RACE_MAP_HOSTING_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.hosting_path),
            main_branch: env::var("RACE_MAP_MAIN_BRANCH").unwrap_or(defaults.main_branch),
            port: env_parse("RACE_MAP_PORT").unwrap_or(defaults.port),
        })
    }

    /// Listing page URLs in crawl order
    pub fn listing_urls(&self) -> Vec<String> {
        (0..self.page_limit)
            .step_by(self.page_step.max(1))
            .map(|offset| format!("{}?limitstart={}", self.start_url, offset))
            .collect()
    }

    /// Prefix stripped from event links to build their titles
    ///
    /// `https://host/calendrier.html` lists events under `https://host/calendrier/`.
    pub fn event_prefix(&self) -> String {
        let base = self.start_url.split('?').next().unwrap_or(&self.start_url);
        format!("{}/", base.strip_suffix(".html").unwrap_or(base))
    }

    /// Full path of the generated map page
    pub fn output_path(&self) -> PathBuf {
        self.build_dir.join(&self.output_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            start_url: DEFAULT_START_URL.to_string(),
            page_limit: 200,
            page_step: 10,
            build_dir: PathBuf::from("build"),
            output_file: "index.html".to_string(),
            center: (48.856614, 2.3522219),
            zoom: 6,
            fetch_concurrency: 4,
            http_timeout_secs: 30,
            hosting: HostingKind::Git,
            publish_branch: "gh-pages".to_string(),
            remote: None,
            hosting_path: PathBuf::from("public"),
            main_branch: "main".to_string(),
            port: 6806,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse a "lat,lon" pair
pub fn parse_center(raw: &str) -> MapResult<(f64, f64)> {
    let invalid = || MapError::InvalidInput(format!("map centre must be 'lat,lon', got '{}'", raw));
    let (lat, lon) = raw.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
    Ok((lat, lon))
}

/// Authenticated remote of the repository running the workflow
///
/// The workflow grants `contents: write`, so the job token can push.
fn github_actions_remote() -> Option<String> {
    let repository = env::var("GITHUB_REPOSITORY").ok()?;
    let token = env::var("GITHUB_TOKEN").ok()?;
    let server = env::var("GITHUB_SERVER_URL").unwrap_or_else(|_| "https://github.com".to_string());
    let host = server
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    Some(format!(
        "https://x-access-token:{}@{}/{}.git",
        token, host, repository
    ))
}
