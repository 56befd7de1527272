/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Connector trait definitions
//!
//! HostingConnector: publishes a build directory so it can be served
//! as a static site.

use std::path::Path;

use async_trait::async_trait;

use crate::error::MapResult;
use crate::models::{PublishOutcome, RunJob};

/// Base information that all connectors must provide
pub trait ConnectorInfo: Send + Sync {
    /// Unique identifier for this connector (e.g., "fs-hosting")
    fn connector_id(&self) -> &str;

    /// Human-readable name for logs and reports
    fn display_name(&self) -> &str;
}

/// HostingConnector publishes the generated site
///
/// Implementations:
/// - Local filesystem (FsHosting)
/// - A branch of a git remote (GitPages)
///
/// Publication replaces the previous content wholesale. It must be
/// all-or-nothing: on error the previously published content stays.
#[async_trait]
pub trait HostingConnector: ConnectorInfo {
    /// Publish every file under `build_dir`
    ///
    /// `build_dir` is known to exist and hold at least one file.
    async fn publish(&self, build_dir: &Path, job: &mut RunJob) -> MapResult<PublishOutcome>;

    /// Where the published site can be inspected
    async fn get_url(&self) -> MapResult<String>;
}
