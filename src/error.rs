/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Error types for race-map
//!
//! Every fallible step of a run (crawl, render, publish) reports one of
//! these. The binary turns them into a non-zero exit status.

use thiserror::Error;

/// Errors that can occur during a run
#[derive(Error, Debug)]
pub enum MapError {
    /// HTTP request failed or returned a non-success status
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid input data (bad URL, bad configuration value)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The crawl found no event with a marker
    #[error("No markers to plot")]
    NoMarkers,

    /// The build directory is missing or empty at publish time
    #[error("Build directory {0} is missing or empty")]
    EmptyBuild(String),

    /// A git command exited non-zero
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    /// Filesystem operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for race-map operations
pub type MapResult<T> = Result<T, MapError>;
