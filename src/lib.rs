/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! race-map library
//!
//! Crawls a race calendar, renders the located events on a Leaflet map
//! into a build directory, and publishes that directory to static
//! hosting (a `gh-pages` branch or a local directory).

pub mod config;
pub mod connectors;
pub mod error;
pub mod models;
pub mod render;
pub mod scrape;
pub mod services;

// Re-export commonly used types for convenience
pub use config::{Config, HostingKind};
pub use connectors::{ConnectorRegistry, FsHosting, GitPages, HostingConnector};
pub use error::{MapError, MapResult};
pub use models::{Event, JobStatus, MarkerPosition, RunJob, TriggerEvent, TriggerKind};
pub use services::{JobManager, Pipeline, Steps};
