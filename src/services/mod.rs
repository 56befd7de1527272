/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Run services
//!
//! Build directory handling, job tracking, run orchestration and the
//! local preview server.

pub mod build_dir;
mod jobs;
mod pipeline;
mod preview;

pub use jobs::JobManager;
pub use pipeline::{Pipeline, Steps};
pub use preview::{preview_router, serve};
