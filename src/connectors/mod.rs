/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Hosting connectors
//!
//! Connectors are backends that publish the build directory.

mod fs_hosting;
mod git_pages;
mod registry;
mod traits;

pub use fs_hosting::FsHosting;
pub use git_pages::GitPages;
pub use registry::ConnectorRegistry;
pub use traits::{ConnectorInfo, HostingConnector};
