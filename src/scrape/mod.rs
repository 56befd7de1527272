/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Calendar scraping
//!
//! Listing pages give event links and dates; each event page carries
//! the Leaflet marker that positions it on the map.

mod crawler;
mod fetcher;
mod listing;
mod marker;

pub use crawler::Crawler;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use listing::extract_events;
pub use marker::extract_marker;
