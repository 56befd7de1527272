/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Page fetching

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::MapResult;

/// Source of page bodies
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the body of `url`; non-success statuses are errors
    async fn fetch(&self, url: &str) -> MapResult<String>;
}

/// Fetches pages over HTTP
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> MapResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("race-map/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> MapResult<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
