/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Calendar crawler
//!
//! Walks the listing pages, then visits every event page to read its
//! marker. Failures on single pages are logged and skipped so one broken
//! page never aborts the crawl.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};

use crate::models::{Event, MarkerPosition};
use crate::scrape::{extract_events, extract_marker, PageFetcher};

/// Crawls a paginated calendar
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,

    /// Maximum number of event pages in flight
    concurrency: usize,

    show_progress: bool,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, concurrency: usize) -> Self {
        Crawler {
            fetcher,
            concurrency: concurrency.max(1),
            show_progress: false,
        }
    }

    /// Draw a progress bar while event pages are fetched
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Crawl every listing page and locate each event found
    ///
    /// Markers come back ordered by date, then link.
    pub async fn crawl(&self, listing_urls: &[String]) -> Vec<MarkerPosition> {
        let events = self.collect_events(listing_urls).await;
        self.locate(events).await
    }

    /// Collect events from listing pages, first occurrence of a link wins
    pub async fn collect_events(&self, listing_urls: &[String]) -> Vec<Event> {
        let mut seen = HashSet::new();
        let mut events = Vec::new();

        for url in listing_urls {
            tracing::info!("Loading listing page {}", url);
            let html = match self.fetcher.fetch(url).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!("Failed to load {}: {}", url, e);
                    continue;
                }
            };

            match extract_events(&html, url) {
                Ok(found) => {
                    for event in found {
                        if seen.insert(event.link.clone()) {
                            events.push(event);
                        }
                    }
                }
                Err(e) => tracing::error!("Failed to parse {}: {}", url, e),
            }
        }

        tracing::info!("{} distinct events across {} listing pages", events.len(), listing_urls.len());
        events
    }

    /// Fetch event pages and keep the events that carry a marker
    pub async fn locate(&self, events: Vec<Event>) -> Vec<MarkerPosition> {
        let progress = self.progress_bar(events.len() as u64);

        let fetched = stream::iter(events)
            .map(|event| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    let page = fetcher.fetch(&event.link).await;
                    (event, page)
                }
            })
            .buffer_unordered(self.concurrency);
        tokio::pin!(fetched);

        let mut markers = Vec::new();
        while let Some((event, page)) = fetched.next().await {
            progress.inc(1);
            match page {
                Ok(html) => match extract_marker(&html) {
                    Some((lat, lon)) => {
                        tracing::debug!("Found marker at: {}, {} for {}", lat, lon, event.link);
                        markers.push(event.at(lat, lon));
                    }
                    None => tracing::warn!("No marker found in: {}", event.link),
                },
                Err(e) => tracing::error!("Error fetching {}: {}", event.link, e),
            }
        }
        progress.finish_and_clear();

        markers.sort_by(|a, b| {
            a.event
                .date
                .cmp(&b.event.date)
                .then_with(|| a.event.link.cmp(&b.event.link))
        });

        tracing::info!("{} events located on the map", markers.len());
        markers
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.blue} Processing links [{bar:40}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    }
}
