/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Workflow run orchestration
//!
//! A run prepares a fresh build directory, generates the map into it,
//! checks it is not empty, and hands it to the hosting connector.
//! Publication never starts after a failed generation.

use std::sync::Arc;

use crate::config::Config;
use crate::connectors::ConnectorRegistry;
use crate::error::{MapError, MapResult};
use crate::models::{PublishOutcome, RunJob, TriggerEvent};
use crate::render::MapPage;
use crate::scrape::{Crawler, PageFetcher};
use crate::services::{build_dir, JobManager};

/// Which steps a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steps {
    Generate,
    Publish,
    GenerateAndPublish,
}

impl Steps {
    fn generates(self) -> bool {
        matches!(self, Steps::Generate | Steps::GenerateAndPublish)
    }

    fn publishes(self) -> bool {
        matches!(self, Steps::Publish | Steps::GenerateAndPublish)
    }
}

/// Runs the generate-then-publish sequence
pub struct Pipeline {
    config: Arc<Config>,
    crawler: Crawler,
    registry: Arc<ConnectorRegistry>,
    job_manager: JobManager,
}

impl Pipeline {
    pub fn new(
        config: Arc<Config>,
        fetcher: Arc<dyn PageFetcher>,
        registry: Arc<ConnectorRegistry>,
        job_manager: JobManager,
    ) -> Self {
        let crawler = Crawler::new(fetcher, config.fetch_concurrency);
        Pipeline {
            config,
            crawler,
            registry,
            job_manager,
        }
    }

    /// Show crawl progress on the terminal
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.crawler = self.crawler.with_progress(show_progress);
        self
    }

    pub fn job_manager(&self) -> &JobManager {
        &self.job_manager
    }

    /// Execute one workflow run for `trigger`
    ///
    /// The returned job is finished: SUCCESS, ERROR, or SKIPPED when the
    /// trigger does not call for a run.
    pub async fn run(&self, trigger: &TriggerEvent, steps: Steps) -> RunJob {
        let mut job = self
            .job_manager
            .start_job(trigger.kind, format!("{:?} run triggered by {:?}", steps, trigger.kind));

        if let Err(reason) = trigger.accepts(&self.config.main_branch) {
            tracing::info!("{}", reason);
            job.skip(reason);
            self.job_manager.update_job(&job);
            return job;
        }

        match self.execute(steps, &mut job).await {
            Ok(()) => {
                let message = match &job.publication {
                    Some(p) if p.changed => format!("Published {} files to {}", p.files, p.target),
                    Some(p) => format!("{} already up to date", p.target),
                    None => format!("Generated map with {} markers", job.markers),
                };
                tracing::info!("{}", message);
                job.success(message);
            }
            Err(e) => {
                tracing::error!("Run failed: {}", e);
                job.fail(format!("Run failed: {}", e));
            }
        }

        self.job_manager.update_job(&job);
        job
    }

    async fn execute(&self, steps: Steps, job: &mut RunJob) -> MapResult<()> {
        if steps.generates() {
            self.generate(job).await?;
        }
        if steps.publishes() {
            self.publish(job).await?;
        }
        Ok(())
    }

    /// Crawl the calendar and write the map into a fresh build directory
    pub async fn generate(&self, job: &mut RunJob) -> MapResult<()> {
        let build = &self.config.build_dir;
        build_dir::prepare(build).await?;
        job.log(format!("Prepared {}", build.display()));

        let urls = self.config.listing_urls();
        job.log(format!("Crawling {} listing pages from {}", urls.len(), self.config.start_url));
        let markers = self.crawler.crawl(&urls).await;
        job.markers = markers.len();

        let page = MapPage::new(self.config.center, self.config.zoom, self.config.event_prefix());
        match page.write(&markers, &self.config.output_path()).await? {
            Some(path) => {
                job.log(format!("Map with {} markers saved to {}", markers.len(), path.display()));
                Ok(())
            }
            None => Err(MapError::NoMarkers),
        }
    }

    /// Publish the build directory through the configured connector
    pub async fn publish(&self, job: &mut RunJob) -> MapResult<PublishOutcome> {
        let build = &self.config.build_dir;
        let files = build_dir::publishable_files(build).await?;

        let connector = self
            .registry
            .get_hosting_connector_or_default(Some(self.config.hosting.connector_id()))?;
        job.log(format!(
            "Publishing {} files with {}",
            files.len(),
            connector.display_name()
        ));

        let mut outcome = connector.publish(build, job).await?;
        outcome.url = Some(connector.get_url().await?);
        job.publication = Some(outcome.clone());
        Ok(outcome)
    }
}
