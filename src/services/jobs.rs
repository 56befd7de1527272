/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Job management service
//!
//! Tracks workflow runs. Jobs can be queried by ID to check their status.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::models::{JobId, RunJob, TriggerKind};

/// Job manager for tracking runs
///
/// The job manager maintains a registry of active and completed jobs.
#[derive(Clone)]
pub struct JobManager {
    /// Map of job ID to job data
    jobs: Arc<RwLock<HashMap<JobId, RunJob>>>,
}

impl JobManager {
    /// Create a new job manager
    pub fn new() -> Self {
        JobManager {
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start a new job
    ///
    /// Creates a new job with a unique ID and IN_PROGRESS status.
    /// Returns the job data with the generated ID.
    pub fn start_job(&self, trigger: TriggerKind, message: String) -> RunJob {
        let job_id = Uuid::new_v4().to_string();
        let job = RunJob::new(job_id.clone(), trigger, message);

        let mut jobs = self.jobs.write().unwrap();
        jobs.insert(job_id, job.clone());

        job
    }

    /// Store the latest state of a job
    pub fn update_job(&self, job: &RunJob) {
        let mut jobs = self.jobs.write().unwrap();
        jobs.insert(job.base.job_id.clone(), job.clone());
    }

    /// Number of tracked jobs
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;

    #[test]
    fn updates_replace_the_tracked_job() {
        let manager = JobManager::new();
        assert!(manager.is_empty());

        let mut job = manager.start_job(TriggerKind::Push, "start".into());
        assert_eq!(job.base.status, JobStatus::InProgress);
        assert_eq!(manager.len(), 1);

        job.success("done".into());
        manager.update_job(&job);
        assert_eq!(manager.len(), 1);

        manager.start_job(TriggerKind::Schedule, "next".into());
        assert_eq!(manager.len(), 2);
    }
}
