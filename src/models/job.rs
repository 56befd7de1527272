/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Job-related data models for tracking workflow runs

use serde::{Deserialize, Serialize};

use crate::models::TriggerKind;

/// Unique identifier for a job
pub type JobId = String;

/// Status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Job is currently running
    InProgress,

    /// Job completed successfully
    Success,

    /// Job failed with an error
    Error,

    /// Trigger did not call for a run
    Skipped,
}

/// Basic job data for tracking progress
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    /// Unique job identifier
    pub job_id: JobId,

    /// Current status
    pub status: JobStatus,

    /// Human-readable status message
    pub message: String,
}

/// Result of handing a build directory to a hosting connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    /// Connector that published
    pub connector_id: String,

    /// Where the files went (branch or directory)
    pub target: String,

    /// Number of files published
    pub files: usize,

    /// False when the target already held identical content
    pub changed: bool,

    /// Content revision after publishing (git tree hash)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    /// Where the published site can be viewed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One workflow run: generation followed by publication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunJob {
    /// Base job data
    #[serde(flatten)]
    pub base: JobData,

    /// What started the run
    pub trigger: TriggerKind,

    /// Log messages, in order
    pub logs: Vec<String>,

    /// Error messages, in order
    pub errors: Vec<String>,

    /// Number of markers on the generated map
    pub markers: usize,

    /// Set once the publish step has finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<PublishOutcome>,

    /// When the job started (Unix timestamp in milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,

    /// When the job ended (Unix timestamp in milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

impl RunJob {
    /// Create a new run job
    pub fn new(job_id: JobId, trigger: TriggerKind, message: String) -> Self {
        RunJob {
            base: JobData {
                job_id,
                status: JobStatus::InProgress,
                message: message.clone(),
            },
            trigger,
            logs: vec![message],
            errors: Vec::new(),
            markers: 0,
            publication: None,
            start_time: Some(chrono::Utc::now().timestamp_millis()),
            end_time: None,
        }
    }

    /// Add a log message
    pub fn log(&mut self, message: String) {
        tracing::debug!(job = %self.base.job_id, "{}", message);
        self.logs.push(message);
    }

    /// Add an error message
    pub fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    /// Mark the job as successful
    pub fn success(&mut self, message: String) {
        self.finish(JobStatus::Success, message);
    }

    /// Mark the job as failed
    pub fn fail(&mut self, message: String) {
        self.error(message.clone());
        self.finish(JobStatus::Error, message);
    }

    /// Mark the job as not run
    pub fn skip(&mut self, message: String) {
        self.finish(JobStatus::Skipped, message);
    }

    fn finish(&mut self, status: JobStatus, message: String) {
        self.base.status = status;
        self.log(message.clone());
        self.base.message = message;
        self.end_time = Some(chrono::Utc::now().timestamp_millis());
    }
}
