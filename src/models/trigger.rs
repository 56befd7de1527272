/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Workflow triggers and the weekly schedule

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Cron expression of the weekly run: Mondays at 00:00 UTC
pub const WEEKLY_CRON: &str = "0 0 * * 1";

/// What started a workflow run
///
/// Names follow the `GITHUB_EVENT_NAME` values of the hosting CI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Push to a branch
    Push,
    /// Weekly schedule
    Schedule,
    /// Manual dispatch
    #[serde(rename = "workflow_dispatch")]
    #[value(name = "workflow_dispatch", alias = "manual")]
    Manual,
    /// Invoked by hand outside CI
    Local,
}

impl TriggerKind {
    /// Map a `GITHUB_EVENT_NAME` value
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "push" => Some(TriggerKind::Push),
            "schedule" => Some(TriggerKind::Schedule),
            "workflow_dispatch" => Some(TriggerKind::Manual),
            _ => None,
        }
    }
}

/// A trigger together with the ref it fired for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    pub kind: TriggerKind,

    /// Full git ref, e.g. `refs/heads/main`
    pub git_ref: Option<String>,
}

impl TriggerEvent {
    pub fn new(kind: TriggerKind, git_ref: Option<String>) -> Self {
        TriggerEvent { kind, git_ref }
    }

    /// Build the trigger from `GITHUB_EVENT_NAME` and `GITHUB_REF` values
    ///
    /// `kind` overrides the event name. An unknown or missing event name
    /// means `Local`; an empty ref is no ref.
    pub fn from_ci(kind: Option<TriggerKind>, event_name: Option<&str>, git_ref: Option<&str>) -> Self {
        let kind = kind
            .or_else(|| event_name.and_then(TriggerKind::from_event_name))
            .unwrap_or(TriggerKind::Local);
        let git_ref = git_ref.filter(|r| !r.is_empty()).map(str::to_string);
        TriggerEvent { kind, git_ref }
    }

    /// Decide whether this trigger starts a run
    ///
    /// Only pushes are filtered: they must target `main_branch`. A push
    /// without a known ref is accepted.
    pub fn accepts(&self, main_branch: &str) -> Result<(), String> {
        match (self.kind, self.git_ref.as_deref()) {
            (TriggerKind::Push, Some(git_ref)) => {
                let branch = git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref);
                if branch == main_branch {
                    Ok(())
                } else {
                    Err(format!(
                        "push to '{}' ignored, only '{}' triggers a run",
                        branch, main_branch
                    ))
                }
            }
            _ => Ok(()),
        }
    }
}

/// First scheduled run strictly after `after`
pub fn next_scheduled_run(after: DateTime<Utc>) -> DateTime<Utc> {
    let today = after.date_naive();
    let days_to_monday = (7 - today.weekday().num_days_from_monday()) % 7;
    let mut run = (today + Duration::days(days_to_monday as i64))
        .and_time(NaiveTime::MIN)
        .and_utc();
    if run <= after {
        run += Duration::days(7);
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn push_only_runs_for_main() {
        let main = TriggerEvent::new(TriggerKind::Push, Some("refs/heads/main".into()));
        let feature = TriggerEvent::new(TriggerKind::Push, Some("refs/heads/feature".into()));
        assert!(main.accepts("main").is_ok());
        assert!(feature.accepts("main").is_err());
    }

    #[test]
    fn schedule_and_dispatch_ignore_ref() {
        for kind in [TriggerKind::Schedule, TriggerKind::Manual, TriggerKind::Local] {
            let event = TriggerEvent::new(kind, Some("refs/heads/other".into()));
            assert!(event.accepts("main").is_ok());
        }
    }

    #[test]
    fn event_names() {
        assert_eq!(TriggerKind::from_event_name("push"), Some(TriggerKind::Push));
        assert_eq!(
            TriggerKind::from_event_name("workflow_dispatch"),
            Some(TriggerKind::Manual)
        );
        assert_eq!(TriggerKind::from_event_name("pull_request"), None);
    }

    #[test]
    fn ci_values_map_to_trigger() {
        let event = TriggerEvent::from_ci(None, Some("push"), Some("refs/heads/main"));
        assert_eq!(event.kind, TriggerKind::Push);
        assert_eq!(event.git_ref.as_deref(), Some("refs/heads/main"));
        assert!(event.accepts("main").is_ok());

        let event = TriggerEvent::from_ci(None, Some("push"), Some("refs/heads/dev"));
        assert!(event.accepts("main").is_err());

        let event = TriggerEvent::from_ci(None, Some("workflow_dispatch"), Some(""));
        assert_eq!(event.kind, TriggerKind::Manual);
        assert_eq!(event.git_ref, None);
    }

    #[test]
    fn explicit_kind_wins_and_unknown_is_local() {
        let event = TriggerEvent::from_ci(Some(TriggerKind::Schedule), Some("push"), None);
        assert_eq!(event.kind, TriggerKind::Schedule);

        assert_eq!(TriggerEvent::from_ci(None, Some("pull_request"), None).kind, TriggerKind::Local);
        assert_eq!(TriggerEvent::from_ci(None, None, None).kind, TriggerKind::Local);
    }

    #[test]
    fn next_run_is_following_monday_midnight() {
        // Wednesday
        let wed = Utc.with_ymd_and_hms(2025, 1, 15, 13, 30, 0).unwrap();
        assert_eq!(
            next_scheduled_run(wed),
            Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn monday_midnight_rolls_to_next_week() {
        let monday = Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap();
        assert_eq!(
            next_scheduled_run(monday),
            Utc.with_ymd_and_hms(2025, 1, 27, 0, 0, 0).unwrap()
        );

        let monday_morning = Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 1).unwrap();
        assert_eq!(
            next_scheduled_run(monday_morning),
            Utc.with_ymd_and_hms(2025, 1, 27, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn sunday_rolls_to_next_day() {
        let sunday = Utc.with_ymd_and_hms(2025, 1, 19, 23, 59, 59).unwrap();
        assert_eq!(
            next_scheduled_run(sunday),
            Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap()
        );
    }
}
