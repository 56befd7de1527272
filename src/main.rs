/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use race_map::models::{next_scheduled_run, WEEKLY_CRON};
use race_map::scrape::HttpFetcher;
use race_map::services::serve;
use race_map::{
    Config, ConnectorRegistry, JobManager, JobStatus, Pipeline, RunJob, Steps,
};

mod cli;

use cli::{Cli, Commands, TriggerArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "race_map=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env().context("invalid configuration")?;
    if let Some(build_dir) = &cli.build_dir {
        config.build_dir = build_dir.clone();
    }

    let json = cli.json;
    match cli.into_command() {
        Commands::Run { trigger, publish } => {
            publish.apply(&mut config)?;
            run(config, trigger, Steps::GenerateAndPublish, json).await
        }
        Commands::Generate { trigger } => run(config, trigger, Steps::Generate, json).await,
        Commands::Publish { trigger, publish } => {
            publish.apply(&mut config)?;
            run(config, trigger, Steps::Publish, json).await
        }
        Commands::Schedule => {
            let next = next_scheduled_run(chrono::Utc::now());
            if json {
                let report = serde_json::json!({ "cron": WEEKLY_CRON, "nextRun": next.to_rfc3339() });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Next scheduled run: {} ({})", next.to_rfc3339(), WEEKLY_CRON);
            }
            Ok(())
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            serve(config.build_dir.clone(), &config.output_file, port).await?;
            Ok(())
        }
    }
}

/// Execute one workflow run and report it
async fn run(config: Config, trigger: TriggerArgs, steps: Steps, json: bool) -> anyhow::Result<()> {
    let event = trigger.event();

    let registry = match steps {
        Steps::Generate => ConnectorRegistry::new(),
        _ => ConnectorRegistry::from_config(&config)
            .await
            .context("cannot set up hosting")?,
    };
    let fetcher = HttpFetcher::new(Duration::from_secs(config.http_timeout_secs))?;

    let pipeline = Pipeline::new(
        Arc::new(config),
        Arc::new(fetcher),
        Arc::new(registry),
        JobManager::new(),
    )
    .with_progress(!json);

    let job = pipeline.run(&event, steps).await;
    report(&job, json)?;

    if job.base.status == JobStatus::Error {
        bail!("{}", job.base.message);
    }
    Ok(())
}

fn report(job: &RunJob, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(job)?);
    } else {
        println!("[{:?}] {}", job.base.status, job.base.message);
        if let Some(url) = job.publication.as_ref().and_then(|p| p.url.as_deref()) {
            println!("Site: {}", url);
        }
    }
    Ok(())
}
