/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use race_map::config::HostingKind;
use race_map::{Config, TriggerEvent, TriggerKind};

#[derive(Parser, Debug)]
#[command(name = "race-map", version, about = "Race calendar map generator and publisher")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, global = true, help = "Build directory (overrides RACE_MAP_BUILD_DIR)")]
    pub build_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Subcommand to execute; a bare invocation is a full run
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Run {
            trigger: TriggerArgs::default(),
            publish: PublishArgs::default(),
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the map, then publish it
    Run {
        #[command(flatten)]
        trigger: TriggerArgs,
        #[command(flatten)]
        publish: PublishArgs,
    },
    /// Generate the map into the build directory
    Generate {
        #[command(flatten)]
        trigger: TriggerArgs,
    },
    /// Publish an existing build directory
    Publish {
        #[command(flatten)]
        trigger: TriggerArgs,
        #[command(flatten)]
        publish: PublishArgs,
    },
    /// Print the next scheduled run
    Schedule,
    /// Serve the build directory locally
    Serve {
        #[arg(long, env = "RACE_MAP_PORT")]
        port: Option<u16>,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct TriggerArgs {
    /// What started this run (defaults to GITHUB_EVENT_NAME)
    #[arg(long, value_enum)]
    pub trigger: Option<TriggerKind>,
    /// Git ref the trigger fired for (defaults to GITHUB_REF)
    #[arg(long = "ref")]
    pub git_ref: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
pub struct PublishArgs {
    /// Hosting connector: git or fs
    #[arg(long)]
    pub hosting: Option<String>,
    /// Branch to publish to
    #[arg(long)]
    pub branch: Option<String>,
    /// Git remote URL or path
    #[arg(long)]
    pub remote: Option<String>,
    /// Target directory of fs hosting
    #[arg(long)]
    pub hosting_path: Option<PathBuf>,
}

impl TriggerArgs {
    /// Trigger of this run, read from the CI environment
    pub fn event(&self) -> TriggerEvent {
        let event_name = std::env::var("GITHUB_EVENT_NAME").ok();
        let git_ref = std::env::var("GITHUB_REF").ok();
        self.resolve(event_name.as_deref(), git_ref.as_deref())
    }

    /// Trigger of this run given CI values; flags take precedence
    pub fn resolve(&self, event_name: Option<&str>, git_ref: Option<&str>) -> TriggerEvent {
        TriggerEvent::from_ci(self.trigger, event_name, self.git_ref.as_deref().or(git_ref))
    }
}

impl PublishArgs {
    /// Apply command line overrides to the configuration
    pub fn apply(&self, config: &mut Config) -> race_map::MapResult<()> {
        if let Some(hosting) = &self.hosting {
            config.hosting = hosting.parse::<HostingKind>()?;
        }
        if let Some(branch) = &self.branch {
            config.publish_branch = branch.clone();
        }
        if let Some(remote) = &self.remote {
            config.remote = Some(remote.clone());
        }
        if let Some(path) = &self.hosting_path {
            config.hosting_path = path.clone();
        }
        Ok(())
    }
}
