/*
 * race-map, race calendar map generator.
 * Copyright (c) 2024 race-map contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or any later version.
 */

//! Connector registry
//!
//! Holds the available hosting connectors and looks them up by ID.

use std::sync::Arc;

use crate::config::{Config, HostingKind};
use crate::connectors::traits::HostingConnector;
use crate::connectors::{FsHosting, GitPages};
use crate::error::{MapError, MapResult};

/// Registry of available connectors
pub struct ConnectorRegistry {
    /// Hosting connectors (for site publication)
    hosting_connectors: Vec<Arc<dyn HostingConnector>>,
}

impl ConnectorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        ConnectorRegistry {
            hosting_connectors: Vec::new(),
        }
    }

    /// Registry holding the connector selected by `config`
    ///
    /// The git connector pushes to `config.remote`, or to the `origin`
    /// remote of the current directory when none is configured.
    pub async fn from_config(config: &Config) -> MapResult<Self> {
        let mut registry = ConnectorRegistry::new();
        match config.hosting {
            HostingKind::Fs => {
                registry.register_hosting(Arc::new(FsHosting::new(
                    config.hosting_path.clone(),
                    config.output_file.clone(),
                )));
            }
            HostingKind::Git => {
                let connector = match &config.remote {
                    Some(remote) => GitPages::new(remote.clone(), config.publish_branch.clone()),
                    None => {
                        let cwd = std::env::current_dir()?;
                        GitPages::from_origin(&cwd, config.publish_branch.clone()).await?
                    }
                };
                tracing::info!(
                    "Publishing to branch {} of {}",
                    config.publish_branch,
                    connector.display_remote()
                );
                registry.register_hosting(Arc::new(connector));
            }
        }
        Ok(registry)
    }

    /// Register a hosting connector
    pub fn register_hosting(&mut self, connector: Arc<dyn HostingConnector>) {
        self.hosting_connectors.push(connector);
    }

    /// Find a hosting connector by ID
    ///
    /// Returns None if no connector with that ID exists.
    pub fn get_hosting_connector(&self, connector_id: &str) -> Option<Arc<dyn HostingConnector>> {
        self.hosting_connectors
            .iter()
            .find(|c| c.connector_id() == connector_id)
            .cloned()
    }

    /// Get the first hosting connector, or a specific one by ID
    pub fn get_hosting_connector_or_default(
        &self,
        connector_id: Option<&str>,
    ) -> MapResult<Arc<dyn HostingConnector>> {
        let found = match connector_id {
            Some(id) => self.get_hosting_connector(id),
            None => self.hosting_connectors.first().cloned(),
        };
        found.ok_or_else(|| {
            MapError::InvalidInput(format!(
                "no hosting connector {}",
                connector_id.unwrap_or("registered")
            ))
        })
    }
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fs_config_registers_fs_hosting() {
        let config = Config {
            hosting: HostingKind::Fs,
            ..Config::default()
        };
        let registry = ConnectorRegistry::from_config(&config).await.unwrap();

        assert!(registry.get_hosting_connector("fs-hosting").is_some());
        assert!(registry.get_hosting_connector("git-pages").is_none());
    }

    #[tokio::test]
    async fn explicit_remote_registers_git_pages() {
        let config = Config {
            remote: Some("/tmp/remote.git".to_string()),
            ..Config::default()
        };
        let registry = ConnectorRegistry::from_config(&config).await.unwrap();

        let connector = registry.get_hosting_connector_or_default(None).unwrap();
        assert_eq!(connector.connector_id(), "git-pages");
    }

    #[test]
    fn empty_registry_has_no_default() {
        let registry = ConnectorRegistry::default();
        assert!(registry.get_hosting_connector_or_default(None).is_err());
        assert!(registry.get_hosting_connector_or_default(Some("fs-hosting")).is_err());
    }
}
