// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Protocol Registry
 * Central registry of protocol adapters with metadata and factories
 * © 2026 Bountyy Oy
 */

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RunConfig;
use crate::protocol::Protocol;
use crate::protocols::HttpBasicProtocol;

/// Protocol metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtocolMetadata {
    pub name: String,
    pub description: String,
    pub default_port: u16,
}

/// Builds a fresh protocol instance for one target run
pub type ProtocolFactory = Arc<dyn Fn(&RunConfig) -> Result<Box<dyn Protocol>> + Send + Sync>;

struct Entry {
    metadata: ProtocolMetadata,
    factory: ProtocolFactory,
}

/// Protocol Registry
pub struct ProtocolRegistry {
    protocols: HashMap<String, Entry>,
}

impl ProtocolRegistry {
    /// Create a registry with the built-in protocols
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(
            ProtocolMetadata {
                name: HttpBasicProtocol::NAME.to_string(),
                description: "HTTP Basic authentication".to_string(),
                default_port: 80,
            },
            |config| Ok(Box::new(HttpBasicProtocol::from_config(config)?) as Box<dyn Protocol>),
        );
        registry
    }

    pub fn empty() -> Self {
        Self {
            protocols: HashMap::new(),
        }
    }

    /// Register a protocol
    pub fn register<F>(&mut self, metadata: ProtocolMetadata, factory: F)
    where
        F: Fn(&RunConfig) -> Result<Box<dyn Protocol>> + Send + Sync + 'static,
    {
        self.protocols.insert(
            metadata.name.to_lowercase(),
            Entry {
                metadata,
                factory: Arc::new(factory),
            },
        );
    }

    /// Get protocol metadata
    pub fn get(&self, name: &str) -> Option<&ProtocolMetadata> {
        self.protocols.get(&name.to_lowercase()).map(|e| &e.metadata)
    }

    /// Check if protocol exists
    pub fn exists(&self, name: &str) -> bool {
        self.protocols.contains_key(&name.to_lowercase())
    }

    /// All registered protocols, sorted by name
    pub fn get_all(&self) -> Vec<&ProtocolMetadata> {
        let mut all: Vec<_> = self.protocols.values().map(|e| &e.metadata).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Factory for `name`, cloned so each target task can own one
    pub fn factory(&self, name: &str) -> Result<ProtocolFactory> {
        self.protocols
            .get(&name.to_lowercase())
            .map(|e| Arc::clone(&e.factory))
            .ok_or_else(|| anyhow!("Unknown protocol '{}'", name))
    }

    /// Instantiate a protocol for one run
    pub fn create(&self, name: &str, config: &RunConfig) -> Result<Box<dyn Protocol>> {
        let factory = self.factory(name)?;
        factory(config)
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
