// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared configuration type for the integration tests.

#![allow(dead_code)]

use layerbroker::prelude::*;
use serde::Deserialize;
use std::env;

/// Effective application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub name: String,
    pub port: u16,
    pub hosts: Vec<String>,
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfigPartial {
    pub name: Option<String>,
    pub port: Option<u16>,
    pub hosts: Option<Vec<String>>,
    pub database: Option<DatabaseConfigPartial>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfigPartial {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl AppConfig {
    pub fn base() -> Self {
        Self {
            name: "default".to_string(),
            port: 8080,
            hosts: vec!["localhost".to_string()],
            database: None,
        }
    }
}

impl AppConfigPartial {
    pub fn name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn port(port: u16) -> Self {
        Self {
            port: Some(port),
            ..Default::default()
        }
    }

    pub fn db_host(host: &str) -> Self {
        Self {
            database: Some(DatabaseConfigPartial {
                host: Some(host.to_string()),
                port: None,
            }),
            ..Default::default()
        }
    }
}

impl DatabaseConfig {
    fn merge(&self, overlay: &DatabaseConfigPartial) -> Self {
        Self {
            host: overlay.host.clone().unwrap_or_else(|| self.host.clone()),
            port: overlay.port.unwrap_or(self.port),
        }
    }
}

impl Layered for AppConfig {
    type Partial = AppConfigPartial;

    fn merge(&self, overlay: &AppConfigPartial) -> Self {
        let database = match &overlay.database {
            Some(partial) => Some(self.database.clone().unwrap_or_default().merge(partial)),
            None => self.database.clone(),
        };
        Self {
            name: overlay.name.clone().unwrap_or_else(|| self.name.clone()),
            port: overlay.port.unwrap_or(self.port),
            hosts: overlay.hosts.clone().unwrap_or_else(|| self.hosts.clone()),
            database,
        }
    }

    fn deep_copy(&self) -> Self {
        self.clone()
    }

    fn copy_partial(overlay: &AppConfigPartial) -> AppConfigPartial {
        overlay.clone()
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn paths() -> PathSet<Self> {
        PathSet::new()
            .field("Name", |c: &AppConfig| &c.name)
            .field("Port", |c: &AppConfig| &c.port)
            .field("Hosts", |c: &AppConfig| &c.hosts)
            .optional("Database", |c: &AppConfig| c.database.as_ref())
            .optional("Database.Host", |c: &AppConfig| {
                c.database.as_ref().map(|d| &d.host)
            })
            .optional("Database.Port", |c: &AppConfig| {
                c.database.as_ref().map(|d| &d.port)
            })
    }
}

/// Helper to set and clean up environment variables
pub struct EnvGuard {
    keys: Vec<String>,
}

impl EnvGuard {
    pub fn new() -> Self {
        EnvGuard { keys: Vec::new() }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        env::set_var(key, value);
        self.keys.push(key.to_string());
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.keys {
            env::remove_var(key);
        }
    }
}
