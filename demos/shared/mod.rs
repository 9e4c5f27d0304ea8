// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration type shared by the demos.

#![allow(dead_code)]

use layerbroker::prelude::*;
use serde::Deserialize;

/// Effective service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub name: String,
    pub port: u16,
    pub debug: bool,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
}

/// Overlay for `ServiceConfig`; unset fields fall through to lower layers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfigPartial {
    pub name: Option<String>,
    pub port: Option<u16>,
    pub debug: Option<bool>,
    pub database: Option<DatabaseConfigPartial>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfigPartial {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "demo".to_string(),
            port: 8080,
            debug: false,
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
            },
        }
    }
}

impl Layered for ServiceConfig {
    type Partial = ServiceConfigPartial;

    fn merge(&self, overlay: &ServiceConfigPartial) -> Self {
        let database = match &overlay.database {
            Some(db) => DatabaseConfig {
                host: db.host.clone().unwrap_or_else(|| self.database.host.clone()),
                port: db.port.unwrap_or(self.database.port),
            },
            None => self.database.clone(),
        };
        Self {
            name: overlay.name.clone().unwrap_or_else(|| self.name.clone()),
            port: overlay.port.unwrap_or(self.port),
            debug: overlay.debug.unwrap_or(self.debug),
            database,
        }
    }

    fn deep_copy(&self) -> Self {
        self.clone()
    }

    fn copy_partial(overlay: &ServiceConfigPartial) -> ServiceConfigPartial {
        overlay.clone()
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn paths() -> PathSet<Self> {
        PathSet::new()
            .field("Name", |c: &ServiceConfig| &c.name)
            .field("Port", |c: &ServiceConfig| &c.port)
            .field("Debug", |c: &ServiceConfig| &c.debug)
            .field("Database", |c: &ServiceConfig| &c.database)
            .field("Database.Host", |c: &ServiceConfig| &c.database.host)
            .field("Database.Port", |c: &ServiceConfig| &c.database.port)
    }
}
