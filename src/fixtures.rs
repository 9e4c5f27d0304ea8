// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration types shared by the unit tests.

use crate::ports::{Layered, PathSet};

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ServerConfig {
    pub name: String,
    pub port: u16,
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct TlsConfig {
    pub cert: String,
    pub verify: bool,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Deserialize)]
#[serde(default)]
pub(crate) struct ServerConfigPartial {
    pub name: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsConfigPartial>,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Deserialize)]
#[serde(default)]
pub(crate) struct TlsConfigPartial {
    pub cert: Option<String>,
    pub verify: Option<bool>,
}

impl ServerConfig {
    pub fn new(name: &str, port: u16) -> Self {
        Self {
            name: name.to_string(),
            port,
            tls: None,
        }
    }
}

impl ServerConfigPartial {
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
}

impl TlsConfig {
    fn merge(&self, overlay: &TlsConfigPartial) -> Self {
        Self {
            cert: overlay.cert.clone().unwrap_or_else(|| self.cert.clone()),
            verify: overlay.verify.unwrap_or(self.verify),
        }
    }
}

impl Layered for ServerConfig {
    type Partial = ServerConfigPartial;

    fn merge(&self, overlay: &ServerConfigPartial) -> Self {
        let tls = match (&self.tls, &overlay.tls) {
            (base, Some(partial)) => Some(base.clone().unwrap_or_default().merge(partial)),
            (base, None) => base.clone(),
        };
        Self {
            name: overlay.name.clone().unwrap_or_else(|| self.name.clone()),
            port: overlay.port.unwrap_or(self.port),
            tls,
        }
    }

    fn deep_copy(&self) -> Self {
        self.clone()
    }

    fn copy_partial(overlay: &ServerConfigPartial) -> ServerConfigPartial {
        overlay.clone()
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn paths() -> PathSet<Self> {
        PathSet::new()
            .field("Name", |s: &ServerConfig| &s.name)
            .field("Port", |s: &ServerConfig| &s.port)
            .optional("Tls", |s: &ServerConfig| s.tls.as_ref())
            .optional("Tls.Cert", |s: &ServerConfig| {
                s.tls.as_ref().map(|t| &t.cert)
            })
            .optional("Tls.Verify", |s: &ServerConfig| {
                s.tls.as_ref().map(|t| &t.verify)
            })
    }
}
