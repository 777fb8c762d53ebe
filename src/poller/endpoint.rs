// src/poller/endpoint.rs
use serde::Serialize;
use std::collections::HashSet;
use url::Url;

const OK: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Service,
    Dependency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
    Pending,
    Healthy,
    Unhealthy,
}

impl EndpointStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EndpointStatus::Pending)
    }
}

/// A named HTTP target polled once per run.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: String,
    pub url: Url,
    pub kind: EndpointKind,
    pub accepted_status_codes: HashSet<u16>,
}

impl Endpoint {
    pub fn new(name: &str, url: &str, kind: EndpointKind) -> Result<Self, url::ParseError> {
        Ok(Self {
            name: name.to_string(),
            url: Url::parse(url)?,
            kind,
            accepted_status_codes: HashSet::new(),
        })
    }

    pub fn service(name: &str, url: &str) -> Result<Self, url::ParseError> {
        Self::new(name, url, EndpointKind::Service)
    }

    pub fn dependency(name: &str, url: &str) -> Result<Self, url::ParseError> {
        Self::new(name, url, EndpointKind::Dependency)
    }

    /// Treat these statuses as healthy in addition to 200.
    pub fn accepting<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.accepted_status_codes.extend(codes);
        self
    }

    pub fn accepts(&self, status: u16) -> bool {
        status == OK || self.accepted_status_codes.contains(&status)
    }

    pub fn port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }
}
