// src/report/mod.rs
mod render;

pub use render::{color_enabled, render_json, render_text};

use crate::check::{CheckState, CheckStatus, Probe};
use crate::poller::{Endpoint, EndpointKind, EndpointStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything the dashboard shows, frozen at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub checks: Vec<CheckReport>,
    pub services: Vec<EndpointReport>,
    pub dependencies: Vec<EndpointReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub name: &'static str,
    pub status: CheckStatus,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport {
    pub name: String,
    pub url: String,
    pub port: Option<u16>,
    pub kind: EndpointKind,
    pub status: EndpointStatus,
}

impl DashboardReport {
    pub fn new(checks: Vec<CheckReport>, endpoints: Vec<EndpointReport>) -> Self {
        let (services, dependencies) = endpoints
            .into_iter()
            .partition(|endpoint| endpoint.kind == EndpointKind::Service);

        Self {
            generated_at: Utc::now(),
            checks,
            services,
            dependencies,
        }
    }

    /// True when every check succeeded and every endpoint is healthy.
    pub fn all_passing(&self) -> bool {
        self.checks
            .iter()
            .all(|check| check.status == CheckStatus::Succeeded)
            && self
                .services
                .iter()
                .chain(&self.dependencies)
                .all(|endpoint| endpoint.status == EndpointStatus::Healthy)
    }
}

impl CheckReport {
    pub fn from_state<P>(probe: &P, state: &CheckState<P::Output>) -> Self
    where
        P: Probe + ?Sized,
    {
        let (summary, error, instructions) = match state {
            CheckState::Pending => ("Checking...".to_string(), None, None),
            CheckState::Succeeded(value) => (probe.success_summary(value), None, None),
            CheckState::Failed(error) => (
                probe.failure_summary(),
                error.user_message().map(str::to_string),
                Some(probe.instructions()),
            ),
        };

        Self {
            name: probe.name(),
            status: state.status(),
            summary,
            error,
            instructions,
        }
    }
}

impl EndpointReport {
    pub fn new(endpoint: &Endpoint, status: EndpointStatus) -> Self {
        Self {
            name: endpoint.name.clone(),
            url: endpoint.url.to_string(),
            port: endpoint.port(),
            kind: endpoint.kind,
            status,
        }
    }
}
