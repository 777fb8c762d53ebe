// src/poller/poller.rs
use super::endpoint::{Endpoint, EndpointStatus};
use dashmap::DashMap;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct ServicePoller {
    client: Client,
    endpoints: Vec<Endpoint>,
    statuses: DashMap<String, EndpointStatus>,
    started: AtomicBool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub healthy: usize,
    pub unhealthy: usize,
}

impl ServicePoller {
    pub fn new(client: Client, endpoints: Vec<Endpoint>) -> Self {
        let statuses = endpoints
            .iter()
            .map(|endpoint| (endpoint.name.clone(), EndpointStatus::Pending))
            .collect();

        Self {
            client,
            endpoints,
            statuses,
            started: AtomicBool::new(false),
        }
    }

    /// Poll every endpoint once, each in its own task.
    ///
    /// Endpoints are only ever polled by the first call; later calls just
    /// report the current tally.
    pub async fn poll_all(self: Arc<Self>) -> PollSummary {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("Endpoints already polled, skipping");
            return self.summary();
        }

        info!("Polling {} endpoints", self.endpoints.len());

        let (names, tasks): (Vec<_>, Vec<_>) = self
            .endpoints
            .iter()
            .cloned()
            .map(|endpoint| {
                let poller = self.clone();
                let name = endpoint.name.clone();
                let task = tokio::spawn(async move { poller.poll_endpoint(&endpoint).await });
                (name, task)
            })
            .unzip();

        // Wait for all polls to complete
        let results = futures::future::join_all(tasks).await;

        for (name, result) in names.iter().zip(results) {
            if let Err(e) = result {
                error!("Poll task for {} failed: {}", name, e);
                self.settle(name, EndpointStatus::Unhealthy);
            }
        }

        let summary = self.summary();
        info!(
            "Polling complete: {} healthy, {} unhealthy",
            summary.healthy, summary.unhealthy
        );
        summary
    }

    async fn poll_endpoint(&self, endpoint: &Endpoint) -> EndpointStatus {
        debug!("GET {} for {}", endpoint.url, endpoint.name);

        let status = match self.client.get(endpoint.url.clone()).send().await {
            Ok(response) => {
                let code = response.status();
                if endpoint.accepts(code.as_u16()) {
                    debug!("Endpoint {} is healthy ({})", endpoint.name, code);
                    EndpointStatus::Healthy
                } else {
                    warn!("Endpoint {} is unhealthy: HTTP {}", endpoint.name, code);
                    EndpointStatus::Unhealthy
                }
            }
            Err(e) => {
                warn!("Endpoint {} is unreachable: {}", endpoint.name, e);
                EndpointStatus::Unhealthy
            }
        };

        self.settle(&endpoint.name, status);
        status
    }

    /// Move a pending entry to its terminal status. Settled entries never change.
    fn settle(&self, name: &str, status: EndpointStatus) -> bool {
        match self.statuses.get_mut(name) {
            Some(mut entry) if !entry.is_terminal() => {
                *entry = status;
                true
            }
            _ => false,
        }
    }

    pub fn status(&self, name: &str) -> Option<EndpointStatus> {
        self.statuses.get(name).map(|entry| *entry)
    }

    /// Endpoints in table order with their current status.
    pub fn entries(&self) -> Vec<(Endpoint, EndpointStatus)> {
        self.endpoints
            .iter()
            .map(|endpoint| {
                let status = self
                    .status(&endpoint.name)
                    .unwrap_or(EndpointStatus::Pending);
                (endpoint.clone(), status)
            })
            .collect()
    }

    pub fn summary(&self) -> PollSummary {
        self.statuses
            .iter()
            .fold(PollSummary::default(), |mut summary, entry| {
                match *entry.value() {
                    EndpointStatus::Healthy => summary.healthy += 1,
                    EndpointStatus::Unhealthy => summary.unhealthy += 1,
                    EndpointStatus::Pending => {}
                }
                summary
            })
    }
}
