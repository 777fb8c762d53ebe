// src/dashboard/dashboard.rs
use crate::check::{Check, CheckError, Probe};
use crate::config::AuthConfig;
use crate::poller::{catalog, Endpoint, ServicePoller};
use crate::probes::{CountryConfigProbe, LocationsProbe, LoginProbe, RecordCountProbe, Session, Topology};
use crate::report::{CheckReport, DashboardReport, EndpointReport};
use std::sync::Arc;
use tracing::info;

/// A probe and the check that runs it.
struct Slot<P: Probe> {
    probe: P,
    check: Check<P::Output>,
}

impl<P> Slot<P>
where
    P: Probe,
    P::Output: Clone,
{
    fn new(probe: P) -> Self {
        let check = Check::new(probe.name());
        Self { probe, check }
    }

    async fn run(&self) {
        self.check.run_probe(&self.probe).await;
    }

    async fn report(&self) -> CheckReport {
        CheckReport::from_state(&self.probe, &self.check.snapshot().await)
    }
}

/// One run of the environment checks.
pub struct Dashboard {
    poller: Arc<ServicePoller>,
    login: Slot<LoginProbe>,
    country: Slot<CountryConfigProbe>,
    locations: Slot<LocationsProbe>,
    records: Slot<RecordCountProbe>,
}

impl Dashboard {
    pub fn new(session: Arc<Session>, endpoints: Vec<Endpoint>) -> Self {
        let poller = Arc::new(ServicePoller::new(session.client().clone(), endpoints));

        Self {
            poller,
            login: Slot::new(LoginProbe::new(session.clone())),
            country: Slot::new(CountryConfigProbe::new(session.clone())),
            locations: Slot::new(LocationsProbe::new(session.clone())),
            records: Slot::new(RecordCountProbe::new(session)),
        }
    }

    /// Dashboard for the fixed local deployment.
    pub fn local(credentials: AuthConfig) -> Result<Self, CheckError> {
        let session = Arc::new(Session::new(Topology::local()?, credentials)?);
        Ok(Self::new(session, catalog()?))
    }

    /// Start every probe and every endpoint poll, and wait for all of them.
    pub async fn mount(&self) {
        info!("Mounting dashboard");

        let (summary, ..) = tokio::join!(
            self.poller.clone().poll_all(),
            self.login.run(),
            self.country.run(),
            self.locations.run(),
            self.records.run(),
        );

        info!(
            "Dashboard settled: {} healthy, {} unhealthy endpoints",
            summary.healthy, summary.unhealthy
        );
    }

    pub async fn report(&self) -> DashboardReport {
        let checks = vec![
            self.login.report().await,
            self.country.report().await,
            self.locations.report().await,
            self.records.report().await,
        ];

        let endpoints = self
            .poller
            .entries()
            .iter()
            .map(|(endpoint, status)| EndpointReport::new(endpoint, *status))
            .collect();

        DashboardReport::new(checks, endpoints)
    }

    pub async fn run(&self) -> DashboardReport {
        self.mount().await;
        self.report().await
    }
}
