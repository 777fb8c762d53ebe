// src/check/probe.rs
use super::error::CheckError;
use super::runner::Check;
use async_trait::async_trait;
use std::sync::Arc;

/// A precondition of the local environment, tested by one async call.
///
/// Besides the call itself a probe carries the wording the dashboard needs:
/// a summary for each terminal state and the static remediation hint shown
/// when it fails.
#[async_trait]
pub trait Probe: Send + Sync {
    type Output: Send + Sync;

    async fn probe(&self) -> Result<Self::Output, Arc<CheckError>>;

    fn name(&self) -> &'static str;

    fn success_summary(&self, output: &Self::Output) -> String;

    fn failure_summary(&self) -> String;

    fn instructions(&self) -> &'static str;
}

impl<T> Check<T>
where
    T: Send + Sync,
{
    pub async fn run_probe<P>(&self, probe: &P)
    where
        P: Probe<Output = T> + ?Sized,
    {
        self.run(|| probe.probe()).await;
    }
}
