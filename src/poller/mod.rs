// src/poller/mod.rs
mod catalog;
mod endpoint;
mod poller;

pub use catalog::catalog;
pub use endpoint::{Endpoint, EndpointKind, EndpointStatus};
pub use poller::{PollSummary, ServicePoller};
