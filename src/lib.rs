// src/lib.rs
pub mod check;
pub mod config;
pub mod dashboard;
pub mod poller;
pub mod probes;
pub mod report;
