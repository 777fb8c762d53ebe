// src/dashboard/mod.rs
mod dashboard;

pub use dashboard::Dashboard;
