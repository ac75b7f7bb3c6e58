pub mod api;
pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod estimator;
pub mod orchestrator;
pub mod picker;
pub mod session;
