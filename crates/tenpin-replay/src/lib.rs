pub mod analytics;
pub mod config;
pub mod logging;
pub mod runner;
pub mod script;
pub mod simulate;
pub mod store;
pub mod telemetry;
