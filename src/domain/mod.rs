// Domain layer - Payloads, derived metrics and the dashboard view model
pub mod dashboard;
pub mod metrics;
pub mod site;
pub mod telemetry;
