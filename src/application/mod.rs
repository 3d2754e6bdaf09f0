// Application layer - Refresh cycle orchestration and view derivation
pub mod clock;
pub mod controller;
pub mod dashboard_source;
pub mod data_fetcher;
pub mod render;
pub mod scheduler;
pub mod state_store;
pub mod view_updater;

#[cfg(test)]
pub mod test_support;
