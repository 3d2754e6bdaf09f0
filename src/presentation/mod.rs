// Presentation layer - HTTP access to the rendered dashboard and its controls
pub mod app_state;
pub mod handlers;
