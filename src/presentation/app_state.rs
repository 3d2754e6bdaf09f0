// Application state for HTTP handlers
use crate::application::controller::DashboardController;
use crate::application::scheduler::TriggerSender;
use crate::infrastructure::memory_view::MemoryView;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<DashboardController>,
    pub triggers: TriggerSender,
    pub view: Arc<MemoryView>,
}
