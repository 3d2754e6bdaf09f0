// Rendering capabilities the controller draws through
use crate::domain::dashboard::{ChartSlot, ChartSpec, UiCommand};

/// Presentation layer: named elements, containers, busy marker and error banner
pub trait UiSurface: Send + Sync {
    fn apply(&self, command: &UiCommand);
}

/// Chart backend. Handles are owned tokens; a destroyed handle is gone for good.
pub trait ChartRenderer: Send + Sync {
    fn create(&self, slot: ChartSlot, spec: &ChartSpec) -> ChartHandle;
    fn destroy(&self, handle: ChartHandle);
}

#[derive(Debug, PartialEq, Eq)]
pub struct ChartHandle {
    slot: ChartSlot,
    id: u64,
}

impl ChartHandle {
    pub fn new(slot: ChartSlot, id: u64) -> Self {
        Self { slot, id }
    }

    pub fn slot(&self) -> ChartSlot {
        self.slot
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}
