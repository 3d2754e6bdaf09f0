// In-memory UI surface and chart backend, served as JSON by the HTTP layer
use crate::application::render::{ChartHandle, ChartRenderer, UiSurface};
use crate::domain::dashboard::{ChartSlot, ChartSpec, UiCommand, ViewItem};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementState {
    pub text: Option<String>,
    pub class: Option<String>,
    pub items: Vec<ViewItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveChart {
    pub id: u64,
    pub canvas: &'static str,
    pub spec: ChartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub elements: BTreeMap<String, ElementState>,
    pub busy: bool,
    pub error: Option<String>,
    pub charts: BTreeMap<String, LiveChart>,
}

#[derive(Default)]
struct ViewInner {
    elements: BTreeMap<String, ElementState>,
    busy: bool,
    error: Option<String>,
    charts: HashMap<u64, (ChartSlot, ChartSpec)>,
    next_chart_id: u64,
}

#[derive(Default)]
pub struct MemoryView {
    inner: Mutex<ViewInner>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self, id: &str) -> Option<ElementState> {
        self.lock().elements.get(id).cloned()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let inner = self.lock();
        let charts = inner
            .charts
            .iter()
            .map(|(id, (slot, spec))| {
                (
                    slot.as_str().to_string(),
                    LiveChart {
                        id: *id,
                        canvas: slot.canvas(),
                        spec: spec.clone(),
                    },
                )
            })
            .collect();

        ViewSnapshot {
            elements: inner.elements.clone(),
            busy: inner.busy,
            error: inner.error.clone(),
            charts,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UiSurface for MemoryView {
    fn apply(&self, command: &UiCommand) {
        let mut inner = self.lock();
        match command {
            UiCommand::SetText { element, text } => {
                inner.elements.entry(element.clone()).or_default().text = Some(text.clone());
            }
            UiCommand::SetClass { element, class } => {
                inner.elements.entry(element.clone()).or_default().class = Some(class.clone());
            }
            UiCommand::ReplaceChildren { container, items } => {
                inner.elements.entry(container.clone()).or_default().items = items.clone();
            }
            UiCommand::SetBusy { busy } => inner.busy = *busy,
            UiCommand::ShowError { message } => inner.error = Some(message.clone()),
            UiCommand::ClearError => inner.error = None,
            UiCommand::RenderChart { slot, .. } => {
                tracing::warn!(%slot, "chart command reached the UI surface, ignoring");
            }
        }
    }
}

impl ChartRenderer for MemoryView {
    fn create(&self, slot: ChartSlot, spec: &ChartSpec) -> ChartHandle {
        let mut inner = self.lock();
        inner.next_chart_id += 1;
        let id = inner.next_chart_id;
        inner.charts.insert(id, (slot, spec.clone()));
        ChartHandle::new(slot, id)
    }

    fn destroy(&self, handle: ChartHandle) {
        if self.lock().charts.remove(&handle.id()).is_none() {
            tracing::warn!(slot = %handle.slot(), id = handle.id(), "destroying unknown chart");
        }
    }
}
