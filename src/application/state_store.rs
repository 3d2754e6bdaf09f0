// State store - Site selection, in-flight gate and live chart handles
use crate::application::render::{ChartHandle, ChartRenderer};
use crate::domain::dashboard::{ChartSlot, ChartSpec};
use crate::domain::site::{SiteInfo, TimeRange};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshState {
    pub site: String,
    pub time_range: TimeRange,
    pub in_flight: bool,
    pub last_success_at: Option<DateTime<FixedOffset>>,
    pub stopped: bool,
}

/// At most one live chart per slot
#[derive(Debug, Default)]
pub struct ChartSlots {
    handles: HashMap<ChartSlot, ChartHandle>,
}

impl ChartSlots {
    /// Destroy the slot's current chart, then create its replacement
    pub fn replace(&mut self, renderer: &dyn ChartRenderer, slot: ChartSlot, spec: &ChartSpec) {
        if let Some(previous) = self.handles.remove(&slot) {
            tracing::debug!(slot = %previous.slot(), id = previous.id(), "destroying chart");
            renderer.destroy(previous);
        }
        let handle = renderer.create(slot, spec);
        self.handles.insert(slot, handle);
    }

    pub fn release_all(&mut self, renderer: &dyn ChartRenderer) {
        for (_, handle) in self.handles.drain() {
            renderer.destroy(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub site: String,
    pub time_range: TimeRange,
    pub in_flight: bool,
    pub last_success_at: Option<DateTime<FixedOffset>>,
    pub stopped: bool,
    pub live_charts: usize,
}

#[derive(Debug)]
pub struct StateStore {
    pub refresh: RefreshState,
    pub sites: Vec<SiteInfo>,
    pub charts: ChartSlots,
}

impl StateStore {
    pub fn new(site: String, time_range: TimeRange, sites: Vec<SiteInfo>) -> Self {
        Self {
            refresh: RefreshState {
                site,
                time_range,
                in_flight: false,
                last_success_at: None,
                stopped: false,
            },
            sites,
            charts: ChartSlots::default(),
        }
    }

    /// Claim the in-flight flag; false when a cycle is already running or the store is stopped
    pub fn try_begin_cycle(&mut self) -> bool {
        if self.refresh.in_flight || self.refresh.stopped {
            return false;
        }
        self.refresh.in_flight = true;
        true
    }

    pub fn finish_cycle(&mut self) {
        self.refresh.in_flight = false;
    }

    pub fn knows_site(&self, id: &str) -> bool {
        self.sites.iter().any(|site| site.id == id)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            site: self.refresh.site.clone(),
            time_range: self.refresh.time_range,
            in_flight: self.refresh.in_flight,
            last_success_at: self.refresh.last_success_at,
            stopped: self.refresh.stopped,
            live_charts: self.charts.len(),
        }
    }
}
