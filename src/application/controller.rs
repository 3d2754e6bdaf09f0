// Dashboard controller - Runs refresh cycles and applies their results
use crate::application::clock::Clock;
use crate::application::dashboard_source::FetchError;
use crate::application::data_fetcher::DataFetcher;
use crate::application::render::{ChartRenderer, UiSurface};
use crate::application::state_store::{StateStore, StatusSnapshot};
use crate::application::view_updater;
use crate::domain::dashboard::UiCommand;
use crate::domain::site::{SiteInfo, TimeRange};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load dashboard data. Please try again.";
pub const CURRENT_TIME: &str = "current-time";
pub const LAST_UPDATE: &str = "lastUpdate";

/// What asked for a refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Initial,
    Timer,
    Manual,
    SiteChanged(String),
    /// Only the historical sub-fetch runs
    RangeChanged(TimeRange),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Main bundle rendered; `history` holds a non-fatal trend chart failure
    Completed { history: Option<FetchError> },
    HistoryOnly { error: Option<FetchError> },
    /// Dropped because a cycle was already in flight or the dashboard is stopped
    Skipped,
    Failed(FetchError),
}

pub struct DashboardController {
    fetcher: DataFetcher,
    ui: Arc<dyn UiSurface>,
    charts: Arc<dyn ChartRenderer>,
    clock: Arc<dyn Clock>,
    state: Mutex<StateStore>,
}

/// Releases the in-flight flag and the busy marker however the cycle ends
struct CycleGuard<'a> {
    controller: &'a DashboardController,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.controller.lock_state().finish_cycle();
        self.controller.ui.apply(&UiCommand::SetBusy { busy: false });
    }
}

impl DashboardController {
    pub fn new(
        fetcher: DataFetcher,
        ui: Arc<dyn UiSurface>,
        charts: Arc<dyn ChartRenderer>,
        clock: Arc<dyn Clock>,
        site: String,
        time_range: TimeRange,
        sites: Vec<SiteInfo>,
    ) -> Self {
        Self {
            fetcher,
            ui,
            charts,
            clock,
            state: Mutex::new(StateStore::new(site, time_range, sites)),
        }
    }

    /// Single entry point for every trigger source
    pub async fn handle(&self, trigger: Trigger) -> CycleOutcome {
        tracing::debug!(?trigger, "refresh triggered");
        if self.is_stopped() {
            tracing::debug!(?trigger, "Dashboard stopped, ignoring trigger");
            return CycleOutcome::Skipped;
        }
        match trigger {
            Trigger::SiteChanged(site) => {
                self.set_site(site);
                self.run_cycle().await
            }
            Trigger::RangeChanged(range) => self.change_range(range).await,
            Trigger::Initial | Trigger::Timer | Trigger::Manual => self.run_cycle().await,
        }
    }

    /// Replace the configured site list with the upstream one when it is reachable
    pub async fn load_sites(&self) {
        match self.fetcher.fetch_sites().await {
            Ok(sites) if !sites.is_empty() => {
                tracing::info!("Loaded {} sites from upstream", sites.len());
                self.lock_state().sites = sites;
            }
            Ok(_) => tracing::warn!("Upstream returned no sites, keeping configured list"),
            Err(e) => tracing::warn!("Could not load site list, keeping configured list: {}", e),
        }
        self.render_site_selector();
    }

    pub fn set_site(&self, site: String) {
        {
            let mut state = self.lock_state();
            if state.refresh.stopped {
                return;
            }
            state.refresh.site = site.clone();
        }
        tracing::info!(%site, "switching site");
        self.render_site_selector();
    }

    pub fn knows_site(&self, id: &str) -> bool {
        self.lock_state().knows_site(id)
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock_state().refresh.in_flight
    }

    fn is_stopped(&self) -> bool {
        self.lock_state().refresh.stopped
    }

    pub fn status(&self) -> StatusSnapshot {
        self.lock_state().snapshot()
    }

    pub fn tick_clock(&self) {
        let now = self.clock.now();
        self.ui
            .apply(&UiCommand::text(CURRENT_TIME, now.format("%H:%M:%S").to_string()));
    }

    /// Terminal: releases every chart handle and ignores later triggers
    pub fn stop(&self) {
        let mut state = self.lock_state();
        state.refresh.stopped = true;
        state.charts.release_all(self.charts.as_ref());
        tracing::info!("Dashboard stopped");
    }

    async fn run_cycle(&self) -> CycleOutcome {
        let Some(_guard) = self.begin_cycle() else {
            tracing::debug!("Refresh already in flight, dropping trigger");
            return CycleOutcome::Skipped;
        };

        let (site, range) = {
            let state = self.lock_state();
            (state.refresh.site.clone(), state.refresh.time_range)
        };

        let bundle = match self.fetcher.fetch_all(&site).await {
            Ok(bundle) => bundle,
            Err(_) if self.is_stopped() => return CycleOutcome::Skipped,
            Err(e) => {
                // Prior rendered state stays as it was
                tracing::error!(%site, "Error loading dashboard data: {}", e);
                self.ui.apply(&UiCommand::ShowError {
                    message: LOAD_ERROR_MESSAGE.to_string(),
                });
                return CycleOutcome::Failed(e);
            }
        };

        self.render(view_updater::apply(&bundle));
        let history = self.refresh_history(&site, range).await.err();
        if !self.record_success() {
            tracing::debug!(%site, "Dashboard stopped mid-cycle, discarding results");
            return CycleOutcome::Skipped;
        }

        tracing::info!(%site, partial_history = history.is_some(), "Dashboard refreshed");
        CycleOutcome::Completed { history }
    }

    async fn change_range(&self, range: TimeRange) -> CycleOutcome {
        let site = {
            let mut state = self.lock_state();
            if state.refresh.stopped {
                return CycleOutcome::Skipped;
            }
            state.refresh.time_range = range;
            state.refresh.site.clone()
        };

        let Some(_guard) = self.begin_cycle() else {
            tracing::debug!(%range, "Refresh in flight, range applies on the next cycle");
            return CycleOutcome::Skipped;
        };

        let error = self.refresh_history(&site, range).await.err();
        CycleOutcome::HistoryOnly { error }
    }

    async fn refresh_history(&self, site: &str, range: TimeRange) -> Result<(), FetchError> {
        match self.fetcher.fetch_historical(site, range).await {
            Ok(history) => {
                self.render(view_updater::apply_historical(&history));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%site, %range, "Error loading historical data: {}", e);
                Err(e)
            }
        }
    }

    fn begin_cycle(&self) -> Option<CycleGuard<'_>> {
        if !self.lock_state().try_begin_cycle() {
            return None;
        }
        self.ui.apply(&UiCommand::SetBusy { busy: true });
        Some(CycleGuard { controller: self })
    }

    /// Apply one cycle's commands; chart commands go through the slot map
    fn render(&self, commands: Vec<UiCommand>) {
        let mut state = self.lock_state();
        if state.refresh.stopped {
            return;
        }
        for command in commands {
            match command {
                UiCommand::RenderChart { slot, spec } => {
                    state.charts.replace(self.charts.as_ref(), slot, &spec)
                }
                other => self.ui.apply(&other),
            }
        }
    }

    /// False once the dashboard is stopped; nothing is recorded then
    fn record_success(&self) -> bool {
        let now = self.clock.now();
        {
            let mut state = self.lock_state();
            if state.refresh.stopped {
                return false;
            }
            state.refresh.last_success_at = Some(now);
        }
        self.ui
            .apply(&UiCommand::text(LAST_UPDATE, now.format("%H:%M").to_string()));
        self.ui.apply(&UiCommand::ClearError);
        true
    }

    fn render_site_selector(&self) {
        let commands = {
            let state = self.lock_state();
            view_updater::site_selector(&state.sites, &state.refresh.site)
        };
        for command in &commands {
            self.ui.apply(command);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StateStore> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
