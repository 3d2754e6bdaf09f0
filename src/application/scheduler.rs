// Scheduler - Periodic refresh timer, clock ticker and external trigger intake
use crate::application::controller::{DashboardController, Trigger};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
const CLOCK_TICK: Duration = Duration::from_secs(1);
const TRIGGER_QUEUE: usize = 16;

pub struct Scheduler {
    controller: Arc<DashboardController>,
    interval: Duration,
}

/// Cloneable sender for manual, site and range triggers
#[derive(Clone)]
pub struct TriggerSender {
    tx: mpsc::Sender<Trigger>,
}

impl TriggerSender {
    /// False when the scheduler is gone or its intake is full
    pub fn send(&self, trigger: Trigger) -> bool {
        self.tx.try_send(trigger).is_ok()
    }
}

pub struct SchedulerHandle {
    triggers: TriggerSender,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
    controller: Arc<DashboardController>,
}

impl Scheduler {
    pub fn new(controller: Arc<DashboardController>, interval: Duration) -> Self {
        Self {
            controller,
            interval,
        }
    }

    /// Fire the initial refresh and start the timers
    pub fn start(self) -> SchedulerHandle {
        let (tx, rx) = mpsc::channel(TRIGGER_QUEUE);
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(self.controller.clone(), self.interval, rx, shutdown_rx));

        SchedulerHandle {
            triggers: TriggerSender { tx },
            shutdown,
            task,
            controller: self.controller,
        }
    }
}

impl SchedulerHandle {
    pub fn triggers(&self) -> TriggerSender {
        self.triggers.clone()
    }

    /// Cancel the timers and release every chart handle
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::warn!("Scheduler task ended abnormally: {}", e);
        }
        self.controller.stop();
    }
}

async fn run(
    controller: Arc<DashboardController>,
    interval: Duration,
    mut triggers: mpsc::Receiver<Trigger>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut refresh = tokio::time::interval_at(Instant::now() + interval, interval);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut clock = tokio::time::interval(CLOCK_TICK);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

    dispatch(&controller, Trigger::Initial);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = refresh.tick() => {
                if controller.is_in_flight() {
                    tracing::debug!("Refresh still in flight, skipping tick");
                } else {
                    dispatch(&controller, Trigger::Timer);
                }
            }
            _ = clock.tick() => controller.tick_clock(),
            Some(trigger) = triggers.recv() => dispatch(&controller, trigger),
        }
    }

    tracing::debug!("Scheduler loop finished");
}

/// Each trigger runs in its own task so the timers keep ticking; the
/// controller's in-flight gate drops overlapping cycles.
fn dispatch(controller: &Arc<DashboardController>, trigger: Trigger) {
    let controller = controller.clone();
    tokio::spawn(async move {
        let outcome = controller.handle(trigger).await;
        tracing::debug!(?outcome, "trigger handled");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::FixedClock;
    use crate::application::controller::CycleOutcome;
    use crate::application::dashboard_source::Endpoint;
    use crate::application::data_fetcher::{DataFetcher, DEFAULT_CYCLE_TIMEOUT};
    use crate::application::test_support::FakeSource;
    use crate::domain::site::{SiteInfo, TimeRange};
    use crate::infrastructure::memory_view::MemoryView;

    fn controller(source: Arc<FakeSource>, view: Arc<MemoryView>) -> Arc<DashboardController> {
        Arc::new(DashboardController::new(
            DataFetcher::new(source, DEFAULT_CYCLE_TIMEOUT),
            view.clone(),
            view,
            Arc::new(FixedClock::at("2024-05-20T08:00:00+00:00")),
            "germany".to_string(),
            TimeRange::LastDay,
            vec![SiteInfo::new("germany".to_string())],
        ))
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_and_periodic_refresh() {
        let source = Arc::new(FakeSource::healthy());
        let view = Arc::new(MemoryView::new());
        let handle = Scheduler::new(controller(source.clone(), view.clone()), DEFAULT_REFRESH_INTERVAL)
            .start();

        settle().await;
        assert_eq!(source.calls_to(Endpoint::SensorData), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        settle().await;
        assert_eq!(source.calls_to(Endpoint::SensorData), 3);
        assert_eq!(view.snapshot().charts.len(), 3);

        handle.stop().await;
        assert_eq!(view.snapshot().charts.len(), 0);

        tokio::time::sleep(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(source.calls_to(Endpoint::SensorData), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_during_slow_cycle_are_dropped() {
        let (source, release) = FakeSource::healthy().held();
        let source = Arc::new(source);
        let view = Arc::new(MemoryView::new());
        let controller = Arc::new(DashboardController::new(
            DataFetcher::new(source.clone(), Duration::from_secs(300)),
            view.clone(),
            view.clone(),
            Arc::new(FixedClock::at("2024-05-20T08:00:00+00:00")),
            "germany".to_string(),
            TimeRange::LastDay,
            Vec::new(),
        ));
        let handle = Scheduler::new(controller.clone(), DEFAULT_REFRESH_INTERVAL).start();

        // Three timer periods pass while the first cycle is still waiting
        tokio::time::sleep(Duration::from_secs(95)).await;
        settle().await;
        assert_eq!(source.calls_to(Endpoint::SensorData), 1);
        assert!(controller.is_in_flight());

        release.send(true).unwrap();
        settle().await;
        assert!(!controller.is_in_flight());
        assert_eq!(controller.handle(Trigger::Manual).await, CycleOutcome::Completed { history: None });

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_triggers_reach_controller() {
        let source = Arc::new(FakeSource::healthy());
        let view = Arc::new(MemoryView::new());
        let handle = Scheduler::new(controller(source.clone(), view.clone()), DEFAULT_REFRESH_INTERVAL)
            .start();
        settle().await;

        assert!(handle.triggers().send(Trigger::RangeChanged(TimeRange::LastWeek)));
        settle().await;

        let history_calls: Vec<_> = source
            .calls()
            .into_iter()
            .filter(|c| c.endpoint == Endpoint::HistoricalData)
            .collect();
        assert_eq!(history_calls.len(), 2);
        assert_eq!(history_calls[1].range, Some(TimeRange::LastWeek));

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_ticker_updates_current_time() {
        let source = Arc::new(FakeSource::healthy());
        let view = Arc::new(MemoryView::new());
        let handle = Scheduler::new(controller(source, view.clone()), DEFAULT_REFRESH_INTERVAL).start();
        settle().await;

        let current = view.element("current-time").and_then(|e| e.text);
        assert_eq!(current.as_deref(), Some("08:00:00"));

        handle.stop().await;
    }
}
