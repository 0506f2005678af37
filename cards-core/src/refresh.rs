//! The refresh cycle: clear, fetch every city at once, render in configured order, repeat.

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    City, DisplayError,
    display::DisplayArea,
    render::CardRenderer,
    source::WeatherSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    Refreshing,
}

/// Outcome counts for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl CycleReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Drive every operation to completion and return their results in launch order.
///
/// A failure never cancels or short-circuits its siblings.
pub async fn settle_all<I, F, T, E>(ops: I) -> Vec<Result<T, E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    join_all(ops).await
}

/// Owns the cities, the weather source and the display area for the widget.
#[derive(Debug)]
pub struct Refresher<D> {
    cities: Vec<City>,
    source: Arc<dyn WeatherSource>,
    renderer: CardRenderer,
    display: D,
    state: watch::Sender<RefreshState>,
}

impl<D: DisplayArea> Refresher<D> {
    pub fn new(
        cities: Vec<City>,
        source: Arc<dyn WeatherSource>,
        renderer: CardRenderer,
        display: D,
    ) -> Self {
        let (state, _) = watch::channel(RefreshState::Idle);
        Self { cities, source, renderer, display, state }
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }

    /// Watch the Idle/Refreshing state from elsewhere.
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> RefreshState {
        *self.state.borrow()
    }

    /// Run one full cycle.
    ///
    /// City failures become error cards and are counted in the report; only a
    /// failing display area makes this return `Err`.
    pub async fn refresh_once(&mut self) -> Result<CycleReport, DisplayError> {
        self.state.send_replace(RefreshState::Refreshing);
        let outcome = self.run_cycle().await;
        self.state.send_replace(RefreshState::Idle);
        outcome
    }

    async fn run_cycle(&mut self) -> Result<CycleReport, DisplayError> {
        self.display.clear()?;
        info!(cities = self.cities.len(), "refreshing weather");

        let source = &self.source;
        let results = settle_all(self.cities.iter().map(|city| source.fetch(city))).await;

        let mut report = CycleReport::default();
        for (city, result) in self.cities.iter().zip(results) {
            let node = match result {
                Ok(snapshot) => {
                    report.succeeded += 1;
                    self.renderer.render_card(city, &snapshot)
                }
                Err(err) => {
                    warn!(city = %city.name, error = %err, "weather fetch failed");
                    report.failed += 1;
                    self.renderer.render_error(city, &err.to_string())
                }
            };
            self.display.append(node)?;
        }

        info!(succeeded = report.succeeded, failed = report.failed, "refresh finished");
        Ok(report)
    }

    /// Refresh now and then every `period` until `cancel` fires.
    ///
    /// A failed cycle is logged and the schedule carries on. Panics if `period` is zero.
    pub async fn run(&mut self, period: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("refresh schedule stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.refresh_once().await {
                        error!(error = %err, "refresh cycle failed");
                    }
                }
            }
        }
    }
}

impl<D: DisplayArea + 'static> Refresher<D> {
    /// Move the refresher onto its own task and return a handle to stop it.
    pub fn spawn(mut self, period: Duration) -> ScheduleHandle<D> {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            self.run(period, token).await;
            self
        });
        ScheduleHandle { cancel, task }
    }
}

/// A running periodic refresh.
#[derive(Debug)]
pub struct ScheduleHandle<D> {
    cancel: CancellationToken,
    task: JoinHandle<Refresher<D>>,
}

impl<D> ScheduleHandle<D> {
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop scheduling; a cycle already in flight finishes first.
    pub async fn stop(self) -> Result<Refresher<D>, tokio::task::JoinError> {
        self.cancel.cancel();
        self.task.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FetchError, WeatherSnapshot, display::Grid, model::parse_local_time};
    use async_trait::async_trait;
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    /// Answers from a table keyed by city name, after a per-city delay.
    #[derive(Debug, Default)]
    struct ScriptedSource {
        delays_ms: HashMap<String, u64>,
        failures: HashMap<String, FetchError>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn delay(mut self, city: &str, ms: u64) -> Self {
            self.delays_ms.insert(city.to_string(), ms);
            self
        }

        fn fail(mut self, city: &str, status: u16) -> Self {
            self.failures.insert(
                city.to_string(),
                FetchError::Retrieval { status, message: format!("HTTP {status}") },
            );
            self
        }
    }

    #[async_trait]
    impl WeatherSource for ScriptedSource {
        async fn fetch(&self, city: &City) -> Result<WeatherSnapshot, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ms) = self.delays_ms.get(&city.name) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if let Some(err) = self.failures.get(&city.name) {
                return Err(err.clone());
            }
            Ok(WeatherSnapshot {
                temperature_c: 10.0,
                weather_code: 0,
                wind_speed_kmh: 5.0,
                humidity_pct: 50.0,
                sunshine_secs: 0.0,
                local_time: parse_local_time("2025-03-10T12:00").expect("valid time"),
                is_day: Some(true),
                rain_mm: None,
                interval_secs: None,
                units: HashMap::new(),
            })
        }
    }

    /// A grid that refuses the first `failures` appends.
    #[derive(Debug, Default)]
    struct FlakyGrid {
        grid: Grid,
        failures: usize,
    }

    impl DisplayArea for FlakyGrid {
        fn clear(&mut self) -> Result<(), DisplayError> {
            self.grid.clear()
        }

        fn append(&mut self, node: crate::DisplayNode) -> Result<(), DisplayError> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(DisplayError::Write {
                    path: "flaky.html".into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.grid.append(node)
        }

        fn nodes(&self) -> &[crate::DisplayNode] {
            self.grid.nodes()
        }
    }

    fn cities() -> Vec<City> {
        vec![
            City::new("Munich", 48.137, 11.575),
            City::new("Kyiv", 50.450, 30.523),
            City::new("Paris", 48.856, 2.353),
        ]
    }

    fn refresher<D: DisplayArea>(source: ScriptedSource, display: D) -> Refresher<D> {
        Refresher::new(cities(), Arc::new(source), CardRenderer::default(), display)
    }

    fn card_names(nodes: &[crate::DisplayNode]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| {
                let start = n.inner_html.find("<h2>").expect("h2") + 4;
                let end = n.inner_html.find("</h2>").expect("/h2");
                n.inner_html[start..end].to_string()
            })
            .collect()
    }

    #[tokio::test]
    async fn settle_all_keeps_launch_order_and_every_outcome() {
        let results = settle_all((0..4).map(|i| async move {
            tokio::time::sleep(Duration::from_millis(40 - i * 10)).await;
            if i == 1 { Err(format!("op {i}")) } else { Ok(i) }
        }))
        .await;

        assert_eq!(results, vec![Ok(0), Err("op 1".to_string()), Ok(2), Ok(3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn cards_follow_configured_order_not_completion_order() {
        let source = ScriptedSource::default().delay("Munich", 300).delay("Kyiv", 200);
        let mut refresher = refresher(source, Grid::new());

        let report = refresher.refresh_once().await.unwrap();

        assert_eq!(report, CycleReport { succeeded: 3, failed: 0 });
        assert_eq!(card_names(refresher.display().nodes()), ["Munich", "Kyiv", "Paris"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_run_concurrently() {
        let source = ScriptedSource::default()
            .delay("Munich", 1000)
            .delay("Kyiv", 1000)
            .delay("Paris", 1000);
        let mut refresher = refresher(source, Grid::new());

        let started = tokio::time::Instant::now();
        refresher.refresh_once().await.unwrap();

        assert!(started.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn one_failed_city_yields_one_error_card() {
        let source = ScriptedSource::default().fail("Kyiv", 500).delay("Paris", 50);
        let mut refresher = refresher(source, Grid::new());

        let report = refresher.refresh_once().await.unwrap();
        let nodes = refresher.display().nodes();

        assert_eq!(report, CycleReport { succeeded: 2, failed: 1 });
        assert_eq!(nodes.len(), 3);
        assert!(!nodes[0].is_error());
        assert!(nodes[1].is_error());
        assert!(nodes[1].inner_html.contains("HTTP 500"));
        assert!(!nodes[2].is_error());
    }

    #[tokio::test]
    async fn consecutive_cycles_do_not_accumulate_cards() {
        let mut refresher = refresher(ScriptedSource::default(), Grid::new());

        refresher.refresh_once().await.unwrap();
        refresher.refresh_once().await.unwrap();

        assert_eq!(refresher.display().nodes().len(), 3);
        assert_eq!(refresher.state(), RefreshState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn state_is_refreshing_while_fetches_are_pending() {
        let source = ScriptedSource::default().delay("Munich", 100);
        let mut refresher = refresher(source, Grid::new());
        let mut state = refresher.subscribe();

        let observer = async {
            state.changed().await.unwrap();
            *state.borrow_and_update()
        };
        let (seen, report) = tokio::join!(observer, refresher.refresh_once());

        assert_eq!(seen, RefreshState::Refreshing);
        assert!(report.is_ok());
        assert_eq!(refresher.state(), RefreshState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_repeats_until_cancelled() {
        let source = Arc::new(ScriptedSource::default());
        let mut refresher = Refresher::new(
            cities(),
            source.clone(),
            CardRenderer::default(),
            Grid::new(),
        );

        let cancel = CancellationToken::new();
        let stopper = {
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(150)).await;
                cancel.cancel();
            }
        };
        tokio::join!(refresher.run(Duration::from_secs(60), cancel), stopper);

        // cycles at 0s, 60s and 120s
        assert_eq!(source.calls.load(Ordering::SeqCst), 9);
        assert_eq!(refresher.display().nodes().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_cycle_does_not_stop_schedule() {
        let source = Arc::new(ScriptedSource::default());
        let display = FlakyGrid { failures: 1, ..FlakyGrid::default() };
        let refresher = Refresher::new(cities(), source.clone(), CardRenderer::default(), display);

        let handle = refresher.spawn(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(90)).await;
        let refresher = handle.stop().await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 6);
        assert_eq!(refresher.display().nodes().len(), 3);
    }
}
