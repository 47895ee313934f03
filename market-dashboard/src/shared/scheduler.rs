//! Refresh orchestration for the dashboard.
//!
//! Three actions drive the views:
//! - manual refresh: jitter + maybe a new transaction, simulated latency, full re-render
//! - slow cycle: full re-render from the current state, no mutation
//! - fast cycle: small price jitter, re-render of the price views only
//!
//! Store mutations go through one lock (single writer). Renders are
//! serialized through a separate render lock so updates never interleave.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant as StdInstant};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::shared::config::DashboardConfig;
use crate::shared::error::DashboardError;
use crate::shared::presenter::{self, ViewUpdate};
use crate::shared::store::{MarketSnapshot, MarketStore};
use crate::shared::surface::{apply_updates, RenderSurface};

/// Result of a manual refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The refresh ran; `new_transaction` tells whether one was synthesized
    Completed { new_transaction: bool },
    /// Another refresh was already in progress
    Ignored,
}

/// Periodic refresh cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cycle {
    /// Full re-render without mutation
    Slow,
    /// Price jitter and price-view re-render
    Fast,
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cycle::Slow => write!(f, "slow"),
            Cycle::Fast => write!(f, "fast"),
        }
    }
}

/// The manual refresh control, disabled while a refresh runs
#[derive(Debug, Clone, Default)]
pub struct RefreshTrigger {
    busy: Arc<AtomicBool>,
}

impl RefreshTrigger {
    pub fn is_enabled(&self) -> bool {
        !self.busy.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<RefreshGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Re-enables the trigger when the refresh ends, on every path
struct RefreshGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Handle to a running periodic cycle; dropping it stops the cycle
pub struct CycleHandle {
    cycle: Cycle,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl CycleHandle {
    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the cycle and wait for its task to exit
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = (&mut self.task).await;
    }
}

impl Drop for CycleHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Both periodic cycles of a started controller
pub struct CycleHandles {
    pub slow: CycleHandle,
    pub fast: CycleHandle,
}

impl CycleHandles {
    pub async fn shutdown(self) {
        self.slow.shutdown().await;
        self.fast.shutdown().await;
        info!("refresh cycles stopped");
    }
}

/// Store plus the random source that drives its mutations
struct SimulatedMarket {
    store: MarketStore,
    rng: StdRng,
}

/// Owns the market, the rendering surface and the refresh schedule
pub struct Controller<S> {
    market: Arc<Mutex<SimulatedMarket>>,
    surface: Arc<Mutex<S>>,
    render_lock: Arc<Mutex<()>>,
    trigger: RefreshTrigger,
    config: Arc<DashboardConfig>,
}

impl<S> Clone for Controller<S> {
    fn clone(&self) -> Self {
        Self {
            market: Arc::clone(&self.market),
            surface: Arc::clone(&self.surface),
            render_lock: Arc::clone(&self.render_lock),
            trigger: self.trigger.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S> Controller<S>
where
    S: RenderSurface + Send + 'static,
{
    /// Create a controller. The random source is seeded from
    /// `config.seed` when set, from the OS otherwise.
    pub fn new(store: MarketStore, surface: S, config: DashboardConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            market: Arc::new(Mutex::new(SimulatedMarket { store, rng })),
            surface: Arc::new(Mutex::new(surface)),
            render_lock: Arc::new(Mutex::new(())),
            trigger: RefreshTrigger::default(),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn trigger(&self) -> &RefreshTrigger {
        &self.trigger
    }

    /// Shared handle to the rendering surface
    pub fn surface(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.surface)
    }

    /// Owned copy of the current market state
    pub async fn snapshot(&self) -> MarketSnapshot {
        self.market.lock().await.store.snapshot(Utc::now())
    }

    /// Run `f` with exclusive access to the store
    pub async fn with_store<T>(&self, f: impl FnOnce(&mut MarketStore) -> T) -> T {
        let mut market = self.market.lock().await;
        f(&mut market.store)
    }

    /// Re-render every data view plus the refresh control. Used at start-up.
    pub async fn render_initial(&self) -> usize {
        let applied = self.render_all().await;
        applied + self.publish(&[presenter::render_refresh_control(false)]).await
    }

    /// Re-render every data view from the current state
    pub async fn render_all(&self) -> usize {
        let _render = self.render_lock.lock().await;
        let snapshot = self.snapshot().await;
        let updates = presenter::render_all(&snapshot, &self.config);
        self.publish(&updates).await
    }

    /// Re-render the price-dependent views (stock table and overview)
    pub async fn render_prices(&self) -> usize {
        let _render = self.render_lock.lock().await;
        let snapshot = self.snapshot().await;
        let updates = presenter::render_prices(&snapshot);
        self.publish(&updates).await
    }

    /// Fast-cycle body: small price jitter, then re-render the price views
    pub async fn tick_prices(&self) -> Result<usize, DashboardError> {
        {
            let mut market = self.market.lock().await;
            let SimulatedMarket { store, rng } = &mut *market;
            store.nudge_prices(self.config.fast_jitter, rng, Utc::now())?;
        }
        Ok(self.render_prices().await)
    }

    /// Manual refresh. Ignored while another refresh is in progress.
    pub async fn refresh(&self) -> Result<RefreshOutcome, DashboardError> {
        let Some(_guard) = self.trigger.try_begin() else {
            debug!("refresh already in progress, ignoring trigger");
            return Ok(RefreshOutcome::Ignored);
        };

        let started = StdInstant::now();
        self.publish(&[presenter::render_refresh_control(true)]).await;

        let result = self.mutate_and_render().await;

        self.publish(&[presenter::render_refresh_control(false)]).await;

        let new_transaction = result?;
        debug!(
            new_transaction,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "manual refresh complete"
        );
        Ok(RefreshOutcome::Completed { new_transaction })
    }

    /// Spawn a manual refresh without waiting for it
    pub fn trigger_refresh(&self) -> JoinHandle<Result<RefreshOutcome, DashboardError>> {
        let controller = self.clone();
        tokio::spawn(async move {
            let outcome = controller.refresh().await;
            if let Err(e) = &outcome {
                error!("manual refresh failed: {}", e);
            }
            outcome
        })
    }

    /// Start the slow and fast cycles
    pub fn start(&self) -> CycleHandles {
        info!(
            slow_secs = self.config.slow_cycle.as_secs(),
            fast_secs = self.config.fast_cycle.as_secs(),
            "starting refresh cycles"
        );
        CycleHandles {
            slow: self.spawn_cycle(Cycle::Slow, self.config.slow_cycle),
            fast: self.spawn_cycle(Cycle::Fast, self.config.fast_cycle),
        }
    }

    async fn publish(&self, updates: &[ViewUpdate]) -> usize {
        let mut surface = self.surface.lock().await;
        apply_updates(&mut *surface, updates)
    }

    /// Mutate the store, wait the simulated latency, then re-render every
    /// view. The store stays locked until the re-render is published, so no
    /// cycle can mutate it in between.
    async fn mutate_and_render(&self) -> Result<bool, DashboardError> {
        let _render = self.render_lock.lock().await;
        let mut market = self.market.lock().await;
        let now = Utc::now();
        let SimulatedMarket { store, rng } = &mut *market;

        store.apply_jitter(self.config.manual_jitter, rng, now)?;
        let transaction =
            store.record_transaction(self.config.transaction_probability, rng, now)?;

        tokio::time::sleep(self.config.refresh_delay).await;

        let snapshot = store.snapshot(Utc::now());
        self.publish(&presenter::render_all(&snapshot, &self.config)).await;
        Ok(transaction.is_some())
    }

    fn spawn_cycle(&self, cycle: Cycle, period: Duration) -> CycleHandle {
        let controller = self.clone();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        controller.run_cycle(cycle).await;
                    }
                    _ = shutdown_rx.recv() => {
                        debug!(%cycle, "refresh cycle shutting down");
                        break;
                    }
                }
            }
        });

        CycleHandle {
            cycle,
            shutdown_tx,
            task,
        }
    }

    async fn run_cycle(&self, cycle: Cycle) {
        match cycle {
            Cycle::Slow => {
                let applied = self.render_all().await;
                debug!(%cycle, applied, "views re-rendered");
            }
            Cycle::Fast => match self.tick_prices().await {
                Ok(applied) => debug!(%cycle, applied, "prices updated"),
                Err(e) => error!(%cycle, "price update failed: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::presenter::ViewTarget;
    use crate::shared::store::sample_instruments;
    use crate::shared::surface::{SlotContent, ViewBoard};

    fn controller(config: DashboardConfig) -> Controller<ViewBoard> {
        let config = config.with_seed(17);
        let store = MarketStore::with_sample_data(&config, Utc::now());
        Controller::new(store, ViewBoard::full(), config)
    }

    async fn board(controller: &Controller<ViewBoard>) -> ViewBoard {
        controller.surface().lock().await.clone()
    }

    /// Board that also keeps every update applied to it, in order
    struct RecordingBoard {
        board: ViewBoard,
        applied: Vec<ViewUpdate>,
    }

    impl RenderSurface for RecordingBoard {
        fn apply(&mut self, update: &ViewUpdate) -> Result<(), DashboardError> {
            self.board.apply(update)?;
            self.applied.push(update.clone());
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_initial_fills_every_slot() {
        let controller = controller(DashboardConfig::default());

        let applied = controller.render_initial().await;

        let board = board(&controller).await;
        assert_eq!(applied, 13);
        assert_eq!(board.text(ViewTarget::RefreshButton), "🔄 Refresh");
        assert_eq!(board.text(ViewTarget::ActiveStocks), "5");
        for target in ViewTarget::ALL {
            assert_ne!(board.slot(target), Some(&SlotContent::Empty), "{}", target);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_mutates_and_rerenders() {
        let controller = controller(DashboardConfig::default().with_transaction_probability(1.0));

        let outcome = controller.refresh().await.unwrap();

        assert_eq!(
            outcome,
            RefreshOutcome::Completed {
                new_transaction: true
            }
        );
        assert!(controller.trigger().is_enabled());

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.transactions.len(), 6);
        assert_ne!(snapshot.instruments, sample_instruments());

        let board = board(&controller).await;
        assert_eq!(board.text(ViewTarget::RefreshButton), "🔄 Refresh");
        assert_eq!(board.children(ViewTarget::TransactionList).len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_ignored_while_in_progress() {
        let controller = controller(DashboardConfig::default());

        let first = controller.trigger_refresh();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!controller.trigger().is_enabled());
        assert_eq!(
            board(&controller).await.text(ViewTarget::RefreshButton),
            "🔄 Refreshing..."
        );
        assert_eq!(controller.refresh().await.unwrap(), RefreshOutcome::Ignored);

        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, RefreshOutcome::Completed { .. }));
        assert!(controller.trigger().is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_waits_for_simulated_delay() {
        let controller = controller(
            DashboardConfig::default().with_refresh_delay(Duration::from_secs(3)),
        );

        let started = Instant::now();
        controller.refresh().await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_locked_through_refresh_delay() {
        let config = DashboardConfig::default()
            .with_cycles(Duration::from_secs(100_000), Duration::from_secs(1))
            .with_refresh_delay(Duration::from_secs(10))
            .with_seed(17);
        let store = MarketStore::with_sample_data(&config, Utc::now());
        let surface = RecordingBoard {
            board: ViewBoard::full(),
            applied: Vec::new(),
        };
        let controller = Controller::new(store, surface, config);

        let refresh = controller.trigger_refresh();
        let cycles = controller.start();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let reader = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.snapshot().await })
        };
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Fast ticks are overdue, yet nothing has read or re-rendered the store
        assert!(!reader.is_finished());
        let applied: Vec<ViewTarget> = controller
            .surface()
            .lock()
            .await
            .applied
            .iter()
            .map(ViewUpdate::target)
            .collect();
        assert_eq!(applied, vec![ViewTarget::RefreshButton]);

        let outcome = refresh.await.unwrap().unwrap();
        assert!(matches!(outcome, RefreshOutcome::Completed { .. }));
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        let refreshed = reader.await.unwrap();
        assert_ne!(refreshed.instruments, sample_instruments());

        let surface = controller.surface();
        let recorded = surface.lock().await;
        let targets: Vec<ViewTarget> = recorded.applied.iter().map(ViewUpdate::target).collect();

        // Label, then the full re-render of the refreshed state, then fast ticks
        assert_eq!(targets[0], ViewTarget::RefreshButton);
        assert_eq!(&targets[1..13], &ViewTarget::ALL[..12]);
        assert_eq!(
            recorded.applied[10],
            presenter::render_stock_table(&refreshed)[0]
        );
        assert!(targets[13..].contains(&ViewTarget::StockTable));
        drop(recorded);

        cycles.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_reenables_trigger() {
        // Invalid on purpose: the controller does not re-validate its config
        let controller = controller(DashboardConfig::default().with_jitter(0.0, 2.0));

        let result = controller.refresh().await;

        assert_eq!(result, Err(DashboardError::InvalidMagnitude(0.0)));
        assert!(controller.trigger().is_enabled());
        assert_eq!(
            board(&controller).await.text(ViewTarget::RefreshButton),
            "🔄 Refresh"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_cycle_renders_without_mutation() {
        let controller = controller(DashboardConfig::default().with_cycles(
            Duration::from_secs(300),
            Duration::from_secs(100_000),
        ));
        let cycles = controller.start();

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(board(&controller).await.text(ViewTarget::TotalMarketCap), "");

        tokio::time::sleep(Duration::from_secs(2)).await;
        let board = board(&controller).await;
        assert_eq!(board.text(ViewTarget::TotalMarketCap), "$10,580,000");
        assert_eq!(board.text(ViewTarget::GdpGrowth), "+1.3%");
        assert_eq!(controller.snapshot().await.instruments, sample_instruments());

        cycles.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_cycle_moves_prices_only() {
        let controller = controller(DashboardConfig::default().with_cycles(
            Duration::from_secs(100_000),
            Duration::from_secs(30),
        ));
        let cycles = controller.start();

        tokio::time::sleep(Duration::from_secs(31)).await;

        let snapshot = controller.snapshot().await;
        let sample = sample_instruments();
        assert_eq!(snapshot.transactions.len(), 5);
        for (now, before) in snapshot.instruments.iter().zip(sample.iter()) {
            assert_eq!(now.change, before.change);
            assert!((now.price - before.price).abs() <= 1.0);
            assert_eq!(now.market_cap, now.implied_market_cap(20_000));
        }

        let board = board(&controller).await;
        assert_eq!(board.children(ViewTarget::StockTable).len(), 5);
        assert_ne!(board.text(ViewTarget::TotalMarketCap), "");
        assert_eq!(board.slot(ViewTarget::GdpGrowth), Some(&SlotContent::Empty));
        assert_eq!(board.slot(ViewTarget::BusinessGrid), Some(&SlotContent::Empty));

        cycles.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_cycles() {
        let controller = controller(DashboardConfig::default().with_cycles(
            Duration::from_secs(60),
            Duration::from_secs(30),
        ));
        let cycles = controller.start();
        assert_eq!(cycles.slow.cycle(), Cycle::Slow);
        assert_eq!(cycles.fast.cycle(), Cycle::Fast);

        cycles.shutdown().await;
        tokio::time::sleep(Duration::from_secs(600)).await;

        assert_eq!(controller.snapshot().await.instruments, sample_instruments());
        assert_eq!(board(&controller).await, ViewBoard::full());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_aborts_cycle() {
        let controller = controller(DashboardConfig::default());
        let CycleHandles { slow, fast } = controller.start();
        drop(slow);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(!fast.is_finished());
        fast.shutdown().await;
    }
}
