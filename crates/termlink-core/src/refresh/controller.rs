// ── Entry refresh controller ──
//
// Polls a DataSource on a recurring timer and pushes the newest records
// into a Renderer. One load at a time, a watchdog per load, and a slower
// cadence while the source keeps failing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::{Cadence, Cycle, RefreshState, RefreshStatus, Trigger, TriggerOutcome};
use crate::config::RefreshConfig;
use crate::error::CoreError;
use crate::model::{RawRecord, recent_entries};
use crate::render::Renderer;
use crate::source::DataSource;

/// Drives the Last Entries panel.
///
/// Cheaply cloneable; clones share one state machine. Every trigger,
/// whether from the recurring timer or [`refresh_now`](Self::refresh_now),
/// passes the same guards:
///
/// 1. single-flight: nothing starts while a cycle is loading;
/// 2. debounce: nothing starts within `debounce` of the last success.
///
/// A started cycle queries the source, renders the newest
/// `max_entries` records, and is settled exactly once, either by its own
/// completion or by the watchdog. Each cycle carries a generation number;
/// a completion whose generation no longer owns the slot is dropped.
///
/// Errors never leave the controller. They are logged, shown as a
/// placeholder row, and counted; more than `error_threshold` in a row
/// switches the timer to the degraded period until the next success.
///
/// Timer tasks hold clones of the controller, so the host must call
/// [`stop`](Self::stop) or [`shutdown`](Self::shutdown) to release it.
pub struct EntryRefreshController<S, R> {
    inner: Arc<Inner<S, R>>,
}

struct Inner<S, R> {
    config: RefreshConfig,
    source: S,
    renderer: R,
    state: Mutex<RefreshState>,
    status: watch::Sender<RefreshStatus>,
    /// Root token; every timer and watchdog token is a child of it.
    cancel: CancellationToken,
}

impl<S, R> Clone for EntryRefreshController<S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DataSource, R: Renderer> EntryRefreshController<S, R> {
    /// Build a stopped controller. Nothing is scheduled until
    /// [`start`](Self::start) or [`refresh_now`](Self::refresh_now).
    pub fn new(config: RefreshConfig, source: S, renderer: R) -> Result<Self, CoreError> {
        config.validate()?;
        let state = RefreshState::default();
        let (status, _) = watch::channel(state.status(&config));

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                source,
                renderer,
                state: Mutex::new(state),
                status,
                cancel: CancellationToken::new(),
            }),
        })
    }

    /// Latest published status.
    pub fn status(&self) -> RefreshStatus {
        self.inner.status.borrow().clone()
    }

    /// Observe every state transition.
    pub fn subscribe(&self) -> watch::Receiver<RefreshStatus> {
        self.inner.status.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Arm the recurring timer at the normal cadence. No-op while running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        if self.inner.cancel.is_cancelled() {
            debug!("start ignored, controller is shut down");
            return;
        }
        let mut state = self.lock_state();
        if state.running {
            return;
        }
        state.running = true;
        state.cadence = Cadence::Normal;
        self.arm_timer(&mut state);
        info!(period = ?self.inner.config.normal, "entry refresh started");
        self.publish(&state);
    }

    /// Cancel the recurring timer. No-op while stopped.
    ///
    /// A cycle already in flight still completes and renders, but never
    /// re-arms the timer.
    pub fn stop(&self) {
        let mut state = self.lock_state();
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
        if state.running {
            state.running = false;
            info!("entry refresh stopped");
        }
        self.publish(&state);
    }

    /// Tear down for logout: cancel every timer, abandon the in-flight
    /// cycle, and refuse all later triggers.
    pub fn shutdown(&self) {
        let mut state = self.lock_state();
        state.running = false;
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
        if let Some(cycle) = state.in_flight.take() {
            cycle.watchdog.cancel();
            debug!(generation = cycle.generation, "abandoned in-flight cycle");
        }
        state.is_loading = false;
        self.inner.cancel.cancel();
        self.publish(&state);
        info!("entry refresh shut down");
    }

    // ── Triggers ─────────────────────────────────────────────────

    /// Attempt one load right away, outside the timer cadence.
    pub fn refresh_now(&self) -> TriggerOutcome {
        self.trigger(Trigger::Manual)
    }

    /// Refresh only if nothing is on screen. Never clears a populated list.
    pub fn force_display(&self) -> TriggerOutcome {
        let displayed = self.lock_state().displayed;
        if displayed > 0 {
            debug!(displayed, "entries already on screen");
            return TriggerOutcome::AlreadyDisplayed;
        }
        self.refresh_now()
    }

    fn trigger(&self, trigger: Trigger) -> TriggerOutcome {
        if self.inner.cancel.is_cancelled() {
            return TriggerOutcome::ShutDown;
        }
        let now = Instant::now();

        let (generation, watchdog) = {
            let mut state = self.lock_state();
            if state.is_loading {
                debug!(%trigger, "load in flight, skipping");
                return TriggerOutcome::InFlight;
            }
            if let Some(last) = state.last_success_at {
                if now.saturating_duration_since(last) < self.inner.config.debounce {
                    debug!(%trigger, "last success too recent, skipping");
                    return TriggerOutcome::Debounced;
                }
            }

            state.generation += 1;
            let generation = state.generation;
            let watchdog = self.inner.cancel.child_token();
            state.is_loading = true;
            state.in_flight = Some(Cycle {
                generation,
                started_at: now,
                watchdog: watchdog.clone(),
            });
            self.publish(&state);
            (generation, watchdog)
        };

        debug!(generation, %trigger, "load cycle started");
        tokio::spawn(self.clone().watch_cycle(generation, now, watchdog));
        tokio::spawn(self.clone().load(generation));
        TriggerOutcome::Started { generation }
    }

    // ── Cycle tasks ──────────────────────────────────────────────

    async fn load(self, generation: u64) {
        let cancel = self.inner.cancel.clone();
        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            fetched = self.inner.source.list_candidate_records() => fetched,
        };
        self.settle(generation, fetched);
    }

    /// The deadline counts from cycle start, not from when this task is
    /// first polled.
    async fn watch_cycle(
        self,
        generation: u64,
        started_at: Instant,
        watchdog: CancellationToken,
    ) {
        let limit = self.inner.config.watchdog;
        tokio::select! {
            biased;
            () = watchdog.cancelled() => {}
            () = tokio::time::sleep_until(started_at + limit) => {
                warn!(generation, ?limit, "load did not complete, watchdog fired");
                self.settle(generation, Err(CoreError::Timeout { after: limit }));
            }
        }
    }

    async fn run_timer(self, period: Duration, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.trigger(Trigger::Timer);
                }
            }
        }
    }

    // ── Settlement ───────────────────────────────────────────────

    /// Resolve a cycle. Only the first caller for a generation gets
    /// through; the loser (late fetch or stale watchdog) is dropped.
    fn settle(&self, generation: u64, fetched: Result<Vec<RawRecord>, CoreError>) {
        let started_at = {
            let mut state = self.lock_state();
            let Some(cycle) = state.in_flight.take_if(|c| c.generation == generation) else {
                debug!(generation, "completion for abandoned cycle ignored");
                return;
            };
            cycle.watchdog.cancel();
            cycle.started_at
        };

        // Rendering happens outside the lock but inside the
        // single-flight window: is_loading is still set.
        let outcome = fetched.and_then(|records| {
            let entries = recent_entries(records, self.inner.config.max_entries);
            self.inner.renderer.render(&entries)?;
            Ok(entries.len())
        });

        match outcome {
            Ok(displayed) => self.record_success(generation, displayed, started_at.elapsed()),
            Err(err) => self.record_failure(generation, &err),
        }
    }

    fn record_success(&self, generation: u64, displayed: usize, elapsed: Duration) {
        let mut state = self.lock_state();
        state.is_loading = false;
        state.last_success_at = Some(Instant::now());
        state.last_success_wall = Some(Utc::now());
        state.consecutive_errors = 0;
        state.displayed = displayed;
        debug!(generation, displayed, ?elapsed, "load cycle succeeded");

        if state.cadence == Cadence::Degraded {
            state.cadence = Cadence::Normal;
            info!("record store recovered, restoring normal cadence");
            if state.running {
                self.arm_timer(&mut state);
            }
        }
        self.publish(&state);
    }

    fn record_failure(&self, generation: u64, err: &CoreError) {
        warn!(generation, error = %err, "entry refresh failed");
        if let Err(render_err) = self.inner.renderer.render_error(&err.placeholder_text()) {
            warn!(error = %render_err, "could not show error placeholder");
        }

        let mut state = self.lock_state();
        state.is_loading = false;
        state.consecutive_errors = state.consecutive_errors.saturating_add(1);
        state.displayed = 0;

        if state.consecutive_errors > self.inner.config.error_threshold
            && state.cadence == Cadence::Normal
        {
            state.cadence = Cadence::Degraded;
            warn!(
                consecutive_errors = state.consecutive_errors,
                period = ?self.inner.config.degraded,
                "sustained failure, degrading cadence"
            );
            if state.running {
                self.arm_timer(&mut state);
            }
        }
        self.publish(&state);
    }

    // ── Helpers ──────────────────────────────────────────────────

    /// Replace the recurring timer with one at the current cadence.
    fn arm_timer(&self, state: &mut RefreshState) {
        if let Some(previous) = state.timer.take() {
            previous.cancel();
        }
        let token = self.inner.cancel.child_token();
        let period = self.inner.config.period(state.cadence);
        state.timer = Some(token.clone());
        debug!(cadence = %state.cadence, ?period, "recurring timer armed");
        tokio::spawn(self.clone().run_timer(period, token));
    }

    fn publish(&self, state: &RefreshState) {
        self.inner
            .status
            .send_replace(state.status(&self.inner.config));
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
