#![allow(clippy::unwrap_used)]
// Integration tests for `EntryRefreshController` on a paused tokio clock.
//
// Each test runs on a current-thread runtime with time frozen; sleeping
// in the test auto-advances the clock to the next timer, so timer ticks,
// watchdogs, and delayed fetches fire at exact instants.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::sleep;

use termlink_core::{
    Cadence, CoreError, DataSource, EntryRefreshController, Phase, RawRecord, RecordEntry,
    RefreshConfig, Renderer, TriggerOutcome,
};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Step {
    Records(Vec<RawRecord>),
    Fail,
    Hang,
    Delay(Duration, Vec<RawRecord>),
}

/// Data source that plays back a script, then repeats a fallback step.
#[derive(Clone)]
struct ScriptedSource {
    script: Arc<Mutex<VecDeque<Step>>>,
    fallback: Arc<Mutex<Step>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    fn new(fallback: Step) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(fallback)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn then(&self, step: Step) -> &Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    fn set_fallback(&self, step: Step) {
        *self.fallback.lock().unwrap() = step;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Step {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.lock().unwrap().clone())
    }
}

impl DataSource for ScriptedSource {
    async fn list_candidate_records(&self) -> Result<Vec<RawRecord>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_step() {
            Step::Records(records) => Ok(records),
            Step::Fail => Err(CoreError::data_unavailable("scripted outage")),
            Step::Hang => std::future::pending().await,
            Step::Delay(delay, records) => {
                sleep(delay).await;
                Ok(records)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rendered {
    Entries(Vec<RecordEntry>),
    Error(String),
}

#[derive(Clone, Default)]
struct RecordingRenderer {
    log: Arc<Mutex<Vec<Rendered>>>,
    fail_renders: Arc<AtomicBool>,
}

impl RecordingRenderer {
    fn log(&self) -> Vec<Rendered> {
        self.log.lock().unwrap().clone()
    }

    fn last(&self) -> Option<Rendered> {
        self.log.lock().unwrap().last().cloned()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, entries: &[RecordEntry]) -> Result<(), CoreError> {
        if self.fail_renders.load(Ordering::SeqCst) {
            return Err(CoreError::render_failure("panel detached"));
        }
        self.log
            .lock()
            .unwrap()
            .push(Rendered::Entries(entries.to_vec()));
        Ok(())
    }

    fn render_error(&self, message: &str) -> Result<(), CoreError> {
        self.log
            .lock()
            .unwrap()
            .push(Rendered::Error(message.to_owned()));
        Ok(())
    }
}

type Controller = EntryRefreshController<ScriptedSource, RecordingRenderer>;

fn setup(fallback: Step) -> (Controller, ScriptedSource, RecordingRenderer) {
    let source = ScriptedSource::new(fallback);
    let renderer = RecordingRenderer::default();
    let controller =
        EntryRefreshController::new(RefreshConfig::default(), source.clone(), renderer.clone())
            .unwrap();
    (controller, source, renderer)
}

fn records(ids: &[&str]) -> Vec<RawRecord> {
    ids.iter()
        .map(|id| RawRecord::new(*id, format!("Name {id}")))
        .collect()
}

fn entry_ids(rendered: &Rendered) -> Vec<String> {
    match rendered {
        Rendered::Entries(entries) => entries.iter().map(|e| e.id.to_string()).collect(),
        Rendered::Error(msg) => panic!("expected entries, got error placeholder {msg:?}"),
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ── Load cycle ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_renders_three_most_recent_with_label_fallback() {
    let source_records = vec![
        RawRecord::new("actor-1", "Scavenger"),
        RawRecord::new("actor-2", "Trader"),
        RawRecord::new("actor-3", "Doc").with_reference("MERCER"),
        RawRecord::new("actor-4", "Guard")
            .with_reference("VANCE")
            .with_given_names("LUCY", Some("ANN")),
        RawRecord::new("actor-5", ""),
    ];
    let (ctrl, _source, renderer) = setup(Step::Records(source_records));

    assert_eq!(ctrl.refresh_now(), TriggerOutcome::Started { generation: 1 });
    sleep(ms(1)).await;

    let log = renderer.log();
    assert_eq!(log.len(), 1);
    let Rendered::Entries(entries) = &log[0] else {
        panic!("expected entries, got {:?}", log[0]);
    };
    let labels: Vec<&str> = entries.iter().map(|e| e.display_label.as_str()).collect();
    assert_eq!(labels, vec!["UNNAMED RECORD", "VANCE - LUCY ANN", "MERCER"]);
    assert_eq!(entry_ids(&log[0]), vec!["actor-5", "actor-4", "actor-3"]);

    let status = ctrl.status();
    assert_eq!(status.displayed, 3);
    assert_eq!(status.consecutive_errors, 0);
    assert!(status.last_success.is_some());
    assert_eq!(status.phase, Phase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_orders_by_embedded_number() {
    let (ctrl, _source, renderer) =
        setup(Step::Records(records(&["actor-9", "actor-123", "actor-45"])));

    ctrl.refresh_now();
    sleep(ms(1)).await;

    assert_eq!(
        entry_ids(&renderer.last().unwrap()),
        vec!["actor-123", "actor-45", "actor-9"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_source_renders_empty_entry_set() {
    let (ctrl, _source, renderer) = setup(Step::Records(Vec::new()));

    ctrl.refresh_now();
    sleep(ms(1)).await;

    assert_eq!(renderer.log(), vec![Rendered::Entries(Vec::new())]);
    assert_eq!(ctrl.status().displayed, 0);
    assert_eq!(ctrl.status().consecutive_errors, 0);
}

// ── Guards ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_second_trigger_while_loading_is_noop() {
    let (ctrl, source, renderer) = setup(Step::Delay(ms(100), records(&["actor-1"])));

    assert_eq!(ctrl.refresh_now(), TriggerOutcome::Started { generation: 1 });
    sleep(ms(10)).await;
    assert_eq!(ctrl.status().phase, Phase::Loading);
    assert_eq!(ctrl.refresh_now(), TriggerOutcome::InFlight);
    assert_eq!(ctrl.force_display(), TriggerOutcome::InFlight);

    sleep(ms(200)).await;
    assert_eq!(source.calls(), 1);
    assert_eq!(renderer.log().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_trigger_within_debounce_window_is_noop() {
    let (ctrl, source, _renderer) = setup(Step::Records(records(&["actor-1"])));

    ctrl.refresh_now();
    sleep(ms(1)).await;
    assert_eq!(ctrl.refresh_now(), TriggerOutcome::Debounced);
    assert_eq!(source.calls(), 1);

    sleep(ms(300)).await;
    assert_eq!(ctrl.refresh_now(), TriggerOutcome::Started { generation: 2 });
    sleep(ms(1)).await;
    assert_eq!(source.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failures_do_not_debounce() {
    let (ctrl, source, _renderer) = setup(Step::Fail);

    ctrl.refresh_now();
    sleep(ms(1)).await;
    assert_eq!(ctrl.refresh_now(), TriggerOutcome::Started { generation: 2 });
    sleep(ms(1)).await;
    assert_eq!(source.calls(), 2);
    assert_eq!(ctrl.status().consecutive_errors, 2);
}

// ── Watchdog ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_watchdog_settles_hung_load_exactly_once() {
    let (ctrl, _source, renderer) = setup(Step::Hang);

    ctrl.refresh_now();
    sleep(ms(2999)).await;
    assert_eq!(ctrl.status().phase, Phase::Loading);
    assert_eq!(ctrl.status().consecutive_errors, 0);

    sleep(ms(2)).await;
    let status = ctrl.status();
    assert_eq!(status.phase, Phase::Stopped);
    assert_eq!(status.consecutive_errors, 1);
    assert_eq!(renderer.log(), vec![Rendered::Error("LINK TIMEOUT".into())]);

    sleep(ms(10_000)).await;
    assert_eq!(ctrl.status().consecutive_errors, 1);
    assert_eq!(renderer.log().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_deadline_counts_from_cycle_start() {
    let (ctrl, _source, renderer) = setup(Step::Hang);

    ctrl.refresh_now();
    // The clock moves before the watchdog task gets its first poll.
    tokio::time::advance(ms(1000)).await;
    sleep(ms(2001)).await;

    assert_eq!(ctrl.status().consecutive_errors, 1);
    assert_eq!(renderer.log(), vec![Rendered::Error("LINK TIMEOUT".into())]);
}

#[tokio::test(start_paused = true)]
async fn test_late_completion_after_watchdog_is_ignored() {
    let (ctrl, source, renderer) = setup(Step::Records(records(&["actor-2"])));
    source.then(Step::Delay(ms(5000), records(&["actor-1"])));

    ctrl.refresh_now();
    sleep(ms(3001)).await;
    assert_eq!(ctrl.status().consecutive_errors, 1);

    // The abandoned fetch resolves at t=5000.
    sleep(ms(3000)).await;
    let status = ctrl.status();
    assert_eq!(status.consecutive_errors, 1);
    assert_eq!(status.displayed, 0);
    assert!(status.last_success.is_none());
    assert_eq!(renderer.log(), vec![Rendered::Error("LINK TIMEOUT".into())]);

    // The slot was freed by the watchdog, so a new cycle can run.
    assert_eq!(ctrl.refresh_now(), TriggerOutcome::Started { generation: 2 });
    sleep(ms(1)).await;
    assert_eq!(entry_ids(&renderer.last().unwrap()), vec!["actor-2"]);
    assert_eq!(ctrl.status().consecutive_errors, 0);
}

// ── Failure handling ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_render_failure_counts_as_error() {
    let (ctrl, _source, renderer) = setup(Step::Records(records(&["actor-1"])));
    renderer.fail_renders.store(true, Ordering::SeqCst);

    ctrl.refresh_now();
    sleep(ms(1)).await;

    assert_eq!(renderer.log(), vec![Rendered::Error("DISPLAY FAULT".into())]);
    assert_eq!(ctrl.status().consecutive_errors, 1);
    assert!(ctrl.status().last_success.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_sustained_failure_degrades_then_success_restores_cadence() {
    let (ctrl, source, renderer) = setup(Step::Fail);

    ctrl.start();
    // Ticks at 500, 1000, 1500, 2000; the fourth failure exceeds the threshold.
    sleep(ms(1999)).await;
    assert_eq!(source.calls(), 3);
    assert_eq!(ctrl.status().cadence, Cadence::Normal);

    sleep(ms(2)).await;
    assert_eq!(source.calls(), 4);
    let status = ctrl.status();
    assert_eq!(status.cadence, Cadence::Degraded);
    assert_eq!(status.phase, Phase::Degraded);
    assert_eq!(status.period, ms(2000));
    assert_eq!(renderer.last(), Some(Rendered::Error("RECORDS UNAVAILABLE".into())));

    // Re-armed at t=2000 with a 2000ms period: nothing until t=4000.
    sleep(ms(1500)).await;
    assert_eq!(source.calls(), 4);

    source.set_fallback(Step::Records(records(&["actor-1"])));
    sleep(ms(600)).await;
    assert_eq!(source.calls(), 5);
    let status = ctrl.status();
    assert_eq!(status.cadence, Cadence::Normal);
    assert_eq!(status.period, ms(500));
    assert_eq!(status.consecutive_errors, 0);
    assert_eq!(status.phase, Phase::Idle);

    // Back at the normal cadence: the next tick lands at t=4500.
    sleep(ms(500)).await;
    assert_eq!(source.calls(), 6);

    ctrl.shutdown();
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_start_is_idempotent() {
    let (ctrl, source, _renderer) = setup(Step::Records(records(&["actor-1"])));

    ctrl.start();
    ctrl.start();
    sleep(ms(501)).await;
    assert_eq!(source.calls(), 1);

    ctrl.stop();
    ctrl.stop();
    sleep(ms(5000)).await;
    assert_eq!(source.calls(), 1);
    assert_eq!(ctrl.status().phase, Phase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_completion_after_stop_does_not_rearm_timer() {
    let (ctrl, source, renderer) = setup(Step::Fail);

    ctrl.start();
    sleep(ms(2001)).await;
    assert_eq!(ctrl.status().cadence, Cadence::Degraded);

    // The t=4000 tick starts a slow but successful load.
    source.then(Step::Delay(ms(100), records(&["actor-7"])));
    sleep(ms(2000)).await;
    assert_eq!(ctrl.status().phase, Phase::Loading);

    ctrl.stop();
    sleep(ms(200)).await;

    let status = ctrl.status();
    assert_eq!(status.cadence, Cadence::Normal);
    assert_eq!(status.phase, Phase::Stopped);
    assert_eq!(entry_ids(&renderer.last().unwrap()), vec!["actor-7"]);

    sleep(ms(10_000)).await;
    assert_eq!(source.calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_stop_while_degraded_reports_stopped() {
    let (ctrl, source, _renderer) = setup(Step::Fail);

    ctrl.start();
    sleep(ms(2001)).await;
    assert_eq!(ctrl.status().phase, Phase::Degraded);

    ctrl.stop();
    let status = ctrl.status();
    assert_eq!(status.phase, Phase::Stopped);
    assert_eq!(status.consecutive_errors, 4);

    sleep(ms(10_000)).await;
    assert_eq!(ctrl.status().phase, Phase::Stopped);
    assert_eq!(source.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_uses_normal_cadence() {
    let (ctrl, source, _renderer) = setup(Step::Records(records(&["actor-1"])));

    ctrl.start();
    sleep(ms(501)).await;
    ctrl.stop();
    ctrl.start();
    // New timer armed at t=501; first tick at t=1001.
    sleep(ms(499)).await;
    assert_eq!(source.calls(), 1);
    sleep(ms(2)).await;
    assert_eq!(source.calls(), 2);

    ctrl.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_refuses_triggers_and_abandons_load() {
    let (ctrl, source, renderer) = setup(Step::Delay(ms(100), records(&["actor-1"])));

    ctrl.start();
    ctrl.refresh_now();
    ctrl.shutdown();

    assert_eq!(ctrl.status().phase, Phase::Stopped);
    assert_eq!(ctrl.refresh_now(), TriggerOutcome::ShutDown);
    ctrl.start();

    sleep(ms(5000)).await;
    assert!(source.calls() <= 1);
    assert!(renderer.log().is_empty());
    assert_eq!(ctrl.status().consecutive_errors, 0);
}

#[tokio::test(start_paused = true)]
async fn test_force_display_only_refreshes_empty_display() {
    let (ctrl, source, _renderer) = setup(Step::Records(Vec::new()));
    source.then(Step::Records(records(&["actor-1", "actor-2"])));

    assert_eq!(ctrl.force_display(), TriggerOutcome::Started { generation: 1 });
    sleep(ms(1)).await;
    assert_eq!(ctrl.status().displayed, 2);

    sleep(ms(1000)).await;
    assert_eq!(ctrl.force_display(), TriggerOutcome::AlreadyDisplayed);
    assert_eq!(source.calls(), 1);

    // An explicit refresh brings back an empty set; the display is empty again.
    ctrl.refresh_now();
    sleep(ms(1000)).await;
    assert_eq!(ctrl.status().displayed, 0);
    assert_eq!(ctrl.force_display(), TriggerOutcome::Started { generation: 3 });
}

#[tokio::test(start_paused = true)]
async fn test_status_subscribers_observe_transitions() {
    let (ctrl, _source, _renderer) = setup(Step::Delay(ms(50), records(&["actor-1"])));
    let mut rx = ctrl.subscribe();

    ctrl.refresh_now();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().phase, Phase::Loading);

    rx.changed().await.unwrap();
    let status = rx.borrow_and_update().clone();
    assert_eq!(status.phase, Phase::Stopped);
    assert_eq!(status.displayed, 1);
}

#[test]
fn test_invalid_policy_is_rejected() {
    let cfg = RefreshConfig {
        normal: Duration::ZERO,
        ..RefreshConfig::default()
    };
    let result = EntryRefreshController::new(
        cfg,
        ScriptedSource::new(Step::Fail),
        RecordingRenderer::default(),
    );
    assert!(matches!(result, Err(CoreError::Config { .. })));
}
