//! ReflectionEngine — controller surface and the scheduler loop
//!
//! One cooperative background worker per data directory. The loop enforces
//! the daily cap and quiet hours, generates and persists reflections, nudges
//! the engine state and sleeps a randomized interval. Stop requests cancel
//! any in-progress sleep promptly. No error inside a cycle is fatal: the
//! loop logs, cools down and retries.
//!
//! Running two engines against the same directory is not coordinated: log
//! appends interleave harmlessly but the state document can race.

use crate::config::EngineConfig;
use crate::context::is_quiet_hours;
use crate::generator::compose_reflection;
use crate::reflection::{Reflection, ReflectionCategory};
use crate::state::{EngineState, StateStore};
use crate::store::ReflectionStore;
use anyhow::ensure;
use chrono::{Local, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Sleep when the daily cap is reached.
const DAILY_CAP_SLEEP: Duration = Duration::from_secs(3600);
/// Sleep while inside the quiet-hours window.
const QUIET_HOURS_SLEEP: Duration = Duration::from_secs(1800);
/// Cooldown after an unexpected cycle failure.
const ERROR_COOLDOWN: Duration = Duration::from_secs(300);
/// How long `stop()` waits for the loop to exit.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one scheduler iteration.
#[derive(Debug)]
pub enum CycleOutcome {
    DailyCapReached,
    QuietHours,
    Generated {
        reflection: Box<Reflection>,
        sleep: Duration,
    },
}

/// Stats snapshot exposed to the controller surface.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub is_running: bool,
    pub state: EngineState,
    pub config: EngineConfig,
    pub total_reflections: u32,
    pub log_file_exists: bool,
    pub logged_records: usize,
}

pub struct ReflectionEngine {
    data_dir: PathBuf,
    config: EngineConfig,
    state: Arc<Mutex<EngineState>>,
    state_store: Arc<StateStore>,
    store: Arc<ReflectionStore>,
    running: Arc<AtomicBool>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ReflectionEngine {
    /// Create an engine over a data directory, hydrating persisted state and
    /// config when present.
    pub fn new(data_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let state_store = StateStore::new(data_dir);
        let config = state_store.load_config();
        let state = state_store.load_state();

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            config,
            state: Arc::new(Mutex::new(state)),
            state_store: Arc::new(state_store),
            store: Arc::new(ReflectionStore::new(data_dir)),
            running: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            task: None,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Launch the background loop. Idempotent: a second call while running
    /// warns and does nothing.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Engine already running");
            return;
        }

        self.cancel = CancellationToken::new();
        let state = self.state.clone();
        let config = self.config.clone();
        let store = self.store.clone();
        let state_store = self.state_store.clone();
        let running = self.running.clone();
        let cancel = self.cancel.clone();

        self.task = Some(tokio::spawn(async move {
            run_loop(state, config, store, state_store, running, cancel).await;
        }));
        info!("Reflection engine started in background");
    }

    /// Signal the loop to stop and wait briefly for it to exit. Any
    /// in-progress sleep is interrupted.
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if tokio::time::timeout(STOP_TIMEOUT, task).await.is_err() {
                warn!("Reflection loop did not stop within {:?}", STOP_TIMEOUT);
            }
        }
        info!("Reflection engine stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Synchronous single-shot generation, bypassing the schedule, quota and
    /// quiet-hours checks. Persists the record and updates state exactly
    /// like one loop iteration.
    pub async fn create_reflection_now(
        &self,
        forced: Option<ReflectionCategory>,
    ) -> Reflection {
        let mut rng = StdRng::from_entropy();
        let mut state = self.state.lock().await;
        let reflection = compose_reflection(&state, &self.config, forced, &mut rng);
        self.store.append(&reflection);
        state.apply_reflection(&reflection);
        self.state_store.save_state(&state);
        reflection
    }

    /// Read-only snapshot of the engine's current state and counters.
    pub async fn get_stats(&self) -> EngineStats {
        let state = self.state.lock().await.clone();
        EngineStats {
            is_running: self.is_running(),
            total_reflections: state.reflection_count,
            state,
            config: self.config.clone(),
            log_file_exists: self.store.log_file_exists(),
            logged_records: self.store.log_len(),
        }
    }

    /// Zero the daily counter and persist. Meant to be called around
    /// midnight by an external scheduler.
    pub async fn reset_daily_counter(&self) {
        let mut state = self.state.lock().await;
        state.reflection_count = 0;
        self.state_store.save_state(&state);
        info!("Daily reflection counter reset");
    }
}

/// Randomized next-wake interval in [min, max] minutes; deep reflections
/// stretch it by half again.
pub fn next_interval(config: &EngineConfig, depth_level: u8, rng: &mut impl Rng) -> Duration {
    let min_secs = config.reflection_interval_min * 60;
    let max_secs = config.reflection_interval_max * 60;
    let mut secs = rng.gen_range(min_secs..=max_secs.max(min_secs));
    if depth_level >= 8 {
        secs = secs * 3 / 2;
    }
    Duration::from_secs(secs)
}

/// One scheduler iteration. Quota and quiet-hours checks short-circuit with
/// no generation and no state mutation.
pub fn run_cycle(
    state: &mut EngineState,
    config: &EngineConfig,
    store: &ReflectionStore,
    state_store: &StateStore,
    rng: &mut impl Rng,
) -> anyhow::Result<CycleOutcome> {
    if state.reflection_count >= config.max_reflections_per_day {
        return Ok(CycleOutcome::DailyCapReached);
    }

    let hour = Local::now().hour();
    if is_quiet_hours(hour, config.quiet_hours_start, config.quiet_hours_end) {
        return Ok(CycleOutcome::QuietHours);
    }

    let reflection = compose_reflection(state, config, None, rng);
    ensure!(
        !reflection.content.is_empty(),
        "generator produced empty content"
    );

    store.append(&reflection);
    state.apply_reflection(&reflection);
    state_store.save_state(state);

    let sleep = next_interval(config, reflection.depth_level, rng);
    Ok(CycleOutcome::Generated {
        reflection: Box::new(reflection),
        sleep,
    })
}

async fn run_loop(
    state: Arc<Mutex<EngineState>>,
    config: EngineConfig,
    store: Arc<ReflectionStore>,
    state_store: Arc<StateStore>,
    running: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    info!("Reflection loop started");
    let mut rng = StdRng::from_entropy();

    loop {
        if cancel.is_cancelled() || !running.load(Ordering::SeqCst) {
            break;
        }

        let sleep_for = {
            let mut state = state.lock().await;
            match run_cycle(&mut state, &config, &store, &state_store, &mut rng) {
                Ok(CycleOutcome::DailyCapReached) => {
                    info!("Daily reflection cap reached");
                    DAILY_CAP_SLEEP
                }
                Ok(CycleOutcome::QuietHours) => {
                    info!("Quiet hours — generation suppressed");
                    QUIET_HOURS_SLEEP
                }
                Ok(CycleOutcome::Generated { reflection, sleep }) => {
                    info!(
                        "Next reflection in {} minutes (depth {})",
                        sleep.as_secs() / 60,
                        reflection.depth_level
                    );
                    sleep
                }
                Err(e) => {
                    error!("Reflection cycle failed: {e:#}");
                    ERROR_COOLDOWN
                }
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(sleep_for) => {}
        }
    }

    running.store(false, Ordering::SeqCst);
    info!("Reflection loop stopped");
}
