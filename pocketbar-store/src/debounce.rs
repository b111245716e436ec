//! Per-sensor refresh debouncing.
//!
//! A [`Debouncer`] wraps one refresh action and guarantees:
//!
//! - the action never runs concurrently with itself;
//! - after every execution a cooldown window starts, and requests arriving
//!   during the window (or while the action is running) are collapsed into
//!   a single deferred execution at the end of the window;
//! - with `immediate` set, a request outside any window runs right away;
//! - after [`Debouncer::shutdown`] nothing runs, and a run in progress is
//!   dropped before it can finish.
//!
//! ```text
//!   Idle ──call──▶ Running ──done──▶ Idle (cooling down)
//!    ▲                │                     │
//!    │             call│                 call│
//!    │                ▼                     ▼
//!    └──── window ends, pending ◀──────── Pending
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use pocketbar_fetch::FetchError;
use tokio::runtime::Handle;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Future returned by a refresh action.
pub type RefreshFuture = BoxFuture<'static, Result<(), FetchError>>;

/// A refresh action that can be started any number of times.
pub type RefreshAction = Arc<dyn Fn() -> RefreshFuture + Send + Sync>;

// ============================================================================
// Public Types
// ============================================================================

/// What happened to a call to [`Debouncer::call`].
#[derive(Debug)]
pub enum CallOutcome {
    /// The action ran as part of this call.
    Executed(Result<(), FetchError>),
    /// The request was folded into the deferred execution.
    Coalesced,
    /// The debouncer was shut down; nothing will run.
    ShutDown,
}

impl CallOutcome {
    /// Returns true if the action ran and failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Executed(Err(_)))
    }

    /// Returns true if the action ran as part of the call.
    pub fn was_executed(&self) -> bool {
        matches!(self, Self::Executed(_))
    }
}

/// Coarse debounce phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebouncePhase {
    /// Nothing running, nothing queued.
    Idle,
    /// A deferred execution is queued.
    Pending,
    /// The action is running.
    Running,
}

/// Point-in-time view of a debouncer.
#[derive(Debug, Clone, Copy)]
pub struct DebounceStatus {
    /// Current phase.
    pub phase: DebouncePhase,
    /// When the last execution finished.
    pub last_fire_time: Option<Instant>,
    /// True while the cooldown window is open.
    pub cooling_down: bool,
    /// Number of completed executions.
    pub executions: u64,
}

// ============================================================================
// State
// ============================================================================

#[derive(Default)]
struct DebounceState {
    last_fire_time: Option<Instant>,
    pending: bool,
    in_flight: bool,
    timer: Option<JoinHandle<()>>,
    executions: u64,
    shut_down: bool,
}

struct Inner {
    name: String,
    cooldown: Duration,
    immediate: bool,
    action: RefreshAction,
    state: Mutex<DebounceState>,
    execute_lock: AsyncMutex<()>,
    stop: watch::Sender<bool>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, DebounceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a cooldown window. Its end runs the queued request, if any.
    fn arm_timer(inner: &Arc<Self>, state: &mut DebounceState) {
        if state.shut_down {
            return;
        }
        // Outside a runtime (e.g. while it is being torn down) there is
        // nothing left to schedule on.
        let Ok(handle) = Handle::try_current() else {
            return;
        };
        let task_inner = Arc::clone(inner);
        state.timer = Some(handle.spawn(Self::on_timer(task_inner)));
    }

    /// Resolves once the debouncer has been shut down.
    async fn stopped(&self) {
        let mut rx = self.stop.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Runs the action unless shutdown wins the race. `None` means the run
    /// was abandoned.
    async fn execute(inner: &Arc<Self>) -> Option<Result<(), FetchError>> {
        let mut execution = Execution::start(inner);
        let result = tokio::select! {
            biased;
            () = inner.stopped() => None,
            result = (inner.action)() => Some(result),
        };
        execution.abandoned = result.is_none();
        drop(execution);

        if result.is_none() {
            debug!(name = %inner.name, "Refresh abandoned on shutdown");
        }
        result
    }

    async fn on_timer(inner: Arc<Self>) {
        tokio::time::sleep(inner.cooldown).await;

        {
            let mut state = inner.lock_state();
            if !state.pending {
                trace!(name = %inner.name, "Cooldown ended with nothing queued");
                state.timer = None;
                return;
            }
            // The timer slot stays occupied while the deferred run executes so
            // that new requests keep queueing behind it.
            state.pending = false;
        }

        let _lock = inner.execute_lock.lock().await;
        debug!(name = %inner.name, "Running deferred refresh");
        if let Some(Err(e)) = Self::execute(&inner).await {
            debug!(name = %inner.name, error = %e, "Deferred refresh failed");
        }
    }
}

/// Marks the action as running; on drop, records the finish time and opens
/// the next cooldown window. A caller that drops its call mid-run still
/// counts as an execution; a run abandoned at shutdown does not.
struct Execution {
    inner: Arc<Inner>,
    abandoned: bool,
}

impl Execution {
    fn start(inner: &Arc<Inner>) -> Self {
        inner.lock_state().in_flight = true;
        Self {
            inner: Arc::clone(inner),
            abandoned: false,
        }
    }
}

impl Drop for Execution {
    fn drop(&mut self) {
        let mut state = self.inner.lock_state();
        state.in_flight = false;
        if !self.abandoned {
            state.last_fire_time = Some(Instant::now());
            state.executions += 1;
        }
        Inner::arm_timer(&self.inner, &mut state);
    }
}

// ============================================================================
// Debouncer
// ============================================================================

/// Coalescing single-flight wrapper around a refresh action.
pub struct Debouncer {
    inner: Arc<Inner>,
}

impl Debouncer {
    /// Creates a debouncer.
    ///
    /// `name` only appears in logs. With `immediate` set, a request outside
    /// a cooldown window runs at once; otherwise every request waits for the
    /// end of a window.
    pub fn new<F>(name: impl Into<String>, cooldown: Duration, immediate: bool, action: F) -> Self
    where
        F: Fn() -> RefreshFuture + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                cooldown,
                immediate,
                action: Arc::new(action),
                state: Mutex::new(DebounceState::default()),
                execute_lock: AsyncMutex::new(()),
                stop: watch::channel(false).0,
            }),
        }
    }

    /// Requests a refresh.
    ///
    /// Runs the action now if allowed, otherwise queues it for the end of the
    /// current cooldown window. Any number of queued requests result in one
    /// execution.
    pub async fn call(&self) -> CallOutcome {
        let inner = &self.inner;

        {
            let mut state = inner.lock_state();
            if state.shut_down {
                return CallOutcome::ShutDown;
            }
            if state.timer.is_some() {
                trace!(name = %inner.name, "Within cooldown, queueing refresh");
                state.pending = true;
                return CallOutcome::Coalesced;
            }
            if !inner.immediate {
                state.pending = true;
                Inner::arm_timer(inner, &mut state);
                return CallOutcome::Coalesced;
            }
        }

        let Ok(_lock) = inner.execute_lock.try_lock() else {
            trace!(name = %inner.name, "Refresh in flight, queueing refresh");
            inner.lock_state().pending = true;
            return CallOutcome::Coalesced;
        };

        {
            let mut state = inner.lock_state();
            if state.timer.is_some() {
                state.pending = true;
                return CallOutcome::Coalesced;
            }
        }

        debug!(name = %inner.name, "Running refresh");
        match Inner::execute(inner).await {
            Some(result) => CallOutcome::Executed(result),
            None => CallOutcome::ShutDown,
        }
    }

    /// Returns the current status.
    pub fn status(&self) -> DebounceStatus {
        let state = self.inner.lock_state();
        let phase = if state.in_flight {
            DebouncePhase::Running
        } else if state.pending {
            DebouncePhase::Pending
        } else {
            DebouncePhase::Idle
        };

        DebounceStatus {
            phase,
            last_fire_time: state.last_fire_time,
            cooling_down: state.timer.is_some(),
            executions: state.executions,
        }
    }

    /// Cancels the cooldown timer, drops any queued request and abandons a
    /// run in progress. Later calls return [`CallOutcome::ShutDown`].
    pub fn shutdown(&self) {
        let mut state = self.inner.lock_state();
        state.shut_down = true;
        state.pending = false;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        self.inner.stop.send_replace(true);
        debug!(name = %self.inner.name, "Debouncer shut down");
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("name", &self.inner.name)
            .field("cooldown", &self.inner.cooldown)
            .field("immediate", &self.inner.immediate)
            .field("status", &self.status())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
