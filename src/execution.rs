//! Start/stop of a session's script against the engine.
//!
//! `Idle` <-> `Running(handle)`. Engine calls run on a short-lived worker
//! thread and are abandoned after `engine_call_timeout`, so a hung engine
//! can delay a transition but never wedge it.

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::engine::{ScriptEngine, NO_SCRIPT};
use crate::error::{Result, ResultExt, SessionError};

/// Engine-assigned identifier of a running script (always non-negative)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptHandle(i32);

impl ScriptHandle {
    /// Translate an engine return value; negative means "not running"
    pub fn from_raw(raw: i32) -> Option<ScriptHandle> {
        (raw >= 0).then_some(ScriptHandle(raw))
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ScriptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    Running(ScriptHandle),
}

pub struct ExecutionController {
    engine: Arc<dyn ScriptEngine>,
    call_timeout: Duration,
    running: Option<ScriptHandle>,
}

impl ExecutionController {
    pub fn new(engine: Arc<dyn ScriptEngine>, call_timeout: Duration) -> Self {
        Self {
            engine,
            call_timeout,
            running: None,
        }
    }

    pub fn state(&self) -> ExecutionState {
        match self.running {
            Some(handle) => ExecutionState::Running(handle),
            None => ExecutionState::Idle,
        }
    }

    pub fn running_handle(&self) -> Option<ScriptHandle> {
        self.running
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn set_call_timeout(&mut self, call_timeout: Duration) {
        self.call_timeout = call_timeout;
    }

    /// Hand `code` to the engine and keep whatever handle comes back.
    ///
    /// A negative handle, a timeout or a crashed engine call all leave the
    /// controller `Idle`.
    #[instrument(skip(self, name, code), fields(script = %name, bytes = code.len()))]
    pub fn start(&mut self, name: &str, code: &str) -> ExecutionState {
        let replacing = self.running.map_or(NO_SCRIPT, ScriptHandle::raw);
        let name_owned = name.to_string();
        let code_owned = code.to_string();

        let raw = self
            .call_bounded(
                "start",
                move |engine| engine.start(&name_owned, &code_owned, replacing),
                stop_late_start,
            )
            .warn_on_err()
            .unwrap_or(NO_SCRIPT);

        self.running = ScriptHandle::from_raw(raw);
        match self.running {
            Some(handle) => info!(%handle, "Script running"),
            None => info!(raw, "Engine did not start the script"),
        }
        self.state()
    }

    /// Ask the engine to remove the script, then go `Idle` whatever happens.
    ///
    /// Called while `Idle`, the engine still receives the call with the
    /// "no script" sentinel.
    #[instrument(skip(self))]
    pub fn stop(&mut self) {
        let raw = self.running.map_or(NO_SCRIPT, ScriptHandle::raw);

        let outcome = self
            .call_bounded("stop", move |engine| engine.stop(raw), |_, _| {})
            .and_then(|result| result.map_err(|e| SessionError::Engine(e.to_string())));
        if let Err(e) = outcome {
            warn!(error = %e, handle = raw, "Engine stop failed, treating script as stopped");
        }

        self.running = None;
        debug!("Execution idle");
    }

    /// Run `call` on a worker thread, waiting at most `call_timeout`.
    ///
    /// A result that arrives after the caller gave up is handed to
    /// `abandoned` on the worker thread instead of being lost.
    fn call_bounded<T, F, A>(&self, operation: &'static str, call: F, abandoned: A) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ScriptEngine) -> T + Send + 'static,
        A: FnOnce(&dyn ScriptEngine, T) + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let slot = Arc::new((Mutex::new(CallSlot::Pending), Condvar::new()));
        let worker_slot = Arc::clone(&slot);

        thread::Builder::new()
            .name(format!("engine-{operation}"))
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| call(engine.as_ref())));
                let (lock, ready) = &*worker_slot;
                let mut state = lock.lock();
                if matches!(*state, CallSlot::Abandoned) {
                    drop(state);
                    if let Ok(value) = outcome {
                        abandoned(engine.as_ref(), value);
                    }
                    return;
                }
                *state = match outcome {
                    Ok(value) => CallSlot::Done(value),
                    Err(_) => CallSlot::Panicked,
                };
                ready.notify_one();
            })
            .map_err(|e| SessionError::Engine(format!("could not spawn engine worker: {e}")))?;

        let (lock, ready) = &*slot;
        let deadline = Instant::now() + self.call_timeout;
        let mut state = lock.lock();
        while matches!(*state, CallSlot::Pending) {
            if ready.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }

        match std::mem::replace(&mut *state, CallSlot::Abandoned) {
            CallSlot::Done(value) => Ok(value),
            CallSlot::Panicked => Err(SessionError::Engine(format!(
                "engine {operation} call panicked"
            ))),
            CallSlot::Pending | CallSlot::Abandoned => Err(SessionError::EngineTimeout {
                operation,
                timeout_ms: u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

/// Hand-off between an engine worker and the controller waiting on it
enum CallSlot<T> {
    Pending,
    Done(T),
    Panicked,
    /// The controller stopped waiting; the worker owns any late result
    Abandoned,
}

/// A start that finished after its timeout must not leave an unreachable
/// script running in the engine.
fn stop_late_start(engine: &dyn ScriptEngine, raw: i32) {
    if ScriptHandle::from_raw(raw).is_none() {
        return;
    }
    warn!(handle = raw, "Engine start finished after timeout, stopping orphaned script");
    if let Err(e) = engine.stop(raw) {
        warn!(error = %e, handle = raw, "Could not stop orphaned script");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeEngine {
        next: Mutex<Vec<i32>>,
        starts: Mutex<Vec<(String, String, i32)>>,
        stops: Mutex<Vec<i32>>,
        fail_stop: bool,
        panic_stop: bool,
        stall: Option<Duration>,
    }

    impl ScriptEngine for FakeEngine {
        fn start(&self, name: &str, code: &str, replacing: i32) -> i32 {
            if let Some(stall) = self.stall {
                thread::sleep(stall);
            }
            self.starts
                .lock()
                .push((name.to_string(), code.to_string(), replacing));
            self.next.lock().pop().unwrap_or(0)
        }

        fn stop(&self, handle: i32) -> anyhow::Result<()> {
            if self.panic_stop {
                panic!("engine exploded");
            }
            if let Some(stall) = self.stall {
                thread::sleep(stall);
            }
            self.stops.lock().push(handle);
            if self.fail_stop {
                anyhow::bail!("engine refused");
            }
            Ok(())
        }
    }

    fn controller(engine: FakeEngine) -> (ExecutionController, Arc<FakeEngine>) {
        let engine = Arc::new(engine);
        let controller = ExecutionController::new(engine.clone(), Duration::from_secs(2));
        (controller, engine)
    }

    #[test]
    fn test_handle_from_raw_rejects_negative() {
        assert_eq!(ScriptHandle::from_raw(-1), None);
        assert_eq!(ScriptHandle::from_raw(-42), None);
        assert_eq!(ScriptHandle::from_raw(0).map(ScriptHandle::raw), Some(0));
    }

    #[test]
    fn test_start_with_valid_handle_is_running() {
        let (mut controller, engine) = controller(FakeEngine {
            next: Mutex::new(vec![7]),
            ..FakeEngine::default()
        });

        let state = controller.start("a.lua", "print(1)");

        assert_eq!(state, ExecutionState::Running(ScriptHandle(7)));
        assert_eq!(
            engine.starts.lock().as_slice(),
            &[("a.lua".to_string(), "print(1)".to_string(), NO_SCRIPT)]
        );
    }

    #[test]
    fn test_start_with_negative_handle_stays_idle() {
        let (mut controller, _engine) = controller(FakeEngine {
            next: Mutex::new(vec![-1]),
            ..FakeEngine::default()
        });

        assert_eq!(controller.start("a.lua", "oops("), ExecutionState::Idle);
        assert!(!controller.is_running());
    }

    #[test]
    fn test_restart_passes_previous_handle() {
        let (mut controller, engine) = controller(FakeEngine {
            next: Mutex::new(vec![4, 3]),
            ..FakeEngine::default()
        });

        controller.start("a.lua", "print(1)");
        controller.start("a.lua", "print(2)");

        assert_eq!(engine.starts.lock()[1].2, 3);
        assert_eq!(controller.running_handle(), Some(ScriptHandle(4)));
    }

    #[test]
    fn test_stop_returns_to_idle() {
        let (mut controller, engine) = controller(FakeEngine {
            next: Mutex::new(vec![2]),
            ..FakeEngine::default()
        });
        controller.start("a.lua", "print(1)");

        controller.stop();

        assert_eq!(controller.state(), ExecutionState::Idle);
        assert_eq!(engine.stops.lock().as_slice(), &[2]);
    }

    #[test]
    fn test_stop_failure_still_idles() {
        let (mut controller, _engine) = controller(FakeEngine {
            next: Mutex::new(vec![2]),
            fail_stop: true,
            ..FakeEngine::default()
        });
        controller.start("a.lua", "print(1)");

        controller.stop();

        assert_eq!(controller.state(), ExecutionState::Idle);
    }

    #[test]
    fn test_stop_panic_still_idles() {
        let (mut controller, _engine) = controller(FakeEngine {
            next: Mutex::new(vec![5]),
            panic_stop: true,
            ..FakeEngine::default()
        });
        controller.start("a.lua", "print(1)");

        controller.stop();

        assert_eq!(controller.state(), ExecutionState::Idle);
    }

    #[test]
    fn test_stop_while_idle_sends_sentinel() {
        let (mut controller, engine) = controller(FakeEngine::default());

        controller.stop();

        assert_eq!(engine.stops.lock().as_slice(), &[NO_SCRIPT]);
        assert_eq!(controller.state(), ExecutionState::Idle);
    }

    #[test]
    fn test_hung_engine_is_abandoned_after_timeout() {
        let engine = Arc::new(FakeEngine {
            next: Mutex::new(vec![9]),
            stall: Some(Duration::from_millis(500)),
            ..FakeEngine::default()
        });
        let mut controller = ExecutionController::new(engine, Duration::from_millis(20));

        let started = std::time::Instant::now();
        assert_eq!(controller.start("a.lua", "print(1)"), ExecutionState::Idle);
        controller.stop();

        assert_eq!(controller.state(), ExecutionState::Idle);
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[test]
    fn test_start_finishing_after_timeout_is_stopped() {
        let engine = Arc::new(FakeEngine {
            next: Mutex::new(vec![9]),
            stall: Some(Duration::from_millis(100)),
            ..FakeEngine::default()
        });
        let mut controller = ExecutionController::new(engine.clone(), Duration::from_millis(20));

        assert_eq!(controller.start("a.lua", "print(1)"), ExecutionState::Idle);

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !engine.stops.lock().contains(&9) && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(engine.stops.lock().as_slice(), &[9]);
        assert_eq!(controller.state(), ExecutionState::Idle);
    }

    #[test]
    fn test_negative_late_start_is_not_stopped() {
        let engine = Arc::new(FakeEngine {
            next: Mutex::new(vec![-1]),
            stall: Some(Duration::from_millis(60)),
            ..FakeEngine::default()
        });
        let mut controller = ExecutionController::new(engine.clone(), Duration::from_millis(10));

        controller.start("a.lua", "oops(");
        thread::sleep(Duration::from_millis(300));

        assert_eq!(engine.starts.lock().len(), 1);
        assert!(engine.stops.lock().is_empty());
    }

    #[test]
    fn test_timeout_error_reports_millis() {
        let engine = Arc::new(FakeEngine {
            stall: Some(Duration::from_millis(200)),
            ..FakeEngine::default()
        });
        let controller = ExecutionController::new(engine, Duration::from_millis(15));

        let err = controller
            .call_bounded("stop", |engine| engine.stop(1), |_, _| {})
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::EngineTimeout {
                operation: "stop",
                timeout_ms: 15
            }
        ));
    }
}
