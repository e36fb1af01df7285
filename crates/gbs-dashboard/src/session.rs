//! Terminal session and event loop
//!
//! A session runs two threads for its whole life:
//!
//! - the **refresh task**, spawned by [`Session::start`], fires `update`
//!   handlers, then waits for the update interval or an explicit wake-up;
//! - the **foreground loop**, run by the thread that called `start`, polls
//!   the terminal size and keyboard and fires `resize` and `key_press`
//!   handlers.
//!
//! Handlers for one event kind run in registration order. Handler lists are
//! append-only and guarded by a single mutex; each dispatch copies the list
//! and releases the lock before calling anything, so handlers may register
//! further handlers.
//!
//! ```text
//! Uninitialized ──start()──▶ Running ──stop()──▶ Stopped
//! ```

use crate::console::{Console, ConsoleGuard};
use crate::{BranchStatusError, Result};
use crossterm::event::KeyEvent;
use gbs_core::Config;
use ratatui::Frame;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Handler fired on every refresh tick
pub type UpdateHandler = Arc<dyn Fn(&Session) + Send + Sync>;
/// Handler fired when the terminal size changes
pub type ResizeHandler = Arc<dyn Fn(&Session) + Send + Sync>;
/// Handler fired for every key press
pub type KeyHandler = Arc<dyn Fn(&Session, KeyEvent) + Send + Sync>;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Running,
    Stopped,
}

impl SessionPhase {
    fn as_u8(self) -> u8 {
        match self {
            SessionPhase::Uninitialized => 0,
            SessionPhase::Running => 1,
            SessionPhase::Stopped => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionPhase::Uninitialized,
            1 => SessionPhase::Running,
            _ => SessionPhase::Stopped,
        }
    }
}

/// Timing of the two session loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Pause between refresh ticks
    pub update_interval: Duration,
    /// Pause between size/keyboard polls
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            update_interval: config.update_interval(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// Terminal dimensions and capabilities
///
/// Width and height share one atomic word so readers never observe half of
/// a resize.
#[derive(Debug)]
struct TerminalState {
    dimensions: AtomicU32,
    color_capable: bool,
}

impl TerminalState {
    fn new((width, height): (u16, u16), color_capable: bool) -> Self {
        Self {
            dimensions: AtomicU32::new(pack(width, height)),
            color_capable,
        }
    }

    fn dimensions(&self) -> (u16, u16) {
        unpack(self.dimensions.load(Ordering::Acquire))
    }

    fn set_dimensions(&self, (width, height): (u16, u16)) {
        self.dimensions.store(pack(width, height), Ordering::Release);
    }

    fn color_capable(&self) -> bool {
        self.color_capable
    }
}

fn pack(width: u16, height: u16) -> u32 {
    (u32::from(width) << 16) | u32::from(height)
}

fn unpack(value: u32) -> (u16, u16) {
    ((value >> 16) as u16, (value & 0xffff) as u16)
}

#[derive(Default)]
struct EventHandlers {
    on_update: Vec<UpdateHandler>,
    on_resize: Vec<ResizeHandler>,
    on_key_press: Vec<KeyHandler>,
}

struct Shared {
    console: Arc<dyn Console>,
    config: SessionConfig,
    state: TerminalState,
    phase: AtomicU8,
    handlers: Mutex<EventHandlers>,
    wake_tx: Mutex<Sender<()>>,
    wake_rx: Mutex<Option<Receiver<()>>>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to a terminal session; clones share the same session
#[derive(Clone)]
pub struct Session {
    shared: Arc<Shared>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    /// Create a session on `console`, reading its initial size
    pub fn new(console: Arc<dyn Console>, config: SessionConfig) -> Result<Self> {
        let dimensions = console.size().map_err(|e| {
            BranchStatusError::Terminal(format!("Failed to read terminal size: {}", e))
        })?;
        let state = TerminalState::new(dimensions, console.supports_color());
        let (wake_tx, wake_rx) = mpsc::channel();

        Ok(Self {
            shared: Arc::new(Shared {
                console,
                config,
                state,
                phase: AtomicU8::new(SessionPhase::Uninitialized.as_u8()),
                handlers: Mutex::new(EventHandlers::default()),
                wake_tx: Mutex::new(wake_tx),
                wake_rx: Mutex::new(Some(wake_rx)),
                refresh_task: Mutex::new(None),
            }),
        })
    }

    pub fn phase(&self) -> SessionPhase {
        SessionPhase::from_u8(self.shared.phase.load(Ordering::SeqCst))
    }

    pub fn is_running(&self) -> bool {
        self.phase() == SessionPhase::Running
    }

    pub fn width(&self) -> u16 {
        self.shared.state.dimensions().0
    }

    pub fn height(&self) -> u16 {
        self.shared.state.dimensions().1
    }

    pub fn dimensions(&self) -> (u16, u16) {
        self.shared.state.dimensions()
    }

    pub fn supports_colors(&self) -> bool {
        self.shared.state.color_capable()
    }

    /// Register a handler for refresh ticks
    pub fn on_update<F>(&self, handler: F)
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        lock(&self.shared.handlers).on_update.push(Arc::new(handler));
    }

    /// Register a handler for terminal size changes
    pub fn on_resize<F>(&self, handler: F)
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        lock(&self.shared.handlers).on_resize.push(Arc::new(handler));
    }

    /// Register a handler for key presses
    pub fn on_key_press<F>(&self, handler: F)
    where
        F: Fn(&Session, KeyEvent) + Send + Sync + 'static,
    {
        lock(&self.shared.handlers).on_key_press.push(Arc::new(handler));
    }

    /// Paint a full frame on the session's console
    pub fn draw(&self, paint: &mut dyn FnMut(&mut Frame<'_>)) -> Result<()> {
        self.shared.console.draw(paint)
    }

    /// Run the session until [`stop`](Self::stop) is called.
    ///
    /// Takes over the terminal, spawns the refresh task and runs the
    /// foreground loop on the calling thread. The refresh task is not joined.
    pub fn start(&self) -> Result<()> {
        let started = self.shared.phase.compare_exchange(
            SessionPhase::Uninitialized.as_u8(),
            SessionPhase::Running.as_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        if let Err(current) = started {
            return Err(BranchStatusError::Session(match SessionPhase::from_u8(current) {
                SessionPhase::Running => "session is already running".to_string(),
                _ => "a stopped session cannot be restarted".to_string(),
            }));
        }

        if let Err(e) = self.shared.console.enter() {
            self.stop();
            return Err(e);
        }
        let guard = ConsoleGuard::new(self.shared.console.clone());

        if let Err(e) = self.spawn_refresh_task() {
            self.stop();
            guard.release()?;
            return Err(e);
        }

        info!("Session started");
        self.poll_loop();
        info!("Session stopped");

        guard.release()
    }

    /// Ask both loops to finish. Does not wait for the refresh task.
    pub fn stop(&self) {
        let previous = self
            .shared
            .phase
            .swap(SessionPhase::Stopped.as_u8(), Ordering::SeqCst);
        if SessionPhase::from_u8(previous) != SessionPhase::Stopped {
            debug!("Stopping session");
        }
        self.wake();
    }

    /// Run the next refresh tick now instead of after the interval
    pub fn request_update(&self) {
        if self.is_running() {
            self.wake();
        }
    }

    /// Block until the refresh task has exited.
    ///
    /// Only meaningful after [`stop`](Self::stop); an in-flight tick runs to
    /// completion first.
    pub fn wait_for_refresh_task(&self) -> Result<()> {
        let handle = lock(&self.shared.refresh_task).take();
        match handle {
            Some(handle) => handle
                .join()
                .map_err(|_| BranchStatusError::Session("refresh task panicked".to_string())),
            None => Ok(()),
        }
    }

    fn wake(&self) {
        // The receiver is gone once the refresh task has exited
        let _ = lock(&self.shared.wake_tx).send(());
    }

    fn spawn_refresh_task(&self) -> Result<()> {
        let wake_rx = lock(&self.shared.wake_rx)
            .take()
            .ok_or_else(|| BranchStatusError::Session("refresh task already spawned".to_string()))?;

        let session = self.clone();
        let handle = thread::Builder::new()
            .name("gbs-refresh".to_string())
            .spawn(move || session.refresh_loop(wake_rx))?;

        *lock(&self.shared.refresh_task) = Some(handle);
        Ok(())
    }

    fn refresh_loop(&self, wake_rx: Receiver<()>) {
        while self.is_running() {
            let handlers = lock(&self.shared.handlers).on_update.clone();
            for handler in &handlers {
                handler(self);
            }

            match wake_rx.recv_timeout(self.shared.config.update_interval) {
                Ok(()) => while wake_rx.try_recv().is_ok() {},
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        debug!("Refresh task exiting");
    }

    fn poll_loop(&self) {
        let console = &self.shared.console;
        let mut last = self.dimensions();

        while self.is_running() {
            match console.size() {
                Ok(dimensions) if dimensions != last => {
                    debug!(width = dimensions.0, height = dimensions.1, "Terminal resized");
                    self.shared.state.set_dimensions(dimensions);
                    last = dimensions;

                    let handlers = lock(&self.shared.handlers).on_resize.clone();
                    for handler in &handlers {
                        handler(self);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to read terminal size: {}", e),
            }

            match console.poll_key() {
                Ok(Some(key)) => {
                    let handlers = lock(&self.shared.handlers).on_key_press.clone();
                    for handler in &handlers {
                        handler(self, key);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to read keyboard input: {}", e),
            }

            if !self.is_running() {
                break;
            }
            thread::sleep(self.shared.config.poll_interval);
        }
    }
}
