//! Terminal setup, teardown and I/O
//!
//! The session talks to the terminal only through [`Console`]. The real
//! implementation drives crossterm and a ratatui `Terminal`; the scripted one
//! replays sizes and keys and draws into a `TestBackend`.

use crate::{BranchStatusError, Result};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{CrosstermBackend, TestBackend},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Terminal type for the dashboard
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Everything the session needs from a terminal
pub trait Console: Send + Sync {
    /// Enter raw mode and take over the screen
    fn enter(&self) -> Result<()>;

    /// Give the screen back
    fn leave(&self) -> Result<()>;

    /// Current `(width, height)` in columns and rows
    fn size(&self) -> Result<(u16, u16)>;

    /// Whether colors should be used
    fn supports_color(&self) -> bool;

    /// Next pending key press, without blocking
    fn poll_key(&self) -> Result<Option<KeyEvent>>;

    /// Paint one full frame
    fn draw(&self, paint: &mut dyn FnMut(&mut Frame<'_>)) -> Result<()>;
}

/// Console backed by the process's real terminal
pub struct CrosstermConsole {
    terminal: Mutex<Option<Tui>>,
    color: bool,
}

impl CrosstermConsole {
    pub fn new() -> Self {
        Self {
            terminal: Mutex::new(None),
            color: detect_color_support(),
        }
    }
}

impl Default for CrosstermConsole {
    fn default() -> Self {
        Self::new()
    }
}

/// Colors are used on terminals with at least 8 colors unless `NO_COLOR` is set
fn detect_color_support() -> bool {
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    crossterm::style::available_color_count() >= 8
}

impl Console for CrosstermConsole {
    fn enter(&self) -> Result<()> {
        // Enter raw mode to capture key events
        enable_raw_mode().map_err(|e| {
            BranchStatusError::Terminal(format!("Failed to enable raw mode: {}", e))
        })?;

        // Enter alternate screen to preserve terminal content
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide).map_err(|e| {
            BranchStatusError::Terminal(format!("Failed to enter alternate screen: {}", e))
        })?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(|e| {
            BranchStatusError::Terminal(format!("Failed to create terminal: {}", e))
        })?;

        *self.terminal.lock().unwrap_or_else(PoisonError::into_inner) = Some(terminal);
        Ok(())
    }

    fn leave(&self) -> Result<()> {
        self.terminal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        execute!(io::stdout(), Show, LeaveAlternateScreen).map_err(|e| {
            BranchStatusError::Terminal(format!("Failed to leave alternate screen: {}", e))
        })?;

        disable_raw_mode().map_err(|e| {
            BranchStatusError::Terminal(format!("Failed to disable raw mode: {}", e))
        })?;

        Ok(())
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok(crossterm::terminal::size()?)
    }

    fn supports_color(&self) -> bool {
        self.color
    }

    fn poll_key(&self) -> Result<Option<KeyEvent>> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(Some(key)),
                // Resizes are picked up by re-reading the size
                _ => continue,
            }
        }
        Ok(None)
    }

    fn draw(&self, paint: &mut dyn FnMut(&mut Frame<'_>)) -> Result<()> {
        let mut guard = self.terminal.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(terminal) = guard.as_mut() {
            terminal.draw(|frame| paint(frame))?;
        }
        Ok(())
    }
}

/// RAII guard for terminal state
///
/// Restores the console on drop unless disarmed, so a panic in the
/// foreground loop still leaves a usable terminal.
pub struct ConsoleGuard {
    console: Arc<dyn Console>,
    armed: bool,
}

impl ConsoleGuard {
    pub fn new(console: Arc<dyn Console>) -> Self {
        Self {
            console,
            armed: true,
        }
    }

    /// Restore the console now and report failures
    pub fn release(mut self) -> Result<()> {
        self.armed = false;
        self.console.leave()
    }
}

impl Drop for ConsoleGuard {
    fn drop(&mut self) {
        if self.armed {
            // Best effort restore - ignore errors in destructor
            let _ = self.console.leave();
        }
    }
}

/// Console that replays scripted sizes and keys and draws off-screen
pub struct ScriptedConsole {
    terminal: Mutex<Terminal<TestBackend>>,
    current: Mutex<(u16, u16)>,
    sizes: Mutex<VecDeque<(u16, u16)>>,
    keys: Mutex<VecDeque<Option<KeyEvent>>>,
    color: bool,
    enters: AtomicUsize,
    leaves: AtomicUsize,
}

impl ScriptedConsole {
    pub fn new(width: u16, height: u16) -> Self {
        let terminal = Terminal::new(TestBackend::new(width, height))
            .unwrap_or_else(|_| unreachable!("TestBackend never fails"));
        Self {
            terminal: Mutex::new(terminal),
            current: Mutex::new((width, height)),
            sizes: Mutex::new(VecDeque::new()),
            keys: Mutex::new(VecDeque::new()),
            color: false,
            enters: AtomicUsize::new(0),
            leaves: AtomicUsize::new(0),
        }
    }

    /// Report colors as available
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Sizes returned by successive `size()` calls; the last one sticks
    pub fn with_sizes(self, sizes: impl IntoIterator<Item = (u16, u16)>) -> Self {
        self.sizes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(sizes);
        self
    }

    /// Results of successive `poll_key()` calls; `None` once exhausted
    pub fn with_keys(self, keys: impl IntoIterator<Item = Option<KeyEvent>>) -> Self {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(keys);
        self
    }

    pub fn enter_count(&self) -> usize {
        self.enters.load(Ordering::SeqCst)
    }

    pub fn leave_count(&self) -> usize {
        self.leaves.load(Ordering::SeqCst)
    }

    /// Text of the last drawn frame, one string per row, trailing blanks trimmed
    pub fn screen_lines(&self) -> Vec<String> {
        let terminal = self.terminal.lock().unwrap_or_else(PoisonError::into_inner);
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                let line: String = (area.left()..area.right())
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect();
                line.trim_end().to_string()
            })
            .collect()
    }

    /// Last drawn frame, for style assertions
    pub fn buffer(&self) -> ratatui::buffer::Buffer {
        self.terminal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .backend()
            .buffer()
            .clone()
    }
}

impl Console for ScriptedConsole {
    fn enter(&self) -> Result<()> {
        self.enters.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn leave(&self) -> Result<()> {
        self.leaves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16)> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(next) = self
            .sizes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            if next != *current {
                self.terminal
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .backend_mut()
                    .resize(next.0, next.1);
            }
            *current = next;
        }
        Ok(*current)
    }

    fn supports_color(&self) -> bool {
        self.color
    }

    fn poll_key(&self) -> Result<Option<KeyEvent>> {
        Ok(self
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .flatten())
    }

    fn draw(&self, paint: &mut dyn FnMut(&mut Frame<'_>)) -> Result<()> {
        self.terminal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .draw(|frame| paint(frame))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::widgets::Paragraph;

    #[test]
    fn test_scripted_sizes_stick_to_last() {
        let console = ScriptedConsole::new(80, 24).with_sizes([(100, 30), (120, 40)]);
        assert_eq!(console.size().unwrap(), (100, 30));
        assert_eq!(console.size().unwrap(), (120, 40));
        assert_eq!(console.size().unwrap(), (120, 40));
    }

    #[test]
    fn test_scripted_keys_then_none() {
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        let console = ScriptedConsole::new(80, 24).with_keys([None, Some(q)]);
        assert_eq!(console.poll_key().unwrap(), None);
        assert_eq!(console.poll_key().unwrap(), Some(q));
        assert_eq!(console.poll_key().unwrap(), None);
    }

    #[test]
    fn test_scripted_draw_and_read_back() {
        let console = ScriptedConsole::new(20, 2);
        console
            .draw(&mut |frame| {
                let area = frame.area();
                frame.render_widget(Paragraph::new("hello"), area);
            })
            .unwrap();
        assert_eq!(console.screen_lines(), vec!["hello".to_string(), String::new()]);
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let console = Arc::new(ScriptedConsole::new(10, 10));
        {
            let _guard = ConsoleGuard::new(console.clone());
        }
        assert_eq!(console.leave_count(), 1);

        let guard = ConsoleGuard::new(console.clone());
        guard.release().unwrap();
        assert_eq!(console.leave_count(), 2);
    }
}
