//! Terminal: Presenting a painted canvas on a real terminal.
//!
//! [`TerminalSession`] owns raw mode and the alternate screen for as long
//! as it lives and restores both on drop. [`OutputBuffer`] turns a
//! [`Canvas`] into one buffered write per frame.

mod output;

pub use output::OutputBuffer;

use crate::canvas::Canvas;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};

/// Options for entering a terminal session.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Whether to use the alternate screen buffer.
    pub alternate_screen: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
        }
    }
}

/// RAII guard around a raw-mode terminal.
pub struct TerminalSession {
    config: SessionConfig,
    output: OutputBuffer,
    stdout: io::Stdout,
}

impl TerminalSession {
    /// Enter raw mode with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails.
    pub fn enter() -> io::Result<Self> {
        Self::with_config(SessionConfig::default())
    }

    /// Enter raw mode.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails.
    pub fn with_config(config: SessionConfig) -> io::Result<Self> {
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        if config.alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        execute!(stdout, cursor::Hide)?;

        Ok(Self {
            config,
            output: OutputBuffer::new(),
            stdout,
        })
    }

    /// Current terminal size in columns and rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be queried.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Draw a full frame.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn present(&mut self, canvas: &Canvas) -> io::Result<()> {
        self.output.present(canvas);
        let mut lock = self.stdout.lock();
        self.output.flush_to(&mut lock)
    }

    /// Blank the screen.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn clear(&mut self) -> io::Result<()> {
        self.output.clear();
        self.output.reset_attrs();
        self.output.clear_screen();
        let mut lock = self.stdout.lock();
        self.output.flush_to(&mut lock)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = self.stdout.write_all(b"\x1b[0m");
        let _ = execute!(self.stdout, cursor::Show);
        if self.config.alternate_screen {
            let _ = execute!(self.stdout, LeaveAlternateScreen);
        }
        let _ = terminal::disable_raw_mode();
    }
}

impl std::fmt::Debug for TerminalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSession")
            .field("config", &self.config)
            .field("buffered", &self.output.len())
            .finish_non_exhaustive()
    }
}
