//! Terminal backend contract and the crossterm implementation.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use ratatui::layout::Rect;
use tokio::sync::{mpsc, Mutex, Notify};
use tracing::{debug, warn};

use crate::core::error::TwigError;
use crate::ui::lifecycle::{self, TwigTerminal};
use crate::ui::window::Window;

/// Terminal size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub rows: u16,
    pub cols: u16,
}

impl Dimensions {
    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.cols, self.rows)
    }
}

/// What the engine needs from a terminal.
#[async_trait::async_trait]
pub trait TerminalBackend: Send + Sync {
    /// Next raw input byte. With `block` unset this waits at most the
    /// escape delay and returns `Ok(None)` when nothing arrived. A blocking
    /// call returns `Ok(None)` once [`cancel_get_input`] has been called.
    ///
    /// [`cancel_get_input`]: TerminalBackend::cancel_get_input
    async fn get_input(&self, block: bool) -> Result<Option<u8>, TwigError>;

    /// Unblock any pending and future blocking [`get_input`] calls.
    ///
    /// [`get_input`]: TerminalBackend::get_input
    fn cancel_get_input(&self) -> Result<(), TwigError>;

    fn view_dimension(&self) -> Dimensions;

    async fn update(&self, frames: Vec<Window>) -> Result<(), TwigError>;

    async fn resize(&self) -> Result<(), TwigError>;

    /// Hand the terminal back to the shell and stop the process.
    async fn suspend(&self) -> Result<(), TwigError>;

    async fn resume(&self) -> Result<(), TwigError>;
}

pub struct CrosstermTerminal {
    terminal: Mutex<TwigTerminal>,
    input: Mutex<mpsc::UnboundedReceiver<u8>>,
    cancel: Notify,
    cancelled: AtomicBool,
    escape_delay: Duration,
    dimensions: std::sync::Mutex<Dimensions>,
}

impl CrosstermTerminal {
    pub fn new(escape_delay: Duration) -> Result<Self, TwigError> {
        let terminal = lifecycle::setup_terminal().map_err(TwigError::Terminal)?;
        let size = terminal.size().map_err(TwigError::Terminal)?;
        let input = spawn_stdin_reader().map_err(TwigError::Terminal)?;

        Ok(Self {
            terminal: Mutex::new(terminal),
            input: Mutex::new(input),
            cancel: Notify::new(),
            cancelled: AtomicBool::new(false),
            escape_delay,
            dimensions: std::sync::Mutex::new(Dimensions {
                rows: size.height,
                cols: size.width,
            }),
        })
    }

    /// Leave raw mode and the alternate screen.
    pub async fn restore(&self) -> Result<(), TwigError> {
        let mut terminal = self.terminal.lock().await;
        lifecycle::restore_terminal(&mut *terminal).map_err(TwigError::Terminal)
    }

    fn store_dimensions(&self, terminal: &TwigTerminal) -> Result<(), TwigError> {
        let size = terminal.size().map_err(TwigError::Terminal)?;
        if let Ok(mut dimensions) = self.dimensions.lock() {
            *dimensions = Dimensions {
                rows: size.height,
                cols: size.width,
            };
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TerminalBackend for CrosstermTerminal {
    async fn get_input(&self, block: bool) -> Result<Option<u8>, TwigError> {
        let mut input = self.input.lock().await;

        if !block {
            return Ok(tokio::time::timeout(self.escape_delay, input.recv())
                .await
                .ok()
                .flatten());
        }

        if self.cancelled.load(Ordering::SeqCst) {
            return Ok(None);
        }

        tokio::select! {
            byte = input.recv() => match byte {
                Some(byte) => Ok(Some(byte)),
                None => {
                    // stdin is closed; nothing more will arrive until exit.
                    self.cancel.notified().await;
                    Ok(None)
                }
            },
            _ = self.cancel.notified() => Ok(None),
        }
    }

    fn cancel_get_input(&self) -> Result<(), TwigError> {
        self.cancelled.store(true, Ordering::SeqCst);
        self.cancel.notify_one();
        Ok(())
    }

    fn view_dimension(&self) -> Dimensions {
        self.dimensions
            .lock()
            .map(|dimensions| *dimensions)
            .unwrap_or_default()
    }

    async fn update(&self, frames: Vec<Window>) -> Result<(), TwigError> {
        let mut terminal = self.terminal.lock().await;
        terminal
            .draw(|frame| {
                let screen = frame.area();
                for window in &frames {
                    frame.render_widget(window, window.area.intersection(screen));
                }
            })
            .map_err(TwigError::Terminal)?;
        Ok(())
    }

    async fn resize(&self) -> Result<(), TwigError> {
        let mut terminal = self.terminal.lock().await;
        terminal.autoresize().map_err(TwigError::Terminal)?;
        self.store_dimensions(&terminal)?;
        debug!(dimensions = ?self.view_dimension(), "Terminal resized");
        Ok(())
    }

    async fn suspend(&self) -> Result<(), TwigError> {
        {
            let mut terminal = self.terminal.lock().await;
            lifecycle::restore_terminal(&mut *terminal).map_err(TwigError::Terminal)?;
        }

        #[cfg(unix)]
        signal_hook::low_level::raise(signal_hook::consts::SIGTSTP).map_err(TwigError::Io)?;

        Ok(())
    }

    async fn resume(&self) -> Result<(), TwigError> {
        lifecycle::enter_screen().map_err(TwigError::Terminal)?;
        let mut terminal = self.terminal.lock().await;
        terminal.clear().map_err(TwigError::Terminal)?;
        terminal.autoresize().map_err(TwigError::Terminal)?;
        self.store_dimensions(&terminal)
    }
}

/// Read stdin on a dedicated thread and forward every byte. A blocking
/// read on stdin cannot be cancelled, so the async side only ever waits on
/// the channel.
fn spawn_stdin_reader() -> io::Result<mpsc::UnboundedReceiver<u8>> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::Builder::new()
        .name("twig-stdin".to_string())
        .spawn(move || {
            let mut stdin = io::stdin().lock();
            let mut buf = [0u8; 1024];
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) => {
                        debug!("stdin closed");
                        return;
                    }
                    Ok(n) => {
                        for &byte in &buf[..n] {
                            if tx.send(byte).is_err() {
                                return;
                            }
                        }
                    }
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => {
                        warn!(error = %err, "stdin read failed");
                        return;
                    }
                }
            }
        })?;

    Ok(rx)
}
