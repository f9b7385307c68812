use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use super::{Channels, EngineSettings};
use crate::core::error::TwigError;
use crate::ui::terminal::TerminalBackend;
use crate::views::Screen;

/// Most errors kept for display at once; older ones are dropped first.
const MAX_PENDING_ERRORS: usize = 20;

/// `time::interval` rejects a zero period.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

pub(super) struct DisplayLoop {
    channels: Channels,
    terminal: Arc<dyn TerminalBackend>,
    screen: Arc<dyn Screen>,
    redraw_rx: mpsc::Receiver<()>,
    error_rx: mpsc::Receiver<TwigError>,
    status_rx: mpsc::Receiver<String>,
    refresh_interval: Duration,
    error_display_duration: Duration,
    refresh_pending: bool,
    errors: Vec<String>,
    last_error: Option<Instant>,
}

impl DisplayLoop {
    pub(super) fn new(
        channels: Channels,
        terminal: Arc<dyn TerminalBackend>,
        screen: Arc<dyn Screen>,
        redraw_rx: mpsc::Receiver<()>,
        error_rx: mpsc::Receiver<TwigError>,
        status_rx: mpsc::Receiver<String>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            channels,
            terminal,
            screen,
            redraw_rx,
            error_rx,
            status_rx,
            refresh_interval: settings.refresh_interval.max(MIN_REFRESH_INTERVAL),
            error_display_duration: settings.error_display_duration,
            refresh_pending: false,
            errors: Vec::new(),
            last_error: None,
        }
    }

    pub(super) async fn run(mut self) {
        debug!("Display loop started");
        let exit = self.channels.exit_token();
        let mut ticker = time::interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = exit.cancelled() => break,
                Some(()) = self.redraw_rx.recv() => {
                    self.refresh_pending = true;
                }
                Some(err) = self.error_rx.recv() => {
                    self.record_error(err);
                }
                Some(status) = self.status_rx.recv() => {
                    self.screen.set_status(status).await;
                    self.refresh_pending = true;
                }
                _ = ticker.tick() => {
                    self.on_tick().await;
                }
            }
        }

        debug!("Display loop stopped");
    }

    /// Record an error along with any others already queued behind it.
    fn record_error(&mut self, err: TwigError) {
        self.errors.push(err.to_string());
        while let Ok(err) = self.error_rx.try_recv() {
            self.errors.push(err.to_string());
        }

        if self.errors.len() > MAX_PENDING_ERRORS {
            let excess = self.errors.len() - MAX_PENDING_ERRORS;
            self.errors.drain(..excess);
        }

        self.last_error = Some(Instant::now());
        self.refresh_pending = true;
    }

    async fn on_tick(&mut self) {
        if self.errors_expired() {
            trace!(count = self.errors.len(), "Clearing expired errors");
            self.errors.clear();
            self.refresh_pending = true;
        }

        if !self.refresh_pending {
            return;
        }

        self.screen.set_errors(self.errors.clone()).await;
        if let Err(err) = self.render().await {
            debug!(error = %err, "Render failed");
            self.channels.report_error(err);
        }
        self.refresh_pending = false;
    }

    fn errors_expired(&self) -> bool {
        !self.errors.is_empty()
            && self
                .last_error
                .is_some_and(|at| at.elapsed() >= self.error_display_duration)
    }

    async fn render(&self) -> Result<(), TwigError> {
        let dimensions = self.terminal.view_dimension();
        let frames = self.screen.render_screen(dimensions).await?;
        self.terminal.update(frames).await
    }
}
