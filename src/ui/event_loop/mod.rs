//! The event engine.
//!
//! [`Engine`] owns the queues between four concurrently running loops:
//!
//! - the input loop decodes terminal bytes into key tokens,
//! - the handler loop resolves tokens against the key bindings and
//!   dispatches actions to the view hierarchy,
//! - the display loop coalesces redraw requests and errors into periodic
//!   renders,
//! - the signal loop reacts to process signals.
//!
//! Exit is a one-shot broadcast ([`CancellationToken`]) that every loop
//! selects on. [`end`] triggers it and unblocks the pending terminal read.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::core::config::Config;
use crate::core::error::TwigError;
use crate::input::bindings::KeyBindings;
use crate::input::buffer::InputBuffer;
use crate::input::decoder::KeyDecoder;
use crate::ui::terminal::TerminalBackend;
use crate::views::{Screen, ViewState};

mod channels;
mod display;
mod handler;
mod input;
mod signal;

#[cfg(test)]
mod tests;

pub use channels::{
    Channels, Receivers, ACTION_QUEUE_CAPACITY, ERROR_QUEUE_CAPACITY, INPUT_QUEUE_CAPACITY,
    REDRAW_QUEUE_CAPACITY, STATUS_QUEUE_CAPACITY,
};

use display::DisplayLoop;
use handler::HandlerLoop;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(2);

/// Timing knobs for the display loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Period of the display tick; at most one render happens per tick.
    pub refresh_interval: Duration,
    /// Minimum time an error stays on screen.
    pub error_display_duration: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            error_display_duration: DEFAULT_ERROR_DISPLAY_DURATION,
        }
    }
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            refresh_interval: Duration::from_millis(config.refresh_interval_ms.max(1)),
            error_display_duration: Duration::from_millis(config.error_display_ms),
        }
    }
}

pub struct Engine {
    channels: Channels,
    receivers: Receivers,
    terminal: Arc<dyn TerminalBackend>,
    screen: Arc<dyn Screen>,
    bindings: Arc<KeyBindings>,
    settings: EngineSettings,
}

impl Engine {
    /// `channels` and `receivers` come from the same [`Channels::new`] call;
    /// the views in `screen` hold clones of `channels`.
    pub fn new(
        channels: Channels,
        receivers: Receivers,
        terminal: Arc<dyn TerminalBackend>,
        screen: Arc<dyn Screen>,
        bindings: Arc<KeyBindings>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            channels,
            receivers,
            terminal,
            screen,
            bindings,
            settings,
        }
    }

    /// Initialise the view hierarchy and queue startup errors for display.
    /// Must be called before [`Engine::run`].
    pub async fn initialise(&self, startup_errors: Vec<TwigError>) -> Result<(), TwigError> {
        self.screen.initialise().await?;
        self.screen.on_state_change(ViewState::Active).await;

        for err in startup_errors {
            self.channels.report_error(err);
        }
        self.channels.request_redraw();
        Ok(())
    }

    pub fn channels(&self) -> &Channels {
        &self.channels
    }

    pub fn end(&self) {
        end(&self.channels, self.terminal.as_ref());
    }

    /// Run the four loops until exit, then dispose the view hierarchy.
    pub async fn run(self) -> Result<(), TwigError> {
        let Engine {
            channels,
            receivers,
            terminal,
            screen,
            bindings,
            settings,
        } = self;
        let Receivers {
            input_rx,
            action_rx,
            redraw_rx,
            error_rx,
            status_rx,
        } = receivers;

        info!("Starting event loops");

        let input_task = tokio::spawn(input::run_input_loop(
            KeyDecoder::new(terminal.clone()),
            channels.clone(),
        ));

        let handler_task = tokio::spawn(
            HandlerLoop {
                channels: channels.clone(),
                terminal: terminal.clone(),
                screen: screen.clone(),
                buffer: InputBuffer::new(bindings),
                input_rx,
                action_rx,
            }
            .run(),
        );

        let display_task = tokio::spawn(
            DisplayLoop::new(
                channels.clone(),
                terminal.clone(),
                screen.clone(),
                redraw_rx,
                error_rx,
                status_rx,
                settings,
            )
            .run(),
        );

        let signal_task = tokio::spawn(signal::run_signal_loop(channels.clone(), terminal.clone()));

        let (input, handler, display, signal) =
            tokio::join!(input_task, handler_task, display_task, signal_task);
        for (name, result) in [
            ("input", input),
            ("handler", handler),
            ("display", display),
            ("signal", signal),
        ] {
            if let Err(err) = result {
                error!(loop_name = name, error = %err, "Event loop task failed");
            }
        }

        debug!("Event loops stopped");
        screen.dispose().await;
        Ok(())
    }
}

/// Broadcast exit to every loop and unblock the pending terminal read.
pub(crate) fn end(channels: &Channels, terminal: &dyn TerminalBackend) {
    if channels.is_exiting() {
        return;
    }
    info!("Exit requested");
    channels.signal_exit();
    if let Err(err) = terminal.cancel_get_input() {
        error!(error = %err, "Failed to cancel pending terminal read");
    }
}
