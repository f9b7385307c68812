use std::sync::Arc;

use tracing::{debug, info};

use super::{end, Channels};
use crate::ui::terminal::TerminalBackend;

#[cfg(unix)]
struct LifecycleSignals {
    terminate: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
    cont: tokio::signal::unix::Signal,
    winch: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl LifecycleSignals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
            hangup: signal(SignalKind::hangup())?,
            quit: signal(SignalKind::quit())?,
            cont: signal(SignalKind::from_raw(signal_hook::consts::SIGCONT))?,
            winch: signal(SignalKind::window_change())?,
        })
    }
}

#[cfg(unix)]
pub(super) async fn run_signal_loop(channels: Channels, terminal: Arc<dyn TerminalBackend>) {
    debug!("Signal loop started");
    let exit = channels.exit_token();

    let LifecycleSignals {
        mut terminate,
        mut interrupt,
        mut hangup,
        mut quit,
        mut cont,
        mut winch,
    } = match LifecycleSignals::register() {
        Ok(signals) => signals,
        Err(err) => {
            channels.report_error(err.into());
            exit.cancelled().await;
            return;
        }
    };

    loop {
        tokio::select! {
            _ = exit.cancelled() => break,
            _ = terminate.recv() => {
                info!(signal = "SIGTERM", "Received terminate signal");
                end(&channels, terminal.as_ref());
                break;
            }
            _ = interrupt.recv() => {
                info!(signal = "SIGINT", "Received terminate signal");
                end(&channels, terminal.as_ref());
                break;
            }
            _ = hangup.recv() => {
                info!(signal = "SIGHUP", "Received terminate signal");
                end(&channels, terminal.as_ref());
                break;
            }
            _ = quit.recv() => {
                info!(signal = "SIGQUIT", "Received terminate signal");
                end(&channels, terminal.as_ref());
                break;
            }
            _ = cont.recv() => on_resume(&channels, terminal.as_ref()).await,
            _ = winch.recv() => on_resize(&channels, terminal.as_ref()).await,
        }
    }

    debug!("Signal loop stopped");
}

/// Back in the foreground after a suspend.
#[cfg(unix)]
async fn on_resume(channels: &Channels, terminal: &dyn TerminalBackend) {
    info!("Resuming after suspend");
    if let Err(err) = terminal.resume().await {
        channels.report_error(err);
    }
    channels.request_redraw();
}

#[cfg(unix)]
async fn on_resize(channels: &Channels, terminal: &dyn TerminalBackend) {
    debug!("Window size changed");
    if let Err(err) = terminal.resize().await {
        channels.report_error(err);
    }
    channels.request_redraw();
}

#[cfg(not(unix))]
pub(super) async fn run_signal_loop(channels: Channels, terminal: Arc<dyn TerminalBackend>) {
    debug!("Signal loop started");
    let exit = channels.exit_token();

    tokio::select! {
        _ = exit.cancelled() => {}
        result = tokio::signal::ctrl_c() => {
            if result.is_ok() {
                info!("Received interrupt");
                end(&channels, terminal.as_ref());
            }
        }
    }

    debug!("Signal loop stopped");
}
