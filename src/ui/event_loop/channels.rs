//! Bounded queues between the engine loops.
//!
//! Redraw requests, errors, status messages and key tokens are lossy: they
//! are offered with `try_send` and dropped when the queue is full, because
//! the consumer recomputes from current state rather than replaying
//! history. Actions are never dropped; enqueueing one waits for space.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::action::Action;
use crate::core::error::TwigError;

pub const INPUT_QUEUE_CAPACITY: usize = 100;
pub const ACTION_QUEUE_CAPACITY: usize = 100;
pub const REDRAW_QUEUE_CAPACITY: usize = 1;
pub const ERROR_QUEUE_CAPACITY: usize = 100;
pub const STATUS_QUEUE_CAPACITY: usize = 10;

/// Sending halves of every queue plus the exit signal. Cheap to clone;
/// views keep one to request redraws and actions.
#[derive(Clone)]
pub struct Channels {
    input_tx: mpsc::Sender<String>,
    action_tx: mpsc::Sender<Action>,
    redraw_tx: mpsc::Sender<()>,
    error_tx: mpsc::Sender<TwigError>,
    status_tx: mpsc::Sender<String>,
    exit: CancellationToken,
}

/// Receiving halves, handed out to the loops when the engine starts.
pub struct Receivers {
    pub input_rx: mpsc::Receiver<String>,
    pub action_rx: mpsc::Receiver<Action>,
    pub redraw_rx: mpsc::Receiver<()>,
    pub error_rx: mpsc::Receiver<TwigError>,
    pub status_rx: mpsc::Receiver<String>,
}

impl Channels {
    pub fn new() -> (Self, Receivers) {
        let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        let (action_tx, action_rx) = mpsc::channel(ACTION_QUEUE_CAPACITY);
        let (redraw_tx, redraw_rx) = mpsc::channel(REDRAW_QUEUE_CAPACITY);
        let (error_tx, error_rx) = mpsc::channel(ERROR_QUEUE_CAPACITY);
        let (status_tx, status_rx) = mpsc::channel(STATUS_QUEUE_CAPACITY);

        let channels = Self {
            input_tx,
            action_tx,
            redraw_tx,
            error_tx,
            status_tx,
            exit: CancellationToken::new(),
        };
        let receivers = Receivers {
            input_rx,
            action_rx,
            redraw_rx,
            error_rx,
            status_rx,
        };
        (channels, receivers)
    }

    /// Ask for a redraw on the next display tick. Never blocks; a full
    /// queue already holds a request that covers this one.
    pub fn request_redraw(&self) {
        let _ = self.redraw_tx.try_send(());
    }

    /// Show an error to the user. Never blocks; drops the error when the
    /// queue is full.
    pub fn report_error(&self, err: TwigError) {
        debug!(error = %err, "Reporting error");
        if let Err(mpsc::error::TrySendError::Full(err)) = self.error_tx.try_send(err) {
            warn!(error = %err, "Error queue full, dropping error");
        }
    }

    pub fn report_status(&self, status: impl Into<String>) {
        if self.status_tx.try_send(status.into()).is_err() {
            debug!("Status queue full, dropping status update");
        }
    }

    /// Queue an action for the handler loop, waiting for space. The no-op
    /// action is discarded, and the wait is abandoned once exit begins.
    pub async fn request_action(&self, action: Action) {
        if action.is_none() {
            return;
        }

        tokio::select! {
            result = self.action_tx.send(action) => {
                if result.is_err() {
                    debug!("Action queue closed");
                }
            }
            _ = self.exit.cancelled() => {}
        }
    }

    pub fn is_exiting(&self) -> bool {
        self.exit.is_cancelled()
    }

    pub fn exit_token(&self) -> CancellationToken {
        self.exit.clone()
    }

    pub(crate) fn enqueue_key(&self, token: String) {
        match self.input_tx.try_send(token) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(token)) => {
                warn!(token = %token, "Input queue full, dropping key");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Input queue closed");
            }
        }
    }

    pub(crate) fn signal_exit(&self) {
        self.exit.cancel();
    }
}
