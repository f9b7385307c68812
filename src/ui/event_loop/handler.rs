use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use super::{end, Channels};
use crate::core::action::{Action, ActionType};
use crate::input::buffer::{InputBuffer, Resolution};
use crate::ui::terminal::TerminalBackend;
use crate::views::Screen;

pub(super) struct HandlerLoop {
    pub(super) channels: Channels,
    pub(super) terminal: Arc<dyn TerminalBackend>,
    pub(super) screen: Arc<dyn Screen>,
    pub(super) buffer: InputBuffer,
    pub(super) input_rx: mpsc::Receiver<String>,
    pub(super) action_rx: mpsc::Receiver<Action>,
}

impl HandlerLoop {
    pub(super) async fn run(mut self) {
        debug!("Handler loop started");
        let exit = self.channels.exit_token();

        loop {
            // Queued actions go before new keys so the loop never fills its
            // own action queue.
            tokio::select! {
                biased;

                _ = exit.cancelled() => break,
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action).await;
                }
                Some(token) = self.input_rx.recv() => {
                    self.handle_key(token).await;
                }
            }
        }

        debug!("Handler loop stopped");
    }

    async fn handle_key(&mut self, token: String) {
        trace!(token = %token, "Key received");
        self.buffer.append(token);

        loop {
            let view_path = self.screen.active_view_id_hierarchy().await;

            match self.buffer.process(&view_path) {
                Ok(Resolution::Action(action)) => {
                    trace!(action = %action.action_type, "Key sequence resolved");
                    self.channels.request_action(action).await;
                }
                Ok(Resolution::Literal(keys)) => {
                    trace!(keys = %keys, "Forwarding key-string to active view");
                    if let Err(err) = self.screen.handle_key_press(&keys).await {
                        self.channels.report_error(err);
                    }
                    self.channels.request_redraw();
                    break;
                }
                Ok(Resolution::Incomplete) | Ok(Resolution::Empty) => break,
                Err(err) => {
                    self.channels.report_error(err);
                    break;
                }
            }
        }
    }

    async fn handle_action(&mut self, action: Action) {
        debug!(action = %action.action_type, "Handling action");

        match action.action_type {
            ActionType::Exit => end(&self.channels, self.terminal.as_ref()),
            ActionType::Suspend => {
                info!("Suspending");
                if let Err(err) = self.terminal.suspend().await {
                    self.channels.report_error(err);
                }
            }
            _ => {
                if let Err(err) = self.screen.handle_action(&action).await {
                    self.channels.report_error(err);
                }
                self.channels.request_redraw();
            }
        }
    }
}
