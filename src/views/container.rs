//! Split pane that routes input to one active child.

use std::sync::Arc;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use tokio::sync::Mutex;

use crate::core::action::{Action, ActionType};
use crate::core::error::TwigError;
use crate::ui::window::{LineBuilder, Window};
use crate::views::{View, ViewId, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Children stacked top to bottom.
    Vertical,
    /// Children side by side.
    Horizontal,
}

impl Orientation {
    fn toggled(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }

    fn direction(self) -> Direction {
        match self {
            Orientation::Vertical => Direction::Vertical,
            Orientation::Horizontal => Direction::Horizontal,
        }
    }
}

struct ContainerState {
    active_child: usize,
    orientation: Orientation,
    active: bool,
}

pub struct ContainerView {
    id: ViewId,
    children: Vec<Arc<dyn View>>,
    state: Mutex<ContainerState>,
}

impl ContainerView {
    pub fn new(id: ViewId, children: Vec<Arc<dyn View>>, orientation: Orientation) -> Self {
        Self {
            id,
            children,
            state: Mutex::new(ContainerState {
                active_child: 0,
                orientation,
                active: false,
            }),
        }
    }

    async fn active_child(&self) -> Option<Arc<dyn View>> {
        let index = self.state.lock().await.active_child;
        self.children.get(index).cloned()
    }

    /// Make the next (or previous) child active, notifying both children
    /// when this container is itself on the active path.
    async fn switch_child(&self, forward: bool) {
        let count = self.children.len();
        let (outgoing, incoming, notify) = {
            let mut state = self.state.lock().await;
            let outgoing = state.active_child;
            state.active_child = if forward {
                (outgoing + 1) % count
            } else {
                (outgoing + count - 1) % count
            };
            (outgoing, state.active_child, state.active)
        };

        if notify && outgoing != incoming {
            self.children[outgoing]
                .on_state_change(ViewState::Inactive)
                .await;
            self.children[incoming]
                .on_state_change(ViewState::Active)
                .await;
        }
    }
}

#[async_trait::async_trait]
impl View for ContainerView {
    async fn initialise(&self) -> Result<(), TwigError> {
        for child in &self.children {
            child.initialise().await?;
        }
        Ok(())
    }

    async fn dispose(&self) {
        for child in &self.children {
            child.dispose().await;
        }
    }

    async fn handle_key_press(&self, keystring: &str) -> Result<(), TwigError> {
        match self.active_child().await {
            Some(child) => child.handle_key_press(keystring).await,
            None => Ok(()),
        }
    }

    async fn handle_action(&self, action: &Action) -> Result<(), TwigError> {
        match action.action_type {
            ActionType::NextView | ActionType::PrevView if self.children.len() > 1 => {
                self.switch_child(action.action_type == ActionType::NextView)
                    .await;
                return Ok(());
            }
            ActionType::ToggleViewLayout => {
                let mut state = self.state.lock().await;
                state.orientation = state.orientation.toggled();
                return Ok(());
            }
            _ => {}
        }

        let interested: Vec<Arc<dyn View>> = self
            .children
            .iter()
            .filter(|child| child.interested_in(action))
            .cloned()
            .collect();
        if !interested.is_empty() {
            for child in interested {
                child.handle_action(action).await?;
            }
            return Ok(());
        }

        match self.active_child().await {
            Some(child) => child.handle_action(action).await,
            None => Ok(()),
        }
    }

    async fn on_state_change(&self, state: ViewState) {
        self.state.lock().await.active = state == ViewState::Active;
        if let Some(child) = self.active_child().await {
            child.on_state_change(state).await;
        }
    }

    fn view_id(&self) -> ViewId {
        self.id
    }

    async fn render(&self, area: Rect, frames: &mut Vec<Window>) -> Result<(), TwigError> {
        if self.children.is_empty() {
            return Ok(());
        }

        let orientation = self.state.lock().await.orientation;
        let count = u32::try_from(self.children.len()).unwrap_or(u32::MAX);
        let areas = Layout::default()
            .direction(orientation.direction())
            .constraints(vec![Constraint::Ratio(1, count); self.children.len()])
            .split(area)
            .to_vec();

        for (child, child_area) in self.children.iter().zip(areas) {
            child.render(child_area, frames).await?;
        }
        Ok(())
    }

    async fn render_help_bar(&self, line: &mut LineBuilder) -> Result<(), TwigError> {
        if self.children.len() > 1 {
            line.append_action_help(ActionType::NextView, "next pane");
        }
        match self.active_child().await {
            Some(child) => child.render_help_bar(line).await,
            None => Ok(()),
        }
    }

    async fn render_status_bar(&self, line: &mut LineBuilder) -> Result<(), TwigError> {
        match self.active_child().await {
            Some(child) => child.render_status_bar(line).await,
            None => Ok(()),
        }
    }

    async fn active_view_ids(&self, path: &mut Vec<ViewId>) {
        path.push(self.id);
        if let Some(child) = self.active_child().await {
            child.active_view_ids(path).await;
        }
    }

    fn interested_in(&self, action: &Action) -> bool {
        self.children.iter().any(|child| child.interested_in(action))
    }
}
