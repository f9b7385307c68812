//! Scrollable list pane over a [`ListSource`].

use std::sync::Arc;

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use tokio::sync::Mutex;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::core::action::{Action, ActionType};
use crate::core::error::TwigError;
use crate::core::repo::DiffTarget;
use crate::ui::event_loop::Channels;
use crate::ui::window::{LineBuilder, Window};
use crate::views::{View, ViewId, ViewPosition, ViewState};

/// One row of a list and the diff it selects.
#[derive(Debug, Clone)]
pub struct ListRow {
    pub line: Line<'static>,
    pub target: Option<DiffTarget>,
}

impl ListRow {
    pub fn new(line: impl Into<Line<'static>>) -> Self {
        Self {
            line: line.into(),
            target: None,
        }
    }

    pub fn with_target(mut self, target: DiffTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Display width in terminal columns.
    pub fn width(&self) -> usize {
        self.line
            .spans
            .iter()
            .map(|span| span.content.as_ref().width())
            .sum()
    }
}

/// Content provider for a [`ListView`].
#[async_trait::async_trait]
pub trait ListSource: Send + Sync {
    fn view_id(&self) -> ViewId;

    fn title(&self) -> String;

    async fn load(&self) -> Result<Vec<ListRow>, TwigError>;

    /// Whether this source reacts to `action` even when its view is not
    /// active.
    fn interested_in(&self, _action: &Action) -> bool {
        false
    }

    /// Apply an action this source is interested in. Returns true when the
    /// content must be reloaded.
    async fn apply(&self, _action: &Action) -> bool {
        false
    }

    /// Whether moving the selection asks for the selected row's diff.
    fn follows_selection(&self) -> bool {
        false
    }
}

#[derive(Default)]
struct ListState {
    rows: Vec<ListRow>,
    position: ViewPosition,
    page_rows: usize,
    page_cols: usize,
    /// Width of the widest row.
    content_cols: usize,
    active: bool,
    last_target: Option<DiffTarget>,
}

impl ListState {
    fn selected_target(&self) -> Option<DiffTarget> {
        self.rows
            .get(self.position.active_row_index)
            .and_then(|row| row.target.clone())
    }

    /// The selected row's target when it differs from the last one
    /// announced, or unconditionally when `force` is set.
    fn take_selection_change(&mut self, force: bool) -> Option<DiffTarget> {
        let target = self.selected_target()?;
        if !force && self.last_target.as_ref() == Some(&target) {
            return None;
        }
        self.last_target = Some(target.clone());
        Some(target)
    }

    fn navigate(&mut self, action: ActionType) -> bool {
        let rows = self.rows.len();
        let page_rows = self.page_rows.max(1);
        let position = &mut self.position;

        let changed = match action {
            ActionType::NextLine => position.move_line_down(rows),
            ActionType::PrevLine => position.move_line_up(),
            ActionType::NextPage => position.move_page_down(page_rows, rows),
            ActionType::PrevPage => position.move_page_up(page_rows),
            ActionType::NextHalfPage => position.move_half_page_down(page_rows, rows),
            ActionType::PrevHalfPage => position.move_half_page_up(page_rows),
            ActionType::FirstLine => position.move_to_first_line(),
            ActionType::LastLine => position.move_to_last_line(rows),
            ActionType::ScrollRight => position.scroll_right(self.page_cols, self.content_cols),
            ActionType::ScrollLeft => position.scroll_left(self.page_cols),
            ActionType::CenterView => position.center_active_row(page_rows),
            _ => false,
        };

        if changed {
            position.determine_view_start_row(page_rows, rows);
        }
        changed
    }
}

pub struct ListView {
    source: Box<dyn ListSource>,
    channels: Channels,
    state: Mutex<ListState>,
}

impl ListView {
    pub fn new(source: Box<dyn ListSource>, channels: Channels) -> Self {
        Self {
            source,
            channels,
            state: Mutex::new(ListState::default()),
        }
    }

    pub fn shared(source: impl ListSource + 'static, channels: Channels) -> Arc<dyn View> {
        Arc::new(Self::new(Box::new(source), channels))
    }

    async fn reload(&self, reset_position: bool) -> Result<(), TwigError> {
        let rows = self.source.load().await?;
        debug!(view = %self.source.view_id(), rows = rows.len(), "List loaded");

        let mut state = self.state.lock().await;
        state.content_cols = rows.iter().map(ListRow::width).max().unwrap_or(0);
        state.rows = rows;
        if reset_position {
            state.position = ViewPosition::new();
        }
        let (page_rows, rows) = (state.page_rows.max(1), state.rows.len());
        state.position.determine_view_start_row(page_rows, rows);
        Ok(())
    }

    /// Ask for the selected row's diff if the selection moved.
    async fn announce_selection(&self, force: bool) {
        if !self.source.follows_selection() {
            return;
        }

        let target = {
            let mut state = self.state.lock().await;
            if !state.active {
                return;
            }
            state.take_selection_change(force)
        };

        if let Some(target) = target {
            self.channels
                .request_action(Action::new(ActionType::ShowDiff).with_arg(target))
                .await;
        }
    }
}

#[async_trait::async_trait]
impl View for ListView {
    async fn initialise(&self) -> Result<(), TwigError> {
        self.reload(true).await
    }

    async fn dispose(&self) {
        let mut state = self.state.lock().await;
        state.rows.clear();
    }

    async fn handle_key_press(&self, keystring: &str) -> Result<(), TwigError> {
        self.channels.report_status(format!("{keystring} is not bound"));
        Ok(())
    }

    async fn handle_action(&self, action: &Action) -> Result<(), TwigError> {
        if self.source.interested_in(action) {
            if self.source.apply(action).await {
                self.reload(true).await?;
            }
            return Ok(());
        }

        match action.action_type {
            ActionType::Refresh => {
                self.reload(false).await?;
                self.announce_selection(false).await;
            }
            ActionType::Select => self.announce_selection(true).await,
            action_type => {
                let changed = self.state.lock().await.navigate(action_type);
                if changed {
                    self.announce_selection(false).await;
                }
            }
        }
        Ok(())
    }

    async fn on_state_change(&self, state: ViewState) {
        self.state.lock().await.active = state == ViewState::Active;
        if state == ViewState::Active {
            self.announce_selection(false).await;
        }
    }

    fn view_id(&self) -> ViewId {
        self.source.view_id()
    }

    async fn render(&self, area: Rect, frames: &mut Vec<Window>) -> Result<(), TwigError> {
        let mut window = Window::new(self.source.view_id(), area).bordered(self.source.title());

        let mut state = self.state.lock().await;
        state.page_rows = window.content_rows();
        state.page_cols = window.content_cols();
        let (page_rows, rows) = (state.page_rows, state.rows.len());
        state.position.determine_view_start_row(page_rows, rows);

        window.active = state.active;
        window.column_offset = u16::try_from(state.position.view_start_column).unwrap_or(u16::MAX);

        let start = state.position.view_start_row_index;
        let selected = state.position.active_row_index;
        for (index, row) in state.rows.iter().enumerate().skip(start).take(page_rows) {
            let line = if index == selected && self.source.follows_selection() {
                let highlight = if state.active {
                    Modifier::REVERSED
                } else {
                    Modifier::BOLD
                };
                row.line.clone().patch_style(Style::default().add_modifier(highlight))
            } else {
                row.line.clone()
            };
            window.push_line(line);
        }

        frames.push(window);
        Ok(())
    }

    async fn render_help_bar(&self, line: &mut LineBuilder) -> Result<(), TwigError> {
        if self.source.follows_selection() {
            line.append_action_help(ActionType::Select, "show diff");
        } else {
            line.append_action_help(ActionType::NextPage, "page down");
        }
        Ok(())
    }

    async fn render_status_bar(&self, line: &mut LineBuilder) -> Result<(), TwigError> {
        let state = self.state.lock().await;
        let total = state.rows.len();
        let current = if total == 0 {
            0
        } else {
            state.position.active_row_index + 1
        };
        line.append(format!("{}: {current}/{total}", self.source.title()));
        Ok(())
    }

    fn interested_in(&self, action: &Action) -> bool {
        self.source.interested_in(action)
    }
}
