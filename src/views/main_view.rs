//! Root view: tab bar, active tab, status bar and help or error rows.

use std::sync::Arc;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use tokio::sync::Mutex;

use crate::core::action::{Action, ActionType};
use crate::core::error::TwigError;
use crate::core::repo::RepoData;
use crate::input::bindings::KeyBindings;
use crate::ui::event_loop::Channels;
use crate::ui::terminal::Dimensions;
use crate::ui::window::{LineBuilder, Window};
use crate::views::commit::CommitSource;
use crate::views::diff::DiffSource;
use crate::views::status::StatusSource;
use crate::views::{
    ContainerView, ListView, Orientation, Screen, View, ViewId, ViewState,
};

/// Most error rows shown at the bottom of the screen.
const MAX_ERROR_ROWS: usize = 5;

pub struct Tab {
    pub title: String,
    pub view: Arc<dyn View>,
}

struct MainState {
    active_tab: usize,
    errors: Vec<String>,
    status: String,
    active: bool,
}

pub struct MainView {
    tabs: Vec<Tab>,
    bindings: Arc<KeyBindings>,
    state: Mutex<MainState>,
}

impl MainView {
    pub fn new(tabs: Vec<Tab>, bindings: Arc<KeyBindings>) -> Self {
        Self {
            tabs,
            bindings,
            state: Mutex::new(MainState {
                active_tab: 0,
                errors: Vec::new(),
                status: String::new(),
                active: false,
            }),
        }
    }

    /// History and status tabs, each a list beside its own diff pane.
    pub fn for_repository(
        repo: Arc<dyn RepoData>,
        channels: Channels,
        bindings: Arc<KeyBindings>,
        commit_limit: usize,
    ) -> Self {
        let history = ContainerView::new(
            ViewId::History,
            vec![
                ListView::shared(CommitSource::new(repo.clone(), commit_limit), channels.clone()),
                ListView::shared(DiffSource::new(repo.clone()), channels.clone()),
            ],
            Orientation::Vertical,
        );
        let status = ContainerView::new(
            ViewId::Status,
            vec![
                ListView::shared(StatusSource::new(repo.clone()), channels.clone()),
                ListView::shared(DiffSource::new(repo), channels),
            ],
            Orientation::Vertical,
        );

        Self::new(
            vec![
                Tab {
                    title: "History".to_string(),
                    view: Arc::new(history),
                },
                Tab {
                    title: "Status".to_string(),
                    view: Arc::new(status),
                },
            ],
            bindings,
        )
    }

    async fn active_tab(&self) -> Option<Arc<dyn View>> {
        let index = self.state.lock().await.active_tab;
        self.tabs.get(index).map(|tab| tab.view.clone())
    }

    async fn switch_tab(&self, forward: bool) {
        let count = self.tabs.len();
        if count < 2 {
            return;
        }

        let (outgoing, incoming, notify) = {
            let mut state = self.state.lock().await;
            let outgoing = state.active_tab;
            state.active_tab = if forward {
                (outgoing + 1) % count
            } else {
                (outgoing + count - 1) % count
            };
            (outgoing, state.active_tab, state.active)
        };

        if notify {
            self.tabs[outgoing]
                .view
                .on_state_change(ViewState::Inactive)
                .await;
            self.tabs[incoming]
                .view
                .on_state_change(ViewState::Active)
                .await;
        }
    }

    fn tab_bar(&self, active_tab: usize) -> Line<'static> {
        let mut spans = Vec::new();
        for (index, tab) in self.tabs.iter().enumerate() {
            let style = if index == active_tab {
                Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(format!(" {} ", tab.title), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }
}

#[async_trait::async_trait]
impl View for MainView {
    async fn initialise(&self) -> Result<(), TwigError> {
        for tab in &self.tabs {
            tab.view.initialise().await?;
        }
        Ok(())
    }

    async fn dispose(&self) {
        for tab in &self.tabs {
            tab.view.dispose().await;
        }
    }

    async fn handle_key_press(&self, keystring: &str) -> Result<(), TwigError> {
        match self.active_tab().await {
            Some(tab) => tab.handle_key_press(keystring).await,
            None => Ok(()),
        }
    }

    async fn handle_action(&self, action: &Action) -> Result<(), TwigError> {
        self.state.lock().await.status.clear();

        match action.action_type {
            ActionType::NextTab => self.switch_tab(true).await,
            ActionType::PrevTab => self.switch_tab(false).await,
            _ => {
                if let Some(tab) = self.active_tab().await {
                    tab.handle_action(action).await?;
                }
            }
        }
        Ok(())
    }

    async fn on_state_change(&self, state: ViewState) {
        self.state.lock().await.active = state == ViewState::Active;
        if let Some(tab) = self.active_tab().await {
            tab.on_state_change(state).await;
        }
    }

    fn view_id(&self) -> ViewId {
        ViewId::Main
    }

    async fn render(&self, area: Rect, frames: &mut Vec<Window>) -> Result<(), TwigError> {
        let (active_tab, errors, status) = {
            let state = self.state.lock().await;
            (state.active_tab, state.errors.clone(), state.status.clone())
        };
        let view_path = self.active_view_id_hierarchy().await;

        let bottom_rows = if errors.is_empty() {
            1
        } else {
            errors.len().min(MAX_ERROR_ROWS)
        };
        let [tab_area, content_area, status_area, bottom_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(u16::try_from(bottom_rows).unwrap_or(1)),
        ])
        .areas(area);

        let mut tab_window = Window::new(ViewId::Main, tab_area);
        tab_window.push_line(self.tab_bar(active_tab));
        frames.push(tab_window);

        if let Some(tab) = self.tabs.get(active_tab) {
            tab.view.render(content_area, frames).await?;
        }

        let mut status_line = LineBuilder::new(self.bindings.clone(), view_path.clone());
        if status.is_empty() {
            self.render_status_bar(&mut status_line).await?;
        } else {
            status_line.append(status);
        }
        let mut status_window = Window::new(ViewId::Main, status_area);
        status_window.push_line(
            status_line
                .into_line()
                .style(Style::default().add_modifier(Modifier::REVERSED)),
        );
        frames.push(status_window);

        let mut bottom_window = Window::new(ViewId::Main, bottom_area);
        if errors.is_empty() {
            let mut help = LineBuilder::new(self.bindings.clone(), view_path);
            self.render_help_bar(&mut help).await?;
            bottom_window.push_line(help.into_line());
        } else {
            let skip = errors.len().saturating_sub(MAX_ERROR_ROWS);
            for err in errors.into_iter().skip(skip) {
                bottom_window.push_line(Line::styled(err, Style::default().fg(Color::Red)));
            }
        }
        frames.push(bottom_window);

        Ok(())
    }

    async fn render_help_bar(&self, line: &mut LineBuilder) -> Result<(), TwigError> {
        line.append_action_help(ActionType::Exit, "quit");
        if self.tabs.len() > 1 {
            line.append_action_help(ActionType::NextTab, "next tab");
        }
        match self.active_tab().await {
            Some(tab) => tab.render_help_bar(line).await,
            None => Ok(()),
        }
    }

    async fn render_status_bar(&self, line: &mut LineBuilder) -> Result<(), TwigError> {
        match self.active_tab().await {
            Some(tab) => tab.render_status_bar(line).await,
            None => Ok(()),
        }
    }

    async fn active_view_ids(&self, path: &mut Vec<ViewId>) {
        path.push(ViewId::Main);
        if let Some(tab) = self.active_tab().await {
            tab.active_view_ids(path).await;
        }
    }
}

#[async_trait::async_trait]
impl Screen for MainView {
    async fn set_errors(&self, errors: Vec<String>) {
        self.state.lock().await.errors = errors;
    }

    async fn set_status(&self, status: String) {
        self.state.lock().await.status = status;
    }

    async fn render_screen(&self, dimensions: Dimensions) -> Result<Vec<Window>, TwigError> {
        let mut frames = Vec::new();
        self.render(dimensions.area(), &mut frames).await?;
        Ok(frames)
    }
}
