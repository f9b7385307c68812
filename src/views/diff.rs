//! Diff pane. Follows show-diff actions from whichever list is active.

use std::sync::{Arc, Mutex};

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;

use crate::core::action::{Action, ActionType};
use crate::core::error::TwigError;
use crate::core::repo::{DiffTarget, RepoData};
use crate::views::list::{ListRow, ListSource};
use crate::views::ViewId;

pub struct DiffSource {
    repo: Arc<dyn RepoData>,
    target: Mutex<Option<DiffTarget>>,
}

impl DiffSource {
    pub fn new(repo: Arc<dyn RepoData>) -> Self {
        Self {
            repo,
            target: Mutex::new(None),
        }
    }

    fn current_target(&self) -> Option<DiffTarget> {
        self.target.lock().ok().and_then(|target| target.clone())
    }
}

fn diff_line(text: String) -> Line<'static> {
    let style = if text.starts_with("+++") || text.starts_with("---") {
        Style::default().add_modifier(Modifier::BOLD)
    } else if text.starts_with('+') {
        Style::default().fg(Color::Green)
    } else if text.starts_with('-') {
        Style::default().fg(Color::Red)
    } else if text.starts_with("@@") {
        Style::default().fg(Color::Cyan)
    } else if text.starts_with("commit ") || text.starts_with("diff ") {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::styled(text, style)
}

#[async_trait::async_trait]
impl ListSource for DiffSource {
    fn view_id(&self) -> ViewId {
        ViewId::Diff
    }

    fn title(&self) -> String {
        match self.current_target() {
            Some(DiffTarget::Commit(id)) => format!("Diff {}", id.get(..10).unwrap_or(&id)),
            Some(DiffTarget::Staged(path)) => format!("Diff (staged) {path}"),
            Some(DiffTarget::Unstaged(path)) => format!("Diff {path}"),
            None => "Diff".to_string(),
        }
    }

    async fn load(&self) -> Result<Vec<ListRow>, TwigError> {
        let Some(target) = self.current_target() else {
            return Ok(Vec::new());
        };

        let lines = self.repo.diff(&target).await?;
        if lines.is_empty() {
            return Ok(vec![ListRow::new("No changes")]);
        }
        Ok(lines
            .into_iter()
            .map(|line| ListRow::new(diff_line(line)))
            .collect())
    }

    fn interested_in(&self, action: &Action) -> bool {
        action.action_type == ActionType::ShowDiff
    }

    async fn apply(&self, action: &Action) -> bool {
        let Some(target) = action.arg::<DiffTarget>(0) else {
            return false;
        };
        let Ok(mut current) = self.target.lock() else {
            return false;
        };
        if current.as_ref() == Some(target) {
            return false;
        }
        *current = Some(target.clone());
        true
    }
}
