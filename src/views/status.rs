//! Working tree status pane.

use std::sync::Arc;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::core::error::TwigError;
use crate::core::repo::{RepoData, StatusEntry};
use crate::views::list::{ListRow, ListSource};
use crate::views::ViewId;

pub struct StatusSource {
    repo: Arc<dyn RepoData>,
}

impl StatusSource {
    pub fn new(repo: Arc<dyn RepoData>) -> Self {
        Self { repo }
    }
}

fn status_row(entry: &StatusEntry) -> ListRow {
    let code_style = if entry.is_untracked() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };
    let line = Line::from(vec![
        Span::styled(format!("{}{}", entry.index, entry.worktree), code_style),
        Span::raw(" "),
        Span::raw(entry.path.clone()),
    ]);
    ListRow::new(line).with_target(entry.diff_target())
}

#[async_trait::async_trait]
impl ListSource for StatusSource {
    fn view_id(&self) -> ViewId {
        ViewId::GitStatus
    }

    fn title(&self) -> String {
        "Status".to_string()
    }

    async fn load(&self) -> Result<Vec<ListRow>, TwigError> {
        let entries = self.repo.status().await?;
        if entries.is_empty() {
            return Ok(vec![ListRow::new("Working tree clean")]);
        }
        Ok(entries.iter().map(status_row).collect())
    }

    fn follows_selection(&self) -> bool {
        true
    }
}
