//! Commit log pane.

use std::sync::Arc;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::core::error::TwigError;
use crate::core::repo::{Commit, DiffTarget, RepoData};
use crate::views::list::{ListRow, ListSource};
use crate::views::ViewId;

pub struct CommitSource {
    repo: Arc<dyn RepoData>,
    limit: usize,
}

impl CommitSource {
    pub fn new(repo: Arc<dyn RepoData>, limit: usize) -> Self {
        Self { repo, limit }
    }
}

fn commit_row(commit: &Commit) -> ListRow {
    let line = Line::from(vec![
        Span::styled(commit.short_id.clone(), Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(commit.date.clone(), Style::default().fg(Color::Blue)),
        Span::raw(" "),
        Span::styled(commit.author.clone(), Style::default().fg(Color::Green)),
        Span::raw(" "),
        Span::raw(commit.summary.clone()),
    ]);
    ListRow::new(line).with_target(DiffTarget::Commit(commit.id.clone()))
}

#[async_trait::async_trait]
impl ListSource for CommitSource {
    fn view_id(&self) -> ViewId {
        ViewId::Commit
    }

    fn title(&self) -> String {
        "Commits".to_string()
    }

    async fn load(&self) -> Result<Vec<ListRow>, TwigError> {
        let commits = self.repo.commits(self.limit).await?;
        if commits.is_empty() {
            return Ok(vec![ListRow::new("No commits yet")]);
        }
        Ok(commits.iter().map(commit_row).collect())
    }

    fn follows_selection(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::FakeRepo;

    #[tokio::test]
    async fn rows_target_their_commit() {
        let repo = Arc::new(FakeRepo::with_commits(&["first", "second"]));
        let source = CommitSource::new(repo, 10);

        let rows = source.load().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].target, Some(DiffTarget::Commit("id1".into())));
        let text: String = rows[0].line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.ends_with("first"));
    }

    #[tokio::test]
    async fn empty_history_shows_placeholder_without_target() {
        let source = CommitSource::new(Arc::new(FakeRepo::default()), 10);
        let rows = source.load().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].target.is_none());
    }
}
