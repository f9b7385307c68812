//! Fakes shared by unit tests across the crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use ratatui::layout::Rect;
use tokio::sync::Notify;

use crate::core::action::{Action, ActionType};
use crate::core::error::TwigError;
use crate::core::repo::{Commit, DiffTarget, RepoData, StatusEntry};
use crate::ui::terminal::{Dimensions, TerminalBackend};
use crate::ui::window::{LineBuilder, Window};
use crate::views::{Screen, View, ViewId, ViewState};

/// In-memory terminal: input bytes are pushed by the test and frames are
/// recorded instead of drawn.
pub struct MockTerminal {
    input: Mutex<VecDeque<u8>>,
    input_ready: Notify,
    cancelled: AtomicBool,
    dimensions: Dimensions,
    updates: Mutex<Vec<Vec<Window>>>,
    suspends: AtomicUsize,
    resumes: AtomicUsize,
    resizes: AtomicUsize,
}

impl MockTerminal {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            input: Mutex::new(VecDeque::new()),
            input_ready: Notify::new(),
            cancelled: AtomicBool::new(false),
            dimensions: Dimensions { rows, cols },
            updates: Mutex::new(Vec::new()),
            suspends: AtomicUsize::new(0),
            resumes: AtomicUsize::new(0),
            resizes: AtomicUsize::new(0),
        }
    }

    pub fn push_bytes(&self, bytes: &[u8]) {
        self.input.lock().unwrap().extend(bytes.iter().copied());
        self.input_ready.notify_one();
    }

    pub fn push_str(&self, text: &str) {
        self.push_bytes(text.as_bytes());
    }

    pub fn has_pending_input(&self) -> bool {
        !self.input.lock().unwrap().is_empty()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    pub fn last_update(&self) -> Option<Vec<Window>> {
        self.updates.lock().unwrap().last().cloned()
    }

    pub fn suspend_count(&self) -> usize {
        self.suspends.load(Ordering::SeqCst)
    }

    pub fn resume_count(&self) -> usize {
        self.resumes.load(Ordering::SeqCst)
    }

    pub fn resize_count(&self) -> usize {
        self.resizes.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TerminalBackend for MockTerminal {
    async fn get_input(&self, block: bool) -> Result<Option<u8>, TwigError> {
        loop {
            let next = self.input.lock().unwrap().pop_front();
            if next.is_some() {
                return Ok(next);
            }
            if !block || self.cancelled.load(Ordering::SeqCst) {
                return Ok(None);
            }
            self.input_ready.notified().await;
        }
    }

    fn cancel_get_input(&self) -> Result<(), TwigError> {
        self.cancelled.store(true, Ordering::SeqCst);
        self.input_ready.notify_one();
        Ok(())
    }

    fn view_dimension(&self) -> Dimensions {
        self.dimensions
    }

    async fn update(&self, frames: Vec<Window>) -> Result<(), TwigError> {
        self.updates.lock().unwrap().push(frames);
        Ok(())
    }

    async fn resize(&self) -> Result<(), TwigError> {
        self.resizes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn suspend(&self) -> Result<(), TwigError> {
        self.suspends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self) -> Result<(), TwigError> {
        self.resumes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct Record {
    keys: Vec<String>,
    actions: Vec<ActionType>,
    states: Vec<ViewState>,
}

/// Leaf view that records what it receives.
pub struct RecordingView {
    id: ViewId,
    interest: Option<ActionType>,
    record: Mutex<Record>,
}

impl RecordingView {
    pub fn new(id: ViewId) -> Self {
        Self {
            id,
            interest: None,
            record: Mutex::new(Record::default()),
        }
    }

    pub fn interested_in_action(mut self, action: ActionType) -> Self {
        self.interest = Some(action);
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.record.lock().unwrap().keys.clone()
    }

    pub fn actions(&self) -> Vec<ActionType> {
        self.record.lock().unwrap().actions.clone()
    }

    pub fn states(&self) -> Vec<ViewState> {
        self.record.lock().unwrap().states.clone()
    }
}

#[async_trait::async_trait]
impl View for RecordingView {
    async fn initialise(&self) -> Result<(), TwigError> {
        Ok(())
    }

    async fn dispose(&self) {}

    async fn handle_key_press(&self, keystring: &str) -> Result<(), TwigError> {
        self.record.lock().unwrap().keys.push(keystring.to_string());
        Ok(())
    }

    async fn handle_action(&self, action: &Action) -> Result<(), TwigError> {
        self.record.lock().unwrap().actions.push(action.action_type);
        Ok(())
    }

    async fn on_state_change(&self, state: ViewState) {
        self.record.lock().unwrap().states.push(state);
    }

    fn view_id(&self) -> ViewId {
        self.id
    }

    async fn render(&self, area: Rect, frames: &mut Vec<Window>) -> Result<(), TwigError> {
        frames.push(Window::new(self.id, area));
        Ok(())
    }

    fn interested_in(&self, action: &Action) -> bool {
        self.interest == Some(action.action_type)
    }
}

/// Root view with a fixed active path that records everything the engine
/// hands it.
pub struct RecordingScreen {
    path: Vec<ViewId>,
    leaf: RecordingView,
    errors: Mutex<Vec<Vec<String>>>,
    statuses: Mutex<Vec<String>>,
    renders: AtomicUsize,
    initialised: AtomicBool,
    disposed: AtomicBool,
    fail_render: AtomicBool,
    fail_actions: AtomicBool,
}

impl RecordingScreen {
    pub fn new(path: Vec<ViewId>) -> Self {
        let leaf_id = path.last().copied().unwrap_or(ViewId::Main);
        Self {
            path,
            leaf: RecordingView::new(leaf_id),
            errors: Mutex::new(Vec::new()),
            statuses: Mutex::new(Vec::new()),
            renders: AtomicUsize::new(0),
            initialised: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            fail_render: AtomicBool::new(false),
            fail_actions: AtomicBool::new(false),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.leaf.keys()
    }

    pub fn actions(&self) -> Vec<ActionType> {
        self.leaf.actions()
    }

    pub fn states(&self) -> Vec<ViewState> {
        self.leaf.states()
    }

    /// Every error list passed to `set_errors`, oldest first.
    pub fn error_snapshots(&self) -> Vec<Vec<String>> {
        self.errors.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn fail_renders(&self, fail: bool) {
        self.fail_render.store(fail, Ordering::SeqCst);
    }

    pub fn fail_actions(&self, fail: bool) {
        self.fail_actions.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl View for RecordingScreen {
    async fn initialise(&self) -> Result<(), TwigError> {
        self.initialised.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    async fn handle_key_press(&self, keystring: &str) -> Result<(), TwigError> {
        self.leaf.handle_key_press(keystring).await
    }

    async fn handle_action(&self, action: &Action) -> Result<(), TwigError> {
        self.leaf.handle_action(action).await?;
        if self.fail_actions.load(Ordering::SeqCst) {
            return Err(TwigError::view(format!("cannot {}", action.action_type)));
        }
        Ok(())
    }

    async fn on_state_change(&self, state: ViewState) {
        self.leaf.on_state_change(state).await;
    }

    fn view_id(&self) -> ViewId {
        self.path.first().copied().unwrap_or(ViewId::Main)
    }

    async fn render(&self, area: Rect, frames: &mut Vec<Window>) -> Result<(), TwigError> {
        if self.fail_render.load(Ordering::SeqCst) {
            return Err(TwigError::view("render failed"));
        }
        self.renders.fetch_add(1, Ordering::SeqCst);
        frames.push(Window::new(self.view_id(), area));
        Ok(())
    }

    async fn render_help_bar(&self, line: &mut LineBuilder) -> Result<(), TwigError> {
        line.append_action_help(ActionType::Exit, "quit");
        Ok(())
    }

    async fn active_view_ids(&self, path: &mut Vec<ViewId>) {
        path.extend(self.path.iter().copied());
    }
}

#[async_trait::async_trait]
impl Screen for RecordingScreen {
    async fn set_errors(&self, errors: Vec<String>) {
        self.errors.lock().unwrap().push(errors);
    }

    async fn set_status(&self, status: String) {
        self.statuses.lock().unwrap().push(status);
    }

    async fn render_screen(&self, dimensions: Dimensions) -> Result<Vec<Window>, TwigError> {
        let mut frames = Vec::new();
        self.render(dimensions.area(), &mut frames).await?;
        Ok(frames)
    }
}

/// Repository data held in memory.
#[derive(Default)]
pub struct FakeRepo {
    pub commits: Vec<Commit>,
    pub status: Vec<StatusEntry>,
}

impl FakeRepo {
    /// Commits with ids `id0`, `id1`, ... and the given summaries.
    pub fn with_commits(summaries: &[&str]) -> Self {
        let commits = summaries
            .iter()
            .enumerate()
            .map(|(i, summary)| Commit {
                id: format!("id{i}"),
                short_id: format!("s{i}"),
                date: "2024-01-01".to_string(),
                author: "Test".to_string(),
                summary: summary.to_string(),
            })
            .collect();
        Self {
            commits,
            status: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl RepoData for FakeRepo {
    async fn commits(&self, limit: usize) -> Result<Vec<Commit>, TwigError> {
        Ok(self.commits.iter().take(limit).cloned().collect())
    }

    async fn status(&self) -> Result<Vec<StatusEntry>, TwigError> {
        Ok(self.status.clone())
    }

    async fn diff(&self, target: &DiffTarget) -> Result<Vec<String>, TwigError> {
        match target {
            DiffTarget::Commit(id) => match self.commits.iter().find(|c| &c.id == id) {
                Some(commit) => Ok(vec![
                    format!("commit {}", commit.id),
                    format!("+{}", commit.summary),
                ]),
                None => Err(TwigError::git("show", format!("unknown revision {id}"))),
            },
            DiffTarget::Staged(path) | DiffTarget::Unstaged(path) => {
                Ok(vec![format!("diff --git a/{path} b/{path}")])
            }
        }
    }
}
