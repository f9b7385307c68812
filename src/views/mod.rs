//! The view hierarchy.
//!
//! Every pane implements [`View`]. Containers route input and actions to a
//! single active child, so at any moment exactly one root-to-leaf path is
//! active. The root additionally implements [`Screen`], which is what the
//! engine loops talk to.

use std::fmt;
use std::str::FromStr;

use ratatui::layout::Rect;

use crate::core::action::Action;
use crate::core::error::TwigError;
use crate::ui::terminal::Dimensions;
use crate::ui::window::{LineBuilder, Window};

pub mod commit;
pub mod container;
pub mod diff;
pub mod list;
pub mod main_view;
pub mod position;
pub mod status;

pub use container::{ContainerView, Orientation};
pub use list::{ListRow, ListSource, ListView};
pub use main_view::MainView;
pub use position::ViewPosition;

/// Identity of a view, used as the binding scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewId {
    /// Scope that applies to every view.
    All,
    Main,
    History,
    Status,
    Commit,
    Diff,
    GitStatus,
}

const VIEW_NAMES: &[(ViewId, &str)] = &[
    (ViewId::All, "all"),
    (ViewId::Main, "main"),
    (ViewId::History, "history"),
    (ViewId::Status, "status"),
    (ViewId::Commit, "commit"),
    (ViewId::Diff, "diff"),
    (ViewId::GitStatus, "git-status"),
];

impl ViewId {
    pub fn name(self) -> &'static str {
        VIEW_NAMES
            .iter()
            .find(|(view, _)| *view == self)
            .map(|(_, name)| *name)
            .unwrap_or("all")
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        VIEW_NAMES
            .iter()
            .find(|(_, name)| *name == wanted)
            .map(|(view, _)| *view)
            .ok_or_else(|| format!("unknown view '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Active,
    Inactive,
}

/// Capabilities every pane provides.
///
/// Views are shared between the handler loop (dispatch) and the display
/// loop (render), so implementations guard their state with their own lock
/// and take `&self`.
#[async_trait::async_trait]
pub trait View: Send + Sync {
    async fn initialise(&self) -> Result<(), TwigError>;

    async fn dispose(&self);

    /// Handle a key-string no binding claimed.
    async fn handle_key_press(&self, keystring: &str) -> Result<(), TwigError>;

    async fn handle_action(&self, action: &Action) -> Result<(), TwigError>;

    /// Called when this view joins or leaves the active path.
    async fn on_state_change(&self, state: ViewState);

    fn view_id(&self) -> ViewId;

    /// Render into `area`, appending one or more frames.
    async fn render(&self, area: Rect, frames: &mut Vec<Window>) -> Result<(), TwigError>;

    async fn render_help_bar(&self, _line: &mut LineBuilder) -> Result<(), TwigError> {
        Ok(())
    }

    async fn render_status_bar(&self, _line: &mut LineBuilder) -> Result<(), TwigError> {
        Ok(())
    }

    /// Append the ids along this view's active path, this view first.
    async fn active_view_ids(&self, path: &mut Vec<ViewId>) {
        path.push(self.view_id());
    }

    /// Whether this view wants `action` even when it is not active.
    fn interested_in(&self, _action: &Action) -> bool {
        false
    }
}

/// The root of the view hierarchy.
#[async_trait::async_trait]
pub trait Screen: View {
    /// View ids from the root to the active leaf.
    async fn active_view_id_hierarchy(&self) -> Vec<ViewId> {
        let mut path = Vec::new();
        self.active_view_ids(&mut path).await;
        path
    }

    /// Errors to show until the next call.
    async fn set_errors(&self, errors: Vec<String>);

    async fn set_status(&self, status: String);

    /// Lay out and render the whole hierarchy for a terminal of the given
    /// size.
    async fn render_screen(&self, dimensions: Dimensions) -> Result<Vec<Window>, TwigError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_names_round_trip() {
        for (view, name) in VIEW_NAMES {
            assert_eq!(view.name(), *name);
            assert_eq!(name.parse::<ViewId>(), Ok(*view));
        }
        assert_eq!("Git-Status".parse::<ViewId>(), Ok(ViewId::GitStatus));
        assert!("tree".parse::<ViewId>().is_err());
    }
}
