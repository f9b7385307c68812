//! Actions: the unit of intent flowing from key resolution to the views.

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Every operation a binding can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionType {
    /// Sentinel for "no action". Never travels on the action queue.
    None,
    Exit,
    Suspend,
    NextLine,
    PrevLine,
    NextPage,
    PrevPage,
    NextHalfPage,
    PrevHalfPage,
    ScrollRight,
    ScrollLeft,
    FirstLine,
    LastLine,
    CenterView,
    Select,
    NextView,
    PrevView,
    ToggleViewLayout,
    NextTab,
    PrevTab,
    Refresh,
    ShowDiff,
}

const ACTION_NAMES: &[(ActionType, &str)] = &[
    (ActionType::None, "none"),
    (ActionType::Exit, "exit"),
    (ActionType::Suspend, "suspend"),
    (ActionType::NextLine, "next-line"),
    (ActionType::PrevLine, "prev-line"),
    (ActionType::NextPage, "next-page"),
    (ActionType::PrevPage, "prev-page"),
    (ActionType::NextHalfPage, "next-half-page"),
    (ActionType::PrevHalfPage, "prev-half-page"),
    (ActionType::ScrollRight, "scroll-right"),
    (ActionType::ScrollLeft, "scroll-left"),
    (ActionType::FirstLine, "first-line"),
    (ActionType::LastLine, "last-line"),
    (ActionType::CenterView, "center-view"),
    (ActionType::Select, "select"),
    (ActionType::NextView, "next-view"),
    (ActionType::PrevView, "prev-view"),
    (ActionType::ToggleViewLayout, "toggle-view-layout"),
    (ActionType::NextTab, "next-tab"),
    (ActionType::PrevTab, "prev-tab"),
    (ActionType::Refresh, "refresh"),
    (ActionType::ShowDiff, "show-diff"),
];

impl ActionType {
    /// Name used for this action in configuration files.
    pub fn name(self) -> &'static str {
        ACTION_NAMES
            .iter()
            .find(|(action, _)| *action == self)
            .map(|(_, name)| *name)
            .unwrap_or("none")
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ACTION_NAMES
            .iter()
            .find(|(_, name)| *name == wanted)
            .map(|(action, _)| *action)
            .ok_or_else(|| format!("unknown action '{s}'"))
    }
}

/// An opaque argument carried by an [`Action`].
pub type ActionArg = Arc<dyn Any + Send + Sync>;

/// An immutable request to do something, produced by the key resolver or by
/// a loop and consumed once by the handler loop or a view.
#[derive(Clone)]
pub struct Action {
    pub action_type: ActionType,
    args: Vec<ActionArg>,
}

impl Action {
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            args: Vec::new(),
        }
    }

    pub fn none() -> Self {
        Self::new(ActionType::None)
    }

    pub fn with_arg<T: Any + Send + Sync>(mut self, arg: T) -> Self {
        self.args.push(Arc::new(arg));
        self
    }

    pub fn is_none(&self) -> bool {
        self.action_type == ActionType::None
    }

    pub fn args(&self) -> &[ActionArg] {
        &self.args
    }

    /// Typed view of the argument at `index`, if present and of type `T`.
    pub fn arg<T: Any>(&self, index: usize) -> Option<&T> {
        self.args.get(index).and_then(|arg| arg.downcast_ref::<T>())
    }
}

impl From<ActionType> for Action {
    fn from(action_type: ActionType) -> Self {
        Action::new(action_type)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("action_type", &self.action_type)
            .field("args", &self.args.len())
            .finish()
    }
}

impl PartialEq<ActionType> for Action {
    fn eq(&self, other: &ActionType) -> bool {
        self.action_type == *other
    }
}
