//! Scoped key-binding table.
//!
//! Bindings are stored per [`ViewId`] as a prefix tree over key tokens.
//! Lookups walk the active view path from the most specific view to the
//! root and finally the [`ViewId::All`] scope.

use std::collections::HashMap;
use std::iter;

use crate::core::action::ActionType;
use crate::input::key::{join, tokenize};
use crate::views::ViewId;

/// What a key sequence is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Action(ActionType),
    /// Replay another key-string in place of the matched one.
    Keystring(String),
}

/// Result of matching a token sequence against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The sequence is bound and nothing longer starts with it.
    Match(Binding),
    /// The sequence starts at least one longer binding.
    Prefix,
    NoMatch,
}

/// A key-string bound in a particular scope, as shown in help output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundKeyString {
    pub view: ViewId,
    pub keystring: String,
}

#[derive(Debug, Default)]
struct BindingNode {
    children: HashMap<String, BindingNode>,
    binding: Option<Binding>,
}

impl BindingNode {
    fn walk(&self, tokens: &[String]) -> Option<&BindingNode> {
        tokens
            .iter()
            .try_fold(self, |node, token| node.children.get(token))
    }

    fn insert(&mut self, tokens: &[String], binding: Binding) {
        let node = tokens.iter().fold(self, |node, token| {
            node.children.entry(token.clone()).or_default()
        });
        node.binding = Some(binding);
    }
}

const DEFAULT_BINDINGS: &[(&str, ActionType)] = &[
    ("k", ActionType::PrevLine),
    ("<Up>", ActionType::PrevLine),
    ("j", ActionType::NextLine),
    ("<Down>", ActionType::NextLine),
    ("h", ActionType::ScrollLeft),
    ("<Left>", ActionType::ScrollLeft),
    ("l", ActionType::ScrollRight),
    ("<Right>", ActionType::ScrollRight),
    ("<C-f>", ActionType::NextPage),
    ("<PageDown>", ActionType::NextPage),
    ("<C-b>", ActionType::PrevPage),
    ("<PageUp>", ActionType::PrevPage),
    ("<C-d>", ActionType::NextHalfPage),
    ("<C-u>", ActionType::PrevHalfPage),
    ("gg", ActionType::FirstLine),
    ("<Home>", ActionType::FirstLine),
    ("G", ActionType::LastLine),
    ("<End>", ActionType::LastLine),
    ("zz", ActionType::CenterView),
    ("<Enter>", ActionType::Select),
    ("<Tab>", ActionType::NextView),
    ("<C-w>w", ActionType::NextView),
    ("<S-Tab>", ActionType::PrevView),
    ("<C-w>W", ActionType::PrevView),
    ("<C-w>t", ActionType::ToggleViewLayout),
    ("gt", ActionType::NextTab),
    ("gT", ActionType::PrevTab),
    ("<C-r>", ActionType::Refresh),
    ("q", ActionType::Exit),
    ("<C-c>", ActionType::Exit),
    ("<C-z>", ActionType::Suspend),
];

#[derive(Debug, Default)]
pub struct KeyBindings {
    scopes: HashMap<ViewId, BindingNode>,
    /// Every live binding in definition order.
    defined: Vec<(ViewId, String, Binding)>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table populated with the built-in bindings.
    pub fn with_defaults() -> Self {
        let mut bindings = Self::new();
        for (keys, action) in DEFAULT_BINDINGS {
            bindings.bind_action(ViewId::All, keys, *action);
        }
        bindings
    }

    pub fn bind_action(&mut self, view: ViewId, keystring: &str, action: ActionType) -> bool {
        self.bind(view, keystring, Binding::Action(action))
    }

    pub fn bind_keystring(&mut self, view: ViewId, from: &str, to: &str) -> bool {
        if tokenize(to).is_empty() {
            return false;
        }
        self.bind(view, from, Binding::Keystring(to.to_string()))
    }

    /// Bind `keystring` in `view`, replacing any earlier binding of the same
    /// key-string in that scope. Returns false for an empty key-string.
    pub fn bind(&mut self, view: ViewId, keystring: &str, binding: Binding) -> bool {
        let tokens = tokenize(keystring);
        if tokens.is_empty() {
            return false;
        }

        let canonical = join(&tokens);
        self.defined
            .retain(|(v, keys, _)| !(*v == view && *keys == canonical));
        self.defined.push((view, canonical, binding.clone()));
        self.scopes
            .entry(view)
            .or_default()
            .insert(&tokens, binding);
        true
    }

    /// Match `tokens` against the scopes on `view_path`, most specific
    /// first, then the [`ViewId::All`] scope.
    ///
    /// A sequence that is bound and also starts a longer binding reports
    /// [`Lookup::Prefix`]: the longer binding wins and input keeps buffering.
    pub fn lookup(&self, view_path: &[ViewId], tokens: &[String]) -> Lookup {
        let scopes = view_path.iter().rev().chain(iter::once(&ViewId::All));

        for view in scopes {
            let Some(node) = self.scopes.get(view).and_then(|root| root.walk(tokens)) else {
                continue;
            };

            if !node.children.is_empty() {
                return Lookup::Prefix;
            }
            if let Some(binding) = &node.binding {
                return Lookup::Match(binding.clone());
            }
        }

        Lookup::NoMatch
    }

    /// Key-strings that trigger `action` when `view_path` is active,
    /// ordered least to most specific and, within a scope, oldest first.
    pub fn key_strings(&self, action: ActionType, view_path: &[ViewId]) -> Vec<BoundKeyString> {
        let wanted = Lookup::Match(Binding::Action(action));
        let scopes = iter::once(&ViewId::All).chain(view_path.iter());

        scopes
            .flat_map(|scope| {
                self.defined.iter().filter(move |(view, _, binding)| {
                    view == scope && *binding == Binding::Action(action)
                })
            })
            .filter(|(_, keys, _)| self.lookup(view_path, &tokenize(keys)) == wanted)
            .map(|(view, keys, _)| BoundKeyString {
                view: *view,
                keystring: keys.clone(),
            })
            .collect()
    }

    /// All bindings in definition order.
    pub fn entries(&self) -> impl Iterator<Item = (ViewId, &str, &Binding)> {
        self.defined
            .iter()
            .map(|(view, keys, binding)| (*view, keys.as_str(), binding))
    }
}
