//! Pending key sequence and its resolution against the binding table.

use std::sync::Arc;

use crate::core::action::Action;
use crate::core::error::TwigError;
use crate::input::bindings::{Binding, KeyBindings, Lookup};
use crate::input::key::{join, tokenize};
use crate::views::ViewId;

/// Maximum number of key-string mappings applied while resolving one
/// sequence.
const MAX_REMAP_DEPTH: usize = 16;

/// Outcome of one resolution attempt.
#[derive(Debug)]
pub enum Resolution {
    Action(Action),
    /// Forward this key-string to the active view unchanged.
    Literal(String),
    /// The pending tokens start a longer binding; wait for more input.
    Incomplete,
    /// Nothing is pending.
    Empty,
}

/// Tokens typed but not yet resolved. Owned by the handler loop.
pub struct InputBuffer {
    pending: Vec<String>,
    bindings: Arc<KeyBindings>,
}

impl InputBuffer {
    pub fn new(bindings: Arc<KeyBindings>) -> Self {
        Self {
            pending: Vec::new(),
            bindings,
        }
    }

    pub fn append(&mut self, token: String) {
        self.pending.push(token);
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Resolve the pending tokens for the given active view path.
    ///
    /// Any result other than [`Resolution::Incomplete`] leaves the buffer
    /// empty, including the error returned for a mapping that recurses too
    /// deeply.
    pub fn process(&mut self, view_path: &[ViewId]) -> Result<Resolution, TwigError> {
        let mut remaps = 0;

        loop {
            if self.pending.is_empty() {
                return Ok(Resolution::Empty);
            }

            match self.bindings.lookup(view_path, &self.pending) {
                Lookup::Prefix => return Ok(Resolution::Incomplete),
                Lookup::Match(Binding::Action(action_type)) => {
                    self.pending.clear();
                    return Ok(Resolution::Action(Action::new(action_type)));
                }
                Lookup::Match(Binding::Keystring(mapped)) => {
                    remaps += 1;
                    if remaps > MAX_REMAP_DEPTH {
                        let keys = join(&self.pending);
                        self.pending.clear();
                        return Err(TwigError::KeyMapping(format!(
                            "mapping for {keys} is nested more than {MAX_REMAP_DEPTH} levels deep"
                        )));
                    }
                    self.pending = tokenize(&mapped);
                }
                Lookup::NoMatch => {
                    let keys = join(&self.pending);
                    self.pending.clear();
                    return Ok(Resolution::Literal(keys));
                }
            }
        }
    }
}
