use serde::{Deserialize, Serialize};

use crate::core::action::ActionType;
use crate::core::config::io::ConfigError;
use crate::input::bindings::KeyBindings;
use crate::views::ViewId;

pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 50;
pub const DEFAULT_ERROR_DISPLAY_MS: u64 = 2000;
pub const DEFAULT_ESCAPE_DELAY_MS: u64 = 25;
pub const DEFAULT_COMMIT_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display tick period; redraws are coalesced to at most one per tick.
    pub refresh_interval_ms: u64,
    /// How long an error stays visible after the most recent one.
    pub error_display_ms: u64,
    /// How long to wait after `ESC` before treating it as a lone key.
    pub escape_delay_ms: u64,
    /// Maximum number of commits loaded into the history view.
    pub commit_limit: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<BindingEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<MappingEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            error_display_ms: DEFAULT_ERROR_DISPLAY_MS,
            escape_delay_ms: DEFAULT_ESCAPE_DELAY_MS,
            commit_limit: DEFAULT_COMMIT_LIMIT,
            bindings: Vec::new(),
            mappings: Vec::new(),
        }
    }
}

/// `[[bindings]]`: bind a key-string to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingEntry {
    #[serde(default = "default_view")]
    pub view: String,
    pub keys: String,
    pub action: String,
}

/// `[[mappings]]`: replay one key-string as another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    #[serde(default = "default_view")]
    pub view: String,
    pub from: String,
    pub to: String,
}

fn default_view() -> String {
    ViewId::All.name().to_string()
}

impl Config {
    /// Add the configured bindings and mappings on top of `bindings`.
    /// Invalid entries are skipped, each producing an error.
    pub fn apply_bindings(&self, bindings: &mut KeyBindings) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for entry in &self.bindings {
            let view = match parse_view(&entry.view) {
                Ok(view) => view,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };
            let action = match entry.action.parse::<ActionType>() {
                Ok(ActionType::None) | Err(_) => {
                    errors.push(ConfigError::UnknownAction {
                        name: entry.action.clone(),
                    });
                    continue;
                }
                Ok(action) => action,
            };
            if !bindings.bind_action(view, &entry.keys, action) {
                errors.push(ConfigError::InvalidKeys {
                    keys: entry.keys.clone(),
                    reason: "key-string is empty",
                });
            }
        }

        for entry in &self.mappings {
            let view = match parse_view(&entry.view) {
                Ok(view) => view,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };
            if !bindings.bind_keystring(view, &entry.from, &entry.to) {
                errors.push(ConfigError::InvalidKeys {
                    keys: format!("{} -> {}", entry.from, entry.to),
                    reason: "mapping needs non-empty key-strings on both sides",
                });
            }
        }

        errors
    }
}

fn parse_view(name: &str) -> Result<ViewId, ConfigError> {
    name.parse::<ViewId>()
        .map_err(|_| ConfigError::UnknownView {
            name: name.to_string(),
        })
}
