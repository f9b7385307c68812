//! Twig is a keyboard-driven terminal browser for git repositories.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`input`] decodes raw terminal bytes into key tokens and resolves token
//!   sequences against scoped key bindings.
//! - [`ui`] owns the terminal backend and the event engine that ties input,
//!   action dispatch, rendering and signals together.
//! - [`views`] is the view hierarchy: a tabbed root, split containers and
//!   list panes over repository data.
//! - [`core`] holds actions, errors, configuration and repository access.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod cli;
pub mod core;
pub mod input;
pub mod ui;
pub mod utils;
pub mod views;
