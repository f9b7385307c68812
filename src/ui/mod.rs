//! Terminal side of twig.
//!
//! - [`event_loop`]: the engine that runs the input, handler, display and
//!   signal loops.
//! - [`terminal`]: the backend contract the engine reads from and draws to.
//! - [`window`]: rendered frames handed from views to the backend.
//! - [`lifecycle`]: raw mode and alternate screen setup and teardown.

pub mod event_loop;
pub mod lifecycle;
pub mod terminal;
pub mod window;
