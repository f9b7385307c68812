//! Keyboard input: decoding raw terminal bytes into key tokens and
//! resolving token sequences into actions.
//!
//! - [`key`]: the token alphabet and key-string tokenizer shared by the
//!   decoder and configuration.
//! - [`decoder`]: incremental byte to token decoding.
//! - [`bindings`]: the scoped binding table.
//! - [`buffer`]: the pending sequence owned by the handler loop.

pub mod bindings;
pub mod buffer;
pub mod decoder;
pub mod key;

pub use bindings::{Binding, BoundKeyString, KeyBindings, Lookup};
pub use buffer::{InputBuffer, Resolution};
pub use decoder::KeyDecoder;
