//! Incremental decoding of raw terminal bytes into key tokens.
//!
//! The decoder pulls one byte at a time from a [`TerminalBackend`]. A lone
//! `ESC` is told apart from the start of an escape sequence with a
//! non-blocking read: the backend waits at most its escape delay for a
//! follow-up byte before reporting that nothing is available.

use std::sync::Arc;

use tracing::trace;

use crate::core::error::{DecodeError, TwigError};
use crate::input::key;
use crate::ui::terminal::TerminalBackend;

const ESC: u8 = 0x1b;
const MAX_SEQUENCE_LEN: usize = 32;

pub struct KeyDecoder {
    terminal: Arc<dyn TerminalBackend>,
    /// Byte read ahead while decoding that belongs to the next token.
    pending: Option<u8>,
}

impl KeyDecoder {
    pub fn new(terminal: Arc<dyn TerminalBackend>) -> Self {
        Self {
            terminal,
            pending: None,
        }
    }

    /// Wait for the next key token.
    ///
    /// Returns `Ok(None)` when the pending read was cancelled. A decode error
    /// consumes the offending bytes; the following call resumes cleanly.
    pub async fn next_key(&mut self) -> Result<Option<String>, TwigError> {
        let Some(byte) = self.read(true).await? else {
            return Ok(None);
        };

        let token = match byte {
            ESC => Some(self.decode_escape().await?),
            0x00..=0x7f => Some(ascii_token(byte)),
            _ => self.decode_utf8(byte).await?,
        };

        if let Some(token) = &token {
            trace!(token = %token, "Decoded key");
        }
        Ok(token)
    }

    async fn read(&mut self, block: bool) -> Result<Option<u8>, TwigError> {
        if let Some(byte) = self.pending.take() {
            return Ok(Some(byte));
        }
        self.terminal.get_input(block).await
    }

    async fn decode_utf8(&mut self, lead: u8) -> Result<Option<String>, TwigError> {
        let Some(width) = utf8_width(lead) else {
            return Err(DecodeError::InvalidUtf8 { bytes: vec![lead] }.into());
        };

        let mut bytes = Vec::with_capacity(width);
        bytes.push(lead);
        while bytes.len() < width {
            match self.read(true).await? {
                None => return Ok(None),
                Some(byte) if is_continuation(byte) => bytes.push(byte),
                Some(byte) => {
                    // Not part of this character; decode it on the next call.
                    self.pending = Some(byte);
                    return Err(DecodeError::InvalidUtf8 { bytes }.into());
                }
            }
        }

        match std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.chars().next())
        {
            Some(c) => Ok(Some(key::character(c))),
            None => Err(DecodeError::InvalidUtf8 { bytes }.into()),
        }
    }

    async fn decode_escape(&mut self) -> Result<String, TwigError> {
        let Some(next) = self.read(false).await? else {
            return Ok(key::ESCAPE.to_string());
        };

        match next {
            b'[' => self.decode_csi().await,
            b'O' => self.decode_ss3().await,
            0x00..=0x7f if next != ESC => Ok(key::meta(&ascii_token(next))),
            _ => {
                self.pending = Some(next);
                Ok(key::ESCAPE.to_string())
            }
        }
    }

    async fn decode_csi(&mut self) -> Result<String, TwigError> {
        let mut params = String::new();
        loop {
            let Some(byte) = self.read(false).await? else {
                if params.is_empty() {
                    return Ok(key::meta("["));
                }
                return Err(unknown(&format!("ESC[{params}")));
            };

            match byte {
                0x20..=0x3f if params.len() < MAX_SEQUENCE_LEN => params.push(byte as char),
                0x20..=0x3f => {
                    self.skip_csi_tail().await?;
                    return Err(unknown(&format!("ESC[{params}...")));
                }
                0x40..=0x7e => return csi_token(&params, byte as char),
                _ => {
                    self.pending = Some(byte);
                    return Err(unknown(&format!("ESC[{params}")));
                }
            }
        }
    }

    /// Drop the rest of an overlong CSI sequence up to and including its
    /// final byte.
    async fn skip_csi_tail(&mut self) -> Result<(), TwigError> {
        while let Some(byte) = self.read(false).await? {
            match byte {
                0x20..=0x3f => {}
                0x40..=0x7e => break,
                _ => {
                    self.pending = Some(byte);
                    break;
                }
            }
        }
        Ok(())
    }

    async fn decode_ss3(&mut self) -> Result<String, TwigError> {
        let Some(byte) = self.read(false).await? else {
            return Ok(key::meta("O"));
        };

        let name = match byte {
            b'A' => "Up",
            b'B' => "Down",
            b'C' => "Right",
            b'D' => "Left",
            b'H' => "Home",
            b'F' => "End",
            b'P' => "F1",
            b'Q' => "F2",
            b'R' => "F3",
            b'S' => "F4",
            _ => return Err(unknown(&format!("ESCO{}", byte as char))),
        };
        Ok(key::named(name))
    }
}

fn unknown(sequence: &str) -> TwigError {
    DecodeError::UnknownSequence {
        sequence: sequence.to_string(),
    }
    .into()
}

fn csi_token(params: &str, final_byte: char) -> Result<String, TwigError> {
    let mut fields = params.split(';');
    let first = fields.next().unwrap_or("");
    let modifier = fields
        .next()
        .and_then(|m| m.parse::<u8>().ok())
        .unwrap_or(1);

    let name = match final_byte {
        'A' => "Up",
        'B' => "Down",
        'C' => "Right",
        'D' => "Left",
        'H' => "Home",
        'F' => "End",
        'Z' => return Ok(key::BACK_TAB.to_string()),
        'P' => "F1",
        'Q' => "F2",
        'R' => "F3",
        'S' => "F4",
        '~' => match first {
            "1" | "7" => "Home",
            "2" => "Insert",
            "3" => "Delete",
            "4" | "8" => "End",
            "5" => "PageUp",
            "6" => "PageDown",
            "11" => "F1",
            "12" => "F2",
            "13" => "F3",
            "14" => "F4",
            "15" => "F5",
            "17" => "F6",
            "18" => "F7",
            "19" => "F8",
            "20" => "F9",
            "21" => "F10",
            "23" => "F11",
            "24" => "F12",
            _ => return Err(unknown(&format!("ESC[{params}{final_byte}"))),
        },
        _ => return Err(unknown(&format!("ESC[{params}{final_byte}"))),
    };

    Ok(key::named(&format!("{}{name}", modifier_prefix(modifier))))
}

/// xterm encodes modifiers as `1 + bits` with shift=1, alt=2, ctrl=4.
fn modifier_prefix(param: u8) -> String {
    let bits = param.saturating_sub(1);
    let mut prefix = String::new();
    if bits & 2 != 0 {
        prefix.push_str("M-");
    }
    if bits & 4 != 0 {
        prefix.push_str("C-");
    }
    if bits & 1 != 0 {
        prefix.push_str("S-");
    }
    prefix
}

/// Token for a single byte below 0x80.
pub(crate) fn ascii_token(byte: u8) -> String {
    match byte {
        b'\r' => key::ENTER.to_string(),
        b'\t' => key::TAB.to_string(),
        0x7f => key::BACKSPACE.to_string(),
        ESC => key::ESCAPE.to_string(),
        0x00 => key::control_space(),
        0x01..=0x1a => key::control((b'a' + byte - 1) as char),
        0x1c => key::control('\\'),
        0x1d => key::control(']'),
        0x1e => key::control('^'),
        0x1f => key::control('_'),
        _ => key::character(byte as char),
    }
}

fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}
