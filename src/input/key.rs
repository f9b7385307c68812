//! Key tokens and key-string tokenization.
//!
//! A key token is the canonical string for one keypress: a printable
//! character (`j`, `é`), or a bracketed name (`<Enter>`, `<C-w>`, `<M-x>`).
//! Bracketed tokens never contain `<` or `>`, which is what lets a
//! concatenation of tokens be split back into the same tokens. The literal
//! characters are spelled `<lt>` and, inside a meta combination, `gt`.

pub const ESCAPE: &str = "<Escape>";
pub const ENTER: &str = "<Enter>";
pub const TAB: &str = "<Tab>";
pub const BACK_TAB: &str = "<S-Tab>";
pub const BACKSPACE: &str = "<Backspace>";
pub const SPACE: &str = "<Space>";
pub const LESS_THAN: &str = "<lt>";

/// Aliases accepted in configuration, keyed by lower-case name.
const NAME_ALIASES: &[(&str, &str)] = &[
    ("escape", "Escape"),
    ("esc", "Escape"),
    ("enter", "Enter"),
    ("cr", "Enter"),
    ("return", "Enter"),
    ("tab", "Tab"),
    ("s-tab", "S-Tab"),
    ("backtab", "S-Tab"),
    ("backspace", "Backspace"),
    ("bs", "Backspace"),
    ("space", "Space"),
    ("lt", "lt"),
    ("up", "Up"),
    ("down", "Down"),
    ("left", "Left"),
    ("right", "Right"),
    ("home", "Home"),
    ("end", "End"),
    ("insert", "Insert"),
    ("delete", "Delete"),
    ("del", "Delete"),
    ("pageup", "PageUp"),
    ("pagedown", "PageDown"),
];

/// Bracket a key name: `Enter` becomes `<Enter>`.
pub fn named(name: &str) -> String {
    format!("<{name}>")
}

/// Token for the ASCII control byte produced by Ctrl+`c`.
pub fn control(c: char) -> String {
    format!("<C-{c}>")
}

/// Meta (Alt) combination of an already decoded token.
pub fn meta(token: &str) -> String {
    match token.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        Some(inner) => format!("<M-{inner}>"),
        None if token == ">" => "<M-gt>".to_string(),
        None => format!("<M-{token}>"),
    }
}

/// Token for a single printable character.
pub fn character(c: char) -> String {
    match c {
        '<' => LESS_THAN.to_string(),
        ' ' => SPACE.to_string(),
        c => c.to_string(),
    }
}

/// Split a key-string into tokens.
///
/// A `<` starts a bracketed token when a `>` follows with a non-empty name
/// that contains no `<`; otherwise it is a token by itself. Every token is
/// normalised, so `<esc>` and `<Escape>` compare equal.
pub fn tokenize(keystring: &str) -> Vec<String> {
    let chars: Vec<char> = keystring.chars().collect();
    let mut tokens = Vec::new();
    let mut index = 0;

    while index < chars.len() {
        if chars[index] == '<' {
            if let Some(len) = bracketed_len(&chars[index..]) {
                let raw: String = chars[index..index + len].iter().collect();
                tokens.push(normalize(&raw));
                index += len;
                continue;
            }
        }

        tokens.push(chars[index].to_string());
        index += 1;
    }

    tokens
}

/// Length (in chars, including brackets) of a bracketed token at the start
/// of `chars`.
fn bracketed_len(chars: &[char]) -> Option<usize> {
    let close = chars.iter().skip(1).position(|&c| c == '>')? + 1;
    let inner = &chars[1..close];
    if inner.is_empty() || inner.contains(&'<') || inner.iter().any(|c| c.is_whitespace()) {
        return None;
    }
    Some(close + 1)
}

/// Canonical form of a single bracketed token.
pub fn normalize(token: &str) -> String {
    let Some(inner) = token.strip_prefix('<').and_then(|t| t.strip_suffix('>')) else {
        return token.to_string();
    };

    let lower = inner.to_ascii_lowercase();
    if let Some((_, canonical)) = NAME_ALIASES.iter().find(|(alias, _)| *alias == lower) {
        return named(canonical);
    }

    if let Some(rest) = strip_modifier(inner, 'c') {
        return control_name(rest);
    }

    if let Some(rest) = strip_modifier(inner, 'm') {
        let base = if rest.chars().count() == 1 {
            rest.to_string()
        } else {
            let normalized = normalize(&named(rest));
            normalized
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .unwrap_or(rest)
                .to_string()
        };
        return named(&format!("M-{base}"));
    }

    if let Some(number) = lower.strip_prefix('f') {
        if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
            return named(&format!("F{number}"));
        }
    }

    token.to_string()
}

fn strip_modifier(inner: &str, modifier: char) -> Option<&str> {
    let mut chars = inner.chars();
    let first = chars.next()?;
    if first.to_ascii_lowercase() != modifier || chars.next() != Some('-') {
        return None;
    }
    let rest = &inner[2..];
    (!rest.is_empty()).then_some(rest)
}

/// Control combinations only exist for single characters; letters are
/// lower-cased because the terminal cannot tell `<C-a>` from `<C-A>`.
fn control_name(rest: &str) -> String {
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => control(c.to_ascii_lowercase()),
        (Some(c), None) => control(c),
        _ if rest.eq_ignore_ascii_case("space") => control_space(),
        _ => named(&format!("C-{rest}")),
    }
}

pub fn control_space() -> String {
    "<C-Space>".to_string()
}

/// Concatenate tokens back into a key-string.
pub fn join(tokens: &[String]) -> String {
    tokens.concat()
}
