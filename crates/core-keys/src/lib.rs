//! Normalized key token model consumed by the dispatch engine.
//!
//! The host input layer (terminal, GUI, test harness) is responsible for
//! translating raw platform events into `KeyToken`s; everything above this
//! crate reasons exclusively in tokens. Invariants:
//! * Shifted printable characters arrive already distinguished
//!   (`KeyToken::Char('W')`, never `Char('w')` + a shift flag).
//! * `KeyToken::Chord` is reserved for modifier combinations that cannot be
//!   folded into a printable character (`<C-d>` and friends).
//! * No raw scan codes or escape sequences cross this boundary.

use std::fmt;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ModMask: u16 {
        const CTRL  = 1;
        const ALT   = 2;
        const SHIFT = 4;
        const META  = 8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Delete,
}

/// Canonical logical key token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
    Chord { base: Box<KeyToken>, mods: ModMask },
}

impl KeyToken {
    pub fn ch(c: char) -> Self {
        KeyToken::Char(c)
    }

    pub fn esc() -> Self {
        KeyToken::Named(NamedKey::Esc)
    }

    pub fn ctrl(c: char) -> Self {
        KeyToken::Chord {
            base: Box::new(KeyToken::Char(c)),
            mods: ModMask::CTRL,
        }
    }

    /// The printable character this token carries, if any. Chords never
    /// expose their base character here; `<C-r>` is not `r`.
    pub fn as_char(&self) -> Option<char> {
        match self {
            KeyToken::Char(c) => Some(*c),
            KeyToken::Named(NamedKey::Space) => Some(' '),
            _ => None,
        }
    }
}

/// Collapse degenerate forms produced by naive host translations: an empty
/// modifier mask unwraps to the base token, SHIFT plus an ASCII letter folds
/// into the uppercase character, and a named space becomes `Char(' ')` so
/// sequences can be declared with plain characters.
pub fn normalize(token: KeyToken) -> KeyToken {
    match token {
        KeyToken::Named(NamedKey::Space) => KeyToken::Char(' '),
        KeyToken::Chord { base, mods } if mods.is_empty() => normalize(*base),
        KeyToken::Chord { base, mods } if mods == ModMask::SHIFT => match *base {
            KeyToken::Char(c) if c.is_ascii_lowercase() => KeyToken::Char(c.to_ascii_uppercase()),
            other => KeyToken::Chord {
                base: Box::new(other),
                mods,
            },
        },
        other => other,
    }
}

/// Convenience for tests and registry construction: one `Char` token per
/// character of `s`.
pub fn char_tokens(s: &str) -> Vec<KeyToken> {
    s.chars().map(KeyToken::Char).collect()
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyToken::Char(' ') => write!(f, "<Space>"),
            KeyToken::Char(c) => write!(f, "{c}"),
            KeyToken::Named(n) => match n {
                NamedKey::Enter => write!(f, "<CR>"),
                NamedKey::Esc => write!(f, "<Esc>"),
                NamedKey::Backspace => write!(f, "<BS>"),
                NamedKey::Tab => write!(f, "<Tab>"),
                NamedKey::Space => write!(f, "<Space>"),
                NamedKey::Up => write!(f, "<Up>"),
                NamedKey::Down => write!(f, "<Down>"),
                NamedKey::Left => write!(f, "<Left>"),
                NamedKey::Right => write!(f, "<Right>"),
                NamedKey::Home => write!(f, "<Home>"),
                NamedKey::End => write!(f, "<End>"),
                NamedKey::Delete => write!(f, "<Del>"),
            },
            KeyToken::Chord { base, mods } => {
                write!(f, "<")?;
                if mods.contains(ModMask::CTRL) {
                    write!(f, "C-")?;
                }
                if mods.contains(ModMask::ALT) {
                    write!(f, "A-")?;
                }
                if mods.contains(ModMask::SHIFT) {
                    write!(f, "S-")?;
                }
                if mods.contains(ModMask::META) {
                    write!(f, "M-")?;
                }
                match &**base {
                    KeyToken::Char(c) => write!(f, "{c}")?,
                    other => {
                        // Named bases render without their own brackets inside a chord.
                        let inner = other.to_string();
                        write!(f, "{}", inner.trim_start_matches('<').trim_end_matches('>'))?;
                    }
                }
                write!(f, ">")
            }
        }
    }
}

/// Render a token slice the way a status line shows a pending sequence.
pub fn render_sequence(tokens: &[KeyToken]) -> String {
    tokens.iter().map(|t| t.to_string()).collect()
}
