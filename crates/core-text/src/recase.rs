//! Identifier case conversion backing the coerce operator.
//!
//! Splitting rules:
//! * Whitespace-separated input is tokenized with UAX#29 word boundaries
//!   (`unicode_words`), so punctuation between words is dropped.
//! * Compact identifiers split on `_`, `-` and `.` delimiters and on camel
//!   boundaries: a lowercase/digit followed by an uppercase, or the last
//!   capital of an acronym run followed by a lowercase ("HTTPServer" ->
//!   "http", "server").
//! * Words are carried in lowercase internally; each style re-applies its
//!   own casing on join.

use unicode_segmentation::UnicodeSegmentation;

/// Destination case style a coerce session resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStyle {
    Snake,
    ScreamingSnake,
    Camel,
    Pascal,
    Kebab,
    Dot,
    Title,
    Space,
}

impl CaseStyle {
    /// Stable identifier for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            CaseStyle::Snake => "snake",
            CaseStyle::ScreamingSnake => "screaming-snake",
            CaseStyle::Camel => "camel",
            CaseStyle::Pascal => "pascal",
            CaseStyle::Kebab => "kebab",
            CaseStyle::Dot => "dot",
            CaseStyle::Title => "title",
            CaseStyle::Space => "space",
        }
    }
}

/// Split `input` into lowercase words per the module rules. Empty input
/// yields an empty vec.
pub fn split_words(input: &str) -> Vec<String> {
    if input.chars().any(char::is_whitespace) {
        return input
            .unicode_words()
            .flat_map(split_compact)
            .collect();
    }
    split_compact(input)
}

fn split_compact(token: &str) -> Vec<String> {
    token
        .split(['_', '-', '.'])
        .filter(|s| !s.is_empty())
        .flat_map(split_camel)
        .collect()
}

fn split_camel(token: &str) -> Vec<String> {
    let chars: Vec<char> = token.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        let boundary = i > 0 && c.is_uppercase() && {
            let prev = chars[i - 1];
            prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && chars.get(i + 1).is_some_and(|n| n.is_lowercase()))
        };
        if boundary && !current.is_empty() {
            words.push(current.to_lowercase());
            current.clear();
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current.to_lowercase());
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut graphemes = word.graphemes(true);
    match graphemes.next() {
        Some(first) => first.to_uppercase() + graphemes.as_str(),
        None => String::new(),
    }
}

/// Convert `input` into `style`. Inputs that split into no words (pure
/// delimiter runs) come back unchanged so the caller performs no edit.
pub fn convert(input: &str, style: CaseStyle) -> String {
    let words = split_words(input);
    if words.is_empty() {
        return input.to_string();
    }
    match style {
        CaseStyle::Snake => words.join("_"),
        CaseStyle::ScreamingSnake => words
            .iter()
            .map(|w| w.to_uppercase())
            .collect::<Vec<_>>()
            .join("_"),
        CaseStyle::Kebab => words.join("-"),
        CaseStyle::Dot => words.join("."),
        CaseStyle::Space => words.join(" "),
        CaseStyle::Camel => {
            let mut out = words[0].clone();
            for w in &words[1..] {
                out.push_str(&capitalize(w));
            }
            out
        }
        CaseStyle::Pascal => words.iter().map(|w| capitalize(w)).collect(),
        CaseStyle::Title => words
            .iter()
            .map(|w| capitalize(w))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_snake_and_kebab() {
        assert_eq!(split_words("foo_bar-baz"), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn splits_camel_boundaries() {
        assert_eq!(split_words("fooBarBaz"), vec!["foo", "bar", "baz"]);
        assert_eq!(split_words("HTTPServer"), vec!["http", "server"]);
        assert_eq!(split_words("parseJSON"), vec!["parse", "json"]);
    }

    #[test]
    fn splits_whitespace_phrases() {
        assert_eq!(split_words("hello brave world"), vec!["hello", "brave", "world"]);
        // UAX#29 drops the comma between words.
        assert_eq!(split_words("hello, world"), vec!["hello", "world"]);
    }

    #[test]
    fn digit_starts_new_word_boundary() {
        assert_eq!(split_words("sha256Sum"), vec!["sha256", "sum"]);
    }

    #[test]
    fn convert_matrix() {
        let id = "coerceModeStart";
        assert_eq!(convert(id, CaseStyle::Snake), "coerce_mode_start");
        assert_eq!(convert(id, CaseStyle::ScreamingSnake), "COERCE_MODE_START");
        assert_eq!(convert(id, CaseStyle::Kebab), "coerce-mode-start");
        assert_eq!(convert(id, CaseStyle::Dot), "coerce.mode.start");
        assert_eq!(convert(id, CaseStyle::Space), "coerce mode start");
        assert_eq!(convert(id, CaseStyle::Title), "Coerce Mode Start");
        assert_eq!(convert("coerce_mode_start", CaseStyle::Camel), "coerceModeStart");
        assert_eq!(convert("coerce_mode_start", CaseStyle::Pascal), "CoerceModeStart");
    }

    #[test]
    fn wordless_input_passes_through() {
        assert_eq!(convert("___", CaseStyle::Snake), "___");
        assert_eq!(convert("", CaseStyle::Camel), "");
    }
}
