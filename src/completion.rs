//! Identifier completion against the static built-in dictionary.

use crate::builtins::BUILTINS;
use std::sync::OnceLock;
use tracing::{debug, warn};

static BUILTIN_COMPLETER: OnceLock<Completer> = OnceLock::new();

/// Stripped in this order to isolate the identifier before the cursor
const SEPARATORS: [char; 3] = ['\n', ';', ' '];

/// Sorts after every character a dictionary entry can continue with
const PREFIX_END: char = char::MAX;

/// Matches and the character range they replace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReply {
    pub matches: Vec<String>,
    pub cursor_start: usize,
    pub cursor_end: usize,
}

impl CompletionReply {
    fn empty(cursor_pos: usize) -> Self {
        Self {
            matches: Vec::new(),
            cursor_start: cursor_pos,
            cursor_end: cursor_pos,
        }
    }
}

/// Sorted, deduplicated completion dictionary
#[derive(Debug, Clone)]
pub struct Completer {
    words: Vec<String>,
}

impl Completer {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut words: Vec<String> = words.into_iter().map(Into::into).collect();
        words.sort();
        words.dedup();
        Self { words }
    }

    /// The gp built-in dictionary, built on first use
    pub fn builtins() -> &'static Completer {
        BUILTIN_COMPLETER.get_or_init(|| Completer::new(BUILTINS.iter().copied()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Complete the identifier ending at `cursor_pos` (in characters)
    pub fn complete(&self, code: &str, cursor_pos: usize) -> CompletionReply {
        let Some(head) = text_before_cursor(code, cursor_pos) else {
            warn!(
                "Completion cursor {} is past the end of {} characters",
                cursor_pos,
                code.chars().count()
            );
            return CompletionReply::empty(cursor_pos);
        };

        let token = trailing_token(head);
        if token.is_empty() {
            return CompletionReply::empty(cursor_pos);
        }

        let upper = format!("{}{}", token, PREFIX_END);
        let start = self.words.partition_point(|w| w.as_str() < token);
        let end = start + self.words[start..].partition_point(|w| *w < upper);
        let matches = self.words[start..end].to_vec();
        debug!("{} completions for {:?}", matches.len(), token);

        CompletionReply {
            matches,
            cursor_start: cursor_pos - token.chars().count(),
            cursor_end: cursor_pos,
        }
    }
}

fn text_before_cursor(code: &str, cursor_pos: usize) -> Option<&str> {
    match code.char_indices().nth(cursor_pos) {
        Some((offset, _)) => Some(&code[..offset]),
        None if code.chars().count() == cursor_pos => Some(code),
        None => None,
    }
}

fn trailing_token(head: &str) -> &str {
    SEPARATORS.iter().fold(head, |token, &sep| {
        token.rsplit_once(sep).map_or(token, |(_, tail)| tail)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor_family() -> Completer {
        Completer::new(["factormod", "factorial", "sqrt", "factorback", "factor"])
    }

    #[test]
    fn test_prefix_matches_sorted() {
        let reply = factor_family().complete("factor", 6);
        assert_eq!(
            reply.matches,
            vec!["factor", "factorback", "factorial", "factormod"]
        );
        assert_eq!(reply.cursor_start, 0);
        assert_eq!(reply.cursor_end, 6);
    }

    #[test]
    fn test_longer_prefix_narrows() {
        let reply = factor_family().complete("factori", 7);
        assert_eq!(reply.matches, vec!["factorial"]);
        assert_eq!((reply.cursor_start, reply.cursor_end), (0, 7));
    }

    #[test]
    fn test_trailing_separator_yields_nothing() {
        let reply = factor_family().complete("x = ", 4);
        assert!(reply.matches.is_empty());
        assert_eq!((reply.cursor_start, reply.cursor_end), (4, 4));
    }

    #[test]
    fn test_token_after_separators() {
        let completer = factor_family();

        let reply = completer.complete("a = 1;\nb = sq", 13);
        assert_eq!(reply.matches, vec!["sqrt"]);
        assert_eq!((reply.cursor_start, reply.cursor_end), (11, 13));

        let reply = completer.complete("x;factorb", 9);
        assert_eq!(reply.matches, vec!["factorback"]);
        assert_eq!(reply.cursor_start, 2);
    }

    #[test]
    fn test_cursor_in_middle_of_text() {
        let reply = factor_family().complete("sq(2) + 1", 2);
        assert_eq!(reply.matches, vec!["sqrt"]);
        assert_eq!((reply.cursor_start, reply.cursor_end), (0, 2));
    }

    #[test]
    fn test_cursor_counts_characters() {
        let reply = factor_family().complete("é = fact", 8);
        assert_eq!(reply.matches.len(), 4);
        assert_eq!((reply.cursor_start, reply.cursor_end), (4, 8));
    }

    #[test]
    fn test_cursor_past_end_is_recovered() {
        let reply = factor_family().complete("fact", 40);
        assert!(reply.matches.is_empty());
        assert_eq!((reply.cursor_start, reply.cursor_end), (40, 40));
    }

    #[test]
    fn test_unknown_token_has_no_matches() {
        let reply = factor_family().complete("zzz", 3);
        assert!(reply.matches.is_empty());
        assert_eq!((reply.cursor_start, reply.cursor_end), (0, 3));
    }

    #[test]
    fn test_builtin_table_is_sorted() {
        assert!(BUILTINS.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(Completer::builtins().len(), BUILTINS.len());
    }

    #[test]
    fn test_builtins_complete_factor_functions() {
        let reply = Completer::builtins().complete("factorb", 7);
        assert_eq!(reply.matches, vec!["factorback"]);

        let reply = Completer::builtins().complete("print(factormod", 15);
        assert!(reply.matches.is_empty());
        let reply = Completer::builtins().complete("print( factormod", 16);
        assert_eq!(reply.matches, vec!["factormod", "factormodDDF", "factormodSQF"]);
    }
}
