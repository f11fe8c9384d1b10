//! Word-level diff for long-form content (greedy, bounded lookahead).
//!
//! Text is split into alternating runs of whitespace and non-whitespace, and
//! both kinds of run are kept as tokens so concatenating token text rebuilds
//! the input byte for byte.
//!
//! The walk is a two-pointer scan. On a mismatch it peeks at most
//! [`LOOKAHEAD`] tokens ahead on each side to tell an insertion or deletion
//! apart from a substitution. This is intentionally not a minimal edit
//! script: a word moved further than the window shows up as a
//! removed/added pair. Work per token is bounded by the window, so the whole
//! diff is linear in the token count.

use serde::{Deserialize, Serialize};

/// How many tokens ahead a mismatched token is searched for.
pub const LOOKAHEAD: usize = 5;

/// Classification of a token in a word diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Unchanged,
    Added,
    Removed,
}

/// A single token in a word diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffToken {
    pub kind: TokenKind,
    pub text: String,
}

impl DiffToken {
    fn new(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// Split text into whitespace and non-whitespace runs.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut prev_space: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        if prev_space.is_some_and(|prev| prev != is_space) {
            tokens.push(&text[start..idx]);
            start = idx;
        }
        prev_space = Some(is_space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Compute the word diff of `old` against `new`.
pub fn diff_words(old: &str, new: &str) -> Vec<DiffToken> {
    let old_tokens = tokenize(old);
    let new_tokens = tokenize(new);
    let mut result = Vec::with_capacity(old_tokens.len().max(new_tokens.len()));

    let (mut i, mut j) = (0, 0);
    while i < old_tokens.len() && j < new_tokens.len() {
        let (o, n) = (old_tokens[i], new_tokens[j]);
        if o == n {
            result.push(DiffToken::new(TokenKind::Unchanged, o));
            i += 1;
            j += 1;
        } else if appears_within(&new_tokens[j..], o) {
            // The old token shows up again shortly: `n` was inserted.
            result.push(DiffToken::new(TokenKind::Added, n));
            j += 1;
        } else if appears_within(&old_tokens[i..], n) {
            result.push(DiffToken::new(TokenKind::Removed, o));
            i += 1;
        } else {
            result.push(DiffToken::new(TokenKind::Removed, o));
            result.push(DiffToken::new(TokenKind::Added, n));
            i += 1;
            j += 1;
        }
    }

    result.extend(
        old_tokens[i..]
            .iter()
            .map(|t| DiffToken::new(TokenKind::Removed, t)),
    );
    result.extend(
        new_tokens[j..]
            .iter()
            .map(|t| DiffToken::new(TokenKind::Added, t)),
    );
    result
}

fn appears_within(haystack: &[&str], needle: &str) -> bool {
    haystack.iter().take(LOOKAHEAD).any(|t| *t == needle)
}

/// Rebuild the old text from unchanged + removed tokens.
pub fn reconstruct_old(tokens: &[DiffToken]) -> String {
    tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Added)
        .map(|t| t.text.as_str())
        .collect()
}

/// Rebuild the new text from unchanged + added tokens.
pub fn reconstruct_new(tokens: &[DiffToken]) -> String {
    tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Removed)
        .map(|t| t.text.as_str())
        .collect()
}

/// Word counts per token kind, whitespace runs excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}

impl DiffStats {
    pub fn from_tokens(tokens: &[DiffToken]) -> Self {
        tokens
            .iter()
            .filter(|t| !t.is_whitespace())
            .fold(Self::default(), |mut acc, t| {
                match t.kind {
                    TokenKind::Added => acc.added += 1,
                    TokenKind::Removed => acc.removed += 1,
                    TokenKind::Unchanged => acc.unchanged += 1,
                }
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[DiffToken]) -> Vec<(TokenKind, &str)> {
        tokens.iter().map(|t| (t.kind, t.text.as_str())).collect()
    }

    fn assert_reconstructs(old: &str, new: &str) {
        let tokens = diff_words(old, new);
        assert_eq!(reconstruct_old(&tokens), old, "old side of {old:?} -> {new:?}");
        assert_eq!(reconstruct_new(&tokens), new, "new side of {old:?} -> {new:?}");
    }

    // -- tokenize ------------------------------------------------------------

    #[test]
    fn tokenize_keeps_whitespace_runs() {
        assert_eq!(
            tokenize("Mix  the\tflour\n"),
            vec!["Mix", "  ", "the", "\t", "flour", "\n"]
        );
    }

    #[test]
    fn tokenize_leading_whitespace_and_empty() {
        assert_eq!(tokenize("  salt"), vec!["  ", "salt"]);
        assert!(tokenize("").is_empty());
    }

    // -- diff_words ----------------------------------------------------------

    #[test]
    fn identical_text_is_all_unchanged() {
        let text = "Knead the dough for ten minutes.\n\nLet it rest.";
        let tokens = diff_words(text, text);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Unchanged));
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn inserted_word_is_added() {
        let tokens = diff_words("The quick fox", "The quick brown fox");
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::Unchanged, "The"),
                (TokenKind::Unchanged, " "),
                (TokenKind::Unchanged, "quick"),
                (TokenKind::Unchanged, " "),
                (TokenKind::Added, "brown"),
                (TokenKind::Added, " "),
                (TokenKind::Unchanged, "fox"),
            ]
        );
    }

    #[test]
    fn deleted_word_is_removed() {
        let tokens = diff_words("The quick brown fox", "The quick fox");
        let removed: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Removed)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(removed, vec!["brown", " "]);
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Added));
    }

    #[test]
    fn replaced_word_is_substitution_pair() {
        let tokens = diff_words("red car", "blue car");
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::Removed, "red"),
                (TokenKind::Added, "blue"),
                (TokenKind::Unchanged, " "),
                (TokenKind::Unchanged, "car"),
            ]
        );
    }

    #[test]
    fn empty_old_is_all_added() {
        let tokens = diff_words("", "fresh basil");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Added));
    }

    #[test]
    fn empty_new_is_all_removed() {
        let tokens = diff_words("fresh basil", "");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Removed));
    }

    #[test]
    fn both_empty_is_empty() {
        assert!(diff_words("", "").is_empty());
    }

    #[test]
    fn word_moved_beyond_window_becomes_substitutions() {
        let tokens = diff_words("alpha b c d e f", "f b c d e alpha");
        assert_eq!(tokens[0], DiffToken::new(TokenKind::Removed, "alpha"));
        assert_eq!(tokens[1], DiffToken::new(TokenKind::Added, "f"));
        assert_reconstructs("alpha b c d e f", "f b c d e alpha");
    }

    #[test]
    fn both_sides_reconstruct_for_realistic_edits() {
        assert_reconstructs(
            "<p>Preheat the oven to 180C.</p>\n<p>Grease the tin.</p>",
            "<p>Preheat the oven to 200C and grease the tin.</p>",
        );
        assert_reconstructs("one two three", "three two one");
        assert_reconstructs("  leading space", "leading space  ");
        assert_reconstructs("a b c d e f g h i j", "a x c y e z g h");
        assert_reconstructs("Sauté the oignons", "Sauté les oignons doucement");
    }

    // -- DiffStats -----------------------------------------------------------

    #[test]
    fn stats_ignore_whitespace_tokens() {
        let tokens = diff_words("The quick fox", "The quick brown fox");
        let stats = DiffStats::from_tokens(&tokens);
        assert_eq!(
            stats,
            DiffStats {
                added: 1,
                removed: 0,
                unchanged: 3
            }
        );
    }
}
