// src/core/completion.rs

//! Completion candidates and how close the typed text is to them.

use crate::core::trie::{Trie, fold_word};
use serde::Serialize;
use std::collections::BTreeMap;

/// What a completion candidate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    /// A child directory.
    Directory,
    /// A command of a directory, or a global one.
    Command,
    /// An unbound parameter name, offered as `name=`.
    ParamName,
    /// A value of the current parameter.
    ParamValue,
}

/// How far the typed text is from a single candidate. A UI uses this to decide whether
/// it may auto-append a separator (only for `Exact`) or fill in text (`Partial`,
/// `Ambiguous` with a longer common prefix).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CompletionState {
    /// No candidate at all.
    NoMatch,
    /// Exactly one candidate, and the typed text already spells it.
    Exact {
        /// The candidate, in its defined spelling.
        word: String,
    },
    /// Exactly one candidate that still needs more typing.
    Partial {
        /// The candidate, in its defined spelling.
        word: String,
    },
    /// Several candidates sharing `common_prefix`.
    Ambiguous {
        /// Longest prefix shared by every candidate.
        common_prefix: String,
    },
}

/// Completion candidates for the token under the cursor.
///
/// `replace_prefix` is the part of the token that stays as typed (a directory path like
/// `net/` or a parameter name like `host=`); `typed` is the part being completed and every
/// candidate word starts with it.
#[derive(Debug, Clone, Default)]
pub struct Suggestions {
    replace_prefix: String,
    typed: String,
    candidates: Trie<CompletionKind>,
}

impl Suggestions {
    /// Candidates for `typed`, shown behind `replace_prefix`.
    pub fn new(
        replace_prefix: impl Into<String>,
        typed: impl Into<String>,
        candidates: Trie<CompletionKind>,
    ) -> Self {
        Self {
            replace_prefix: replace_prefix.into(),
            typed: typed.into(),
            candidates,
        }
    }

    /// No candidate for `typed`.
    pub fn empty(typed: impl Into<String>) -> Self {
        Self::new(String::new(), typed, Trie::new())
    }

    /// The part of the token that stays as typed.
    pub fn replace_prefix(&self) -> &str {
        &self.replace_prefix
    }

    /// The part of the token being completed.
    pub fn typed(&self) -> &str {
        &self.typed
    }

    /// Every candidate word with its kind.
    pub fn candidates(&self) -> &Trie<CompletionKind> {
        &self.candidates
    }

    /// Whether there is no candidate.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Prepends text that stays in front of the replaced part, e.g. `name=`.
    pub fn with_outer_prefix(mut self, prefix: &str) -> Self {
        self.replace_prefix.insert_str(0, prefix);
        self
    }

    /// Unites the candidates of both. When one side is empty the other is returned
    /// untouched; otherwise the prefixes of `self` are kept.
    pub fn merge(self, other: Self) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        let candidates = self.candidates.union(&other.candidates);
        Self { candidates, ..self }
    }

    /// Candidate words grouped by kind, for display.
    pub fn grouped(&self) -> BTreeMap<CompletionKind, Vec<&str>> {
        let mut groups: BTreeMap<CompletionKind, Vec<&str>> = BTreeMap::new();
        for (word, kind) in self.candidates.entries() {
            groups.entry(*kind).or_default().push(word);
        }
        groups
    }

    /// Candidate words of one kind, in trie order.
    pub fn by_kind(&self, kind: CompletionKind) -> Vec<&str> {
        self.candidates
            .entries()
            .into_iter()
            .filter(|(_, k)| **k == kind)
            .map(|(word, _)| word)
            .collect()
    }

    /// The candidates as complete token texts (`replace_prefix` + word).
    pub fn full_candidates(&self) -> Vec<String> {
        self.candidates
            .words()
            .into_iter()
            .map(|word| format!("{}{}", self.replace_prefix, word))
            .collect()
    }

    /// Classifies the candidates against the typed text.
    pub fn state(&self) -> CompletionState {
        if let Some((word, _)) = self.candidates.single() {
            return if fold_word(word) == fold_word(&self.typed) {
                CompletionState::Exact {
                    word: word.to_string(),
                }
            } else {
                CompletionState::Partial {
                    word: word.to_string(),
                }
            };
        }
        if self.candidates.is_empty() {
            CompletionState::NoMatch
        } else {
            CompletionState::Ambiguous {
                common_prefix: self.candidates.longest_common_prefix(),
            }
        }
    }
}

// MARK: --- UNIT TESTS ---
