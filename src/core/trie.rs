// src/core/trie.rs

//! # Case-Insensitive Trie
//!
//! An immutable prefix tree mapping words to values. Every level is keyed by the
//! lower-cased character, so `get("LS")` finds the word `"ls"`, while the original
//! spelling of each word is kept at its word-end node for display.
//!
//! Tries are never mutated after `TrieBuilder::build`. Every derived trie
//! (`sub_trie`, `union`, `map_values`) is a fresh structure.

use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Words a [`TrieBuilder`] rejects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrieError {
    /// The empty string is not a word.
    #[error("Trie words must not be empty.")]
    EmptyWord,
    /// The word, compared case-insensitively, is already present.
    #[error("Word '{word}' was already added to the trie.")]
    DuplicateWord {
        /// The rejected spelling.
        word: String,
    },
}

/// Lower-cases a single character. Characters whose lower-case form expands to
/// several code points keep their first one.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Folds a word the way trie lookups compare it.
pub(crate) fn fold_word(word: &str) -> String {
    word.chars().map(fold).collect()
}

#[derive(Debug, Clone)]
struct TrieNode<T> {
    /// The original word and its value. A node is a word end iff this is `Some`.
    entry: Option<(String, T)>,
    children: BTreeMap<char, TrieNode<T>>,
}

impl<T> TrieNode<T> {
    fn empty() -> Self {
        Self {
            entry: None,
            children: BTreeMap::new(),
        }
    }

    /// Looks up a child with a lower-then-upper case fallback.
    fn child(&self, c: char) -> Option<&Self> {
        self.children.get(&fold(c)).or_else(|| {
            c.to_uppercase()
                .next()
                .and_then(|upper| self.children.get(&upper))
        })
    }

    fn count(&self) -> usize {
        usize::from(self.entry.is_some()) + self.children.values().map(Self::count).sum::<usize>()
    }

    fn collect<'a>(&'a self, out: &mut Vec<(&'a str, &'a T)>) {
        if let Some((word, value)) = &self.entry {
            out.push((word.as_str(), value));
        }
        for child in self.children.values() {
            child.collect(out);
        }
    }

    fn map<U>(&self, f: &mut impl FnMut(&T) -> U) -> TrieNode<U> {
        TrieNode {
            entry: self
                .entry
                .as_ref()
                .map(|(word, value)| (word.clone(), f(value))),
            children: self
                .children
                .iter()
                .map(|(key, child)| (*key, child.map(f)))
                .collect(),
        }
    }
}

impl<T: Clone> TrieNode<T> {
    /// Merges `other` into `self`. On a shared word, `other`'s entry wins.
    fn merge(mut self, other: &Self) -> Self {
        if let Some(entry) = &other.entry {
            self.entry = Some(entry.clone());
        }
        for (key, other_child) in &other.children {
            let merged = match self.children.remove(key) {
                Some(own_child) => own_child.merge(other_child),
                None => other_child.clone(),
            };
            self.children.insert(*key, merged);
        }
        self
    }
}

/// An immutable, case-insensitive prefix tree.
#[derive(Debug, Clone)]
pub struct Trie<T> {
    root: TrieNode<T>,
    len: usize,
}

impl<T> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Trie<T> {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Self {
            root: TrieNode::empty(),
            len: 0,
        }
    }

    /// Returns a builder that accumulates words before compiling them into a trie.
    pub fn builder() -> TrieBuilder<T> {
        TrieBuilder::new()
    }

    /// The number of words stored in this trie.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the trie holds no word.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn node(&self, prefix: &str) -> Option<&TrieNode<T>> {
        prefix
            .chars()
            .try_fold(&self.root, |node, c| node.child(c))
    }

    /// Point lookup, case-insensitive.
    pub fn get(&self, word: &str) -> Option<&T> {
        self.get_entry(word).map(|(_, value)| value)
    }

    /// Like `get`, but also returns the word as it was originally spelled.
    pub fn get_entry(&self, word: &str) -> Option<(&str, &T)> {
        if word.is_empty() {
            return None;
        }
        self.node(word)
            .and_then(|node| node.entry.as_ref())
            .map(|(w, value)| (w.as_str(), value))
    }

    /// Whether `word` is stored, case-insensitively.
    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    /// All `(word, value)` pairs, ordered by their lower-cased spelling.
    pub fn entries(&self) -> Vec<(&str, &T)> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect(&mut out);
        out
    }

    /// All words, ordered by their lower-cased spelling.
    pub fn words(&self) -> Vec<&str> {
        self.entries().into_iter().map(|(word, _)| word).collect()
    }

    /// Returns the single `(word, value)` pair if this trie holds exactly one word.
    pub fn single(&self) -> Option<(&str, &T)> {
        if self.len != 1 {
            return None;
        }
        self.entries().into_iter().next()
    }

    /// The longest prefix shared by every word, spelled like the first word.
    /// Empty when the trie is empty.
    pub fn longest_common_prefix(&self) -> String {
        let mut depth = 0;
        let mut node = &self.root;
        while node.entry.is_none() && node.children.len() == 1 {
            match node.children.values().next() {
                Some(child) => {
                    node = child;
                    depth += 1;
                }
                None => break,
            }
        }
        self.entries()
            .first()
            .map(|(word, _)| word.chars().take(depth).collect())
            .unwrap_or_default()
    }

    /// Produces a trie with the same words whose values are transformed by `f`.
    pub fn map_values<U>(&self, mut f: impl FnMut(&T) -> U) -> Trie<U> {
        Trie {
            root: self.root.map(&mut f),
            len: self.len,
        }
    }
}

impl<T: Clone> Trie<T> {
    /// Returns a trie containing exactly the words that start with `prefix`
    /// (case-insensitively). The result may be empty.
    pub fn sub_trie(&self, prefix: &str) -> Self {
        if prefix.is_empty() {
            return self.clone();
        }

        // Rebuild the chain of keys from the root so that words keep their full spelling.
        let mut keys = Vec::new();
        let mut node = &self.root;
        for c in prefix.chars() {
            let key = fold(c);
            match node.child(c) {
                Some(child) => {
                    let actual_key = if node.children.contains_key(&key) {
                        key
                    } else {
                        c.to_uppercase().next().unwrap_or(key)
                    };
                    keys.push(actual_key);
                    node = child;
                }
                None => return Self::new(),
            }
        }

        let mut rebuilt = node.clone();
        for key in keys.into_iter().rev() {
            let mut parent = TrieNode::empty();
            parent.children.insert(key, rebuilt);
            rebuilt = parent;
        }
        let len = rebuilt.count();
        Self { root: rebuilt, len }
    }

    /// Merges two tries. The word set of the result is the union of both word sets;
    /// for a word present in both, the value (and spelling) of `other` wins.
    pub fn union(&self, other: &Self) -> Self {
        let root = self.root.clone().merge(&other.root);
        let len = root.count();
        Self { root, len }
    }
}

/// Accumulates `word -> value` pairs and compiles them into an immutable `Trie`.
#[derive(Debug)]
pub struct TrieBuilder<T> {
    entries: Vec<(String, T)>,
    seen: HashSet<String>,
}

impl<T> Default for TrieBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TrieBuilder<T> {
    /// An empty builder.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Adds a word, rejecting empty words and case-insensitive duplicates.
    pub fn add(&mut self, word: impl Into<String>, value: T) -> Result<&mut Self, TrieError> {
        let word = word.into();
        if word.is_empty() {
            return Err(TrieError::EmptyWord);
        }
        if !self.seen.insert(fold_word(&word)) {
            return Err(TrieError::DuplicateWord { word });
        }
        self.entries.push((word, value));
        Ok(self)
    }

    /// Adds a word, replacing the value of a previously added duplicate.
    /// Empty words are ignored.
    pub fn insert(&mut self, word: impl Into<String>, value: T) -> &mut Self {
        let word = word.into();
        if word.is_empty() {
            return self;
        }
        let folded = fold_word(&word);
        if self.seen.insert(folded.clone()) {
            self.entries.push((word, value));
        } else if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| fold_word(existing) == folded)
        {
            *slot = (word, value);
        }
        self
    }

    /// Compiles the accumulated words. Runs in O(total characters).
    pub fn build(self) -> Trie<T> {
        let len = self.entries.len();
        let mut root = TrieNode::empty();
        for (word, value) in self.entries {
            let mut node = &mut root;
            for c in word.chars() {
                node = node.children.entry(fold(c)).or_insert_with(TrieNode::empty);
            }
            node.entry = Some((word, value));
        }
        Trie { root, len }
    }
}

impl<S: Into<String>, T> FromIterator<(S, T)> for Trie<T> {
    /// Collects pairs with `TrieBuilder::insert` semantics: later duplicates win.
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        let mut builder = TrieBuilder::new();
        for (word, value) in iter {
            builder.insert(word, value);
        }
        builder.build()
    }
}

// MARK: --- UNIT TESTS ---
