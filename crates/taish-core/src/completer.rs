// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Completer capability and the general-purpose word completers.
// Author: Lukas Bower

//! Completer capability and the general-purpose word completers.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::candidate::Candidate;

/// Who is asking for completions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionMode {
    /// A live request from the line editor.
    Interactive,
    /// A programmatic probe issued while validating a full line.
    Probe,
}

/// Enumerates valid next-token candidates for partial input.
///
/// `text` is everything typed after the command keyword, with leading
/// whitespace removed. Candidates are returned in source order.
pub trait Completer {
    /// Produce the candidates for `text`.
    fn complete(&self, text: &str) -> Vec<Candidate>;
}

/// Return the word under the cursor: empty after trailing whitespace.
#[must_use]
pub fn word_before_cursor(text: &str) -> &str {
    if text.ends_with(char::is_whitespace) {
        return "";
    }
    text.split_whitespace().next_back().unwrap_or("")
}

enum WordSource {
    Fixed(Vec<String>),
    Dynamic(Box<dyn Fn() -> Vec<String>>),
}

/// Completes the word under the cursor from a word list.
pub struct WordCompleter {
    source: WordSource,
}

impl WordCompleter {
    /// Complete from a fixed list.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: WordSource::Fixed(words.into_iter().map(Into::into).collect()),
        }
    }

    /// Complete from a list recomputed on every request.
    pub fn dynamic<F>(source: F) -> Self
    where
        F: Fn() -> Vec<String> + 'static,
    {
        Self {
            source: WordSource::Dynamic(Box::new(source)),
        }
    }

    fn words(&self) -> Vec<String> {
        match &self.source {
            WordSource::Fixed(words) => words.clone(),
            WordSource::Dynamic(source) => source(),
        }
    }
}

impl Completer for WordCompleter {
    fn complete(&self, text: &str) -> Vec<Candidate> {
        let word = word_before_cursor(text);
        self.words()
            .into_iter()
            .filter(|candidate| candidate.starts_with(word))
            .map(|candidate| Candidate::new(candidate, word.len()))
            .collect()
    }
}

/// Completes a first word from a fixed set, then hands the rest of the line to
/// the completer registered for that word, if any.
#[derive(Default)]
pub struct NestedCompleter {
    options: Vec<(String, Option<Box<dyn Completer>>)>,
}

impl NestedCompleter {
    /// Create an empty nested completer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a first word with no nested completion.
    #[must_use]
    pub fn word(mut self, name: &str) -> Self {
        self.options.push((name.to_string(), None));
        self
    }

    /// Add a first word whose remainder is completed by `completer`.
    #[must_use]
    pub fn nested(mut self, name: &str, completer: Box<dyn Completer>) -> Self {
        self.options.push((name.to_string(), Some(completer)));
        self
    }
}

impl Completer for NestedCompleter {
    fn complete(&self, text: &str) -> Vec<Candidate> {
        let text = text.trim_start();
        if text.contains(char::is_whitespace) {
            let first = text.split_whitespace().next().unwrap_or("");
            let nested = self
                .options
                .iter()
                .find(|(name, _)| name == first)
                .and_then(|(_, completer)| completer.as_deref());
            return match nested {
                Some(completer) => completer.complete(text[first.len()..].trim_start()),
                None => Vec::new(),
            };
        }
        self.options
            .iter()
            .filter(|(name, _)| name.starts_with(text))
            .map(|(name, _)| Candidate::new(name.clone(), text.len()))
            .collect()
    }
}
