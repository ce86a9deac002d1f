// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Completion candidate shared by every completer.
// Author: Lukas Bower

//! Completion candidate shared by every completer.

use alloc::string::String;
use alloc::vec::Vec;

/// One valid completion for the token under the cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Literal replacement text.
    pub text: String,
    /// Number of bytes before the cursor replaced by `text`.
    pub replace: usize,
}

impl Candidate {
    /// Build a candidate replacing `replace` bytes of partial input.
    pub fn new(text: impl Into<String>, replace: usize) -> Self {
        Self {
            text: text.into(),
            replace,
        }
    }
}

/// Collect the literal texts of a candidate list, preserving order.
#[must_use]
pub fn candidate_texts(candidates: &[Candidate]) -> Vec<String> {
    candidates.iter().map(|c| c.text.clone()).collect()
}
