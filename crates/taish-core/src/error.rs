// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Input validation errors raised while resolving command lines.
// Author: Lukas Bower

//! Input validation errors raised while resolving command lines.

use core::fmt;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// Classification of an [`InvalidInput`] failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidInputKind {
    /// The first token matches no registered command.
    InvalidCommand,
    /// An argument matches nothing the command's completer would offer.
    InvalidArgument,
    /// The first token prefixes several commands and equals none of them.
    AmbiguousCommand,
    /// An argument prefixes several candidates and equals none of them.
    AmbiguousArgument,
    /// A command handler rejected the shape of its arguments.
    Usage,
}

/// Local, always recoverable input error carrying the valid candidates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidInput {
    kind: InvalidInputKind,
    message: String,
    candidates: Vec<String>,
}

impl InvalidInput {
    /// No command matched; `commands` lists every registered command.
    #[must_use]
    pub fn invalid_command(commands: Vec<String>) -> Self {
        Self {
            kind: InvalidInputKind::InvalidCommand,
            message: format!("invalid command. available commands: {}", bracketed(&commands)),
            candidates: commands,
        }
    }

    /// An argument matched nothing; `candidates` is what would be valid there.
    #[must_use]
    pub fn invalid_argument(candidates: Vec<String>) -> Self {
        Self {
            kind: InvalidInputKind::InvalidArgument,
            message: format!("invalid argument. candidates: {}", bracketed(&candidates)),
            candidates,
        }
    }

    /// The token at `index` matched several candidates without an exact match.
    #[must_use]
    pub fn ambiguous(index: usize, candidates: Vec<String>) -> Self {
        let (kind, what) = if index == 0 {
            (InvalidInputKind::AmbiguousCommand, "command")
        } else {
            (InvalidInputKind::AmbiguousArgument, "argument")
        };
        Self {
            kind,
            message: format!("ambiguous {what}. candidates: {}", bracketed(&candidates)),
            candidates,
        }
    }

    /// A handler-level usage error such as `usage: get <name>`.
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            kind: InvalidInputKind::Usage,
            message: message.into(),
            candidates: Vec::new(),
        }
    }

    /// Return the failure classification.
    #[must_use]
    pub fn kind(&self) -> InvalidInputKind {
        self.kind
    }

    /// Return the human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Return the candidates valid at the failing position.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Consume the error, keeping only its candidates.
    #[must_use]
    pub fn into_candidates(self) -> Vec<String> {
        self.candidates
    }
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for InvalidInput {}

fn bracketed(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn ambiguity_kind_follows_token_position() {
        let names = vec!["list".to_string(), "list-attr".to_string()];
        assert_eq!(
            InvalidInput::ambiguous(0, names.clone()).kind(),
            InvalidInputKind::AmbiguousCommand
        );
        let err = InvalidInput::ambiguous(2, names);
        assert_eq!(err.kind(), InvalidInputKind::AmbiguousArgument);
        assert_eq!(
            err.to_string(),
            "ambiguous argument. candidates: [list, list-attr]"
        );
    }

    #[test]
    fn usage_errors_carry_no_candidates() {
        let err = InvalidInput::usage("usage: get <name>");
        assert!(err.candidates().is_empty());
        assert_eq!(err.message(), "usage: get <name>");
    }
}
