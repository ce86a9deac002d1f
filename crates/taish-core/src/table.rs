// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Context-scoped command registry with incremental line resolution.
// Author: Lukas Bower

//! Context-scoped command registry with incremental line resolution.
//!
//! Resolution walks a tokenised line left to right. Every position is probed
//! with the full already-expanded prefix, so the domain of a later argument
//! can depend on what an earlier one resolved to.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use crate::candidate::{candidate_texts, Candidate};
use crate::completer::{Completer, CompletionMode};
use crate::error::InvalidInput;

/// A registered command: its handler and optional argument completer.
pub struct CommandEntry<H> {
    name: String,
    handler: H,
    completer: Option<Box<dyn Completer>>,
}

impl<H> CommandEntry<H> {
    /// Command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handler invoked when the command is executed.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Argument completer; `None` means trailing arguments are opaque.
    #[must_use]
    pub fn completer(&self) -> Option<&dyn Completer> {
        self.completer.as_deref()
    }
}

/// A fully expanded line and the handler it dispatches to.
pub struct Resolved<'a, H> {
    /// Handler of the resolved command.
    pub handler: &'a H,
    /// Exact command name.
    pub command: String,
    /// Expanded argument tokens following the command.
    pub args: Vec<String>,
}

/// Ordered mapping from command name to [`CommandEntry`].
pub struct CommandTable<H> {
    entries: Vec<CommandEntry<H>>,
}

impl<H> Default for CommandTable<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> CommandTable<H> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, replacing any existing entry in place.
    pub fn add_command(
        &mut self,
        name: impl Into<String>,
        handler: H,
        completer: Option<Box<dyn Completer>>,
    ) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.handler = handler;
            entry.completer = completer;
            return;
        }
        self.entries.push(CommandEntry {
            name,
            handler,
            completer,
        });
    }

    /// Remove `name`, returning its handler.
    pub fn remove_command(&mut self, name: &str) -> Option<H> {
        let index = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(index).handler)
    }

    /// Look up an entry by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CommandEntry<H>> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Registered command names in registration order.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidates for the next token of a partially typed line.
    ///
    /// While the command name is still being typed this offers every command
    /// with the typed prefix, except that an empty interactive request yields
    /// nothing. Once a command is followed by whitespace the remaining text is
    /// handed to that command's completer.
    #[must_use]
    pub fn completion(&self, text: &str, mode: CompletionMode) -> Vec<Candidate> {
        let text = text.trim_start();
        if mode == CompletionMode::Interactive && text.is_empty() {
            return Vec::new();
        }
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let trailing = text.ends_with(char::is_whitespace);

        if tokens.is_empty() || (tokens.len() == 1 && !trailing) {
            return self
                .entries
                .iter()
                .filter(|e| e.name.starts_with(text))
                .map(|e| Candidate::new(e.name.clone(), text.len()))
                .collect();
        }

        let first = tokens[0];
        let Ok(resolved) = self.complete_input(vec![first.to_string()]) else {
            return Vec::new();
        };
        let Some(completer) = resolved
            .first()
            .and_then(|name| self.get(name))
            .and_then(CommandEntry::completer)
        else {
            return Vec::new();
        };
        completer.complete(text[first.len()..].trim_start())
    }

    /// Expand every token of `tokens` to its unique candidate.
    ///
    /// A token that prefixes several candidates is accepted only when it
    /// equals one of them. Positions with no candidates are passed through
    /// verbatim when the command has no completer, or when its completer has
    /// nothing to offer there even for empty input.
    pub fn complete_input(&self, mut tokens: Vec<String>) -> Result<Vec<String>, InvalidInput> {
        if tokens.is_empty() {
            return Err(InvalidInput::invalid_command(self.commands()));
        }

        for i in 0..tokens.len() {
            let probe = tokens[..=i].join(" ");
            let mut candidates = self.completion(&probe, CompletionMode::Probe);

            match candidates.len() {
                0 => {
                    if i == 0 {
                        return Err(InvalidInput::invalid_command(self.commands()));
                    }
                    let has_completer = self
                        .get(&tokens[0])
                        .and_then(CommandEntry::completer)
                        .is_some();
                    if !has_completer {
                        continue;
                    }
                    let lookahead = format!("{} ", tokens[..i].join(" "));
                    let expected = self.completion(&lookahead, CompletionMode::Probe);
                    if expected.is_empty() {
                        continue;
                    }
                    return Err(InvalidInput::invalid_argument(candidate_texts(&expected)));
                }
                1 => {
                    if let Some(only) = candidates.pop() {
                        tokens[i] = only.text;
                    }
                }
                _ => {
                    if !candidates.iter().any(|c| c.text == tokens[i]) {
                        return Err(InvalidInput::ambiguous(i, candidate_texts(&candidates)));
                    }
                }
            }
        }
        Ok(tokens)
    }

    /// Expand a raw whitespace-delimited line and look up its handler.
    pub fn resolve(&self, line: &str) -> Result<Resolved<'_, H>, InvalidInput> {
        let tokens: Vec<String> = line.split_whitespace().map(ToString::to_string).collect();
        let mut expanded = self.complete_input(tokens)?.into_iter();
        let command = expanded.next().unwrap_or_default();
        let entry = self
            .get(&command)
            .ok_or_else(|| InvalidInput::invalid_command(self.commands()))?;
        Ok(Resolved {
            handler: &entry.handler,
            command,
            args: expanded.collect(),
        })
    }

    /// Describe what the last typed token resolves to, or what could follow.
    ///
    /// A line ending in whitespace asks about the next, not yet typed,
    /// argument. Resolution failures are rendered as a comma-separated
    /// candidate list instead of being returned.
    #[must_use]
    pub fn help(&self, text: &str) -> String {
        let text = text.trim_start();
        let mut tokens: Vec<String> = text.split_whitespace().map(ToString::to_string).collect();
        if text.ends_with(char::is_whitespace) {
            tokens.push(" ".to_string());
        }
        match self.complete_input(tokens) {
            Ok(line) => line
                .last()
                .map(|token| token.trim().to_string())
                .unwrap_or_default(),
            Err(err) => err.into_candidates().join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::ArgumentCompleter;
    use crate::attribute::AttributeDescriptor;
    use crate::completer::WordCompleter;
    use crate::error::InvalidInputKind;
    use alloc::rc::Rc;

    fn table() -> CommandTable<u8> {
        let attrs: Rc<[AttributeDescriptor]> = Rc::from(vec![
            AttributeDescriptor::new("fec-type", false, "[rs|fc|none]"),
            AttributeDescriptor::new("oper-status", true, "[unknown|ready]"),
        ]);
        let mut table = CommandTable::new();
        table.add_command("quit", 0, None);
        table.add_command("list", 1, None);
        table.add_command("list-attr", 2, Some(Box::new(WordCompleter::new(["simple"]))));
        table.add_command("get", 3, Some(Box::new(ArgumentCompleter::for_get(Rc::clone(&attrs)))));
        table.add_command("set", 4, Some(Box::new(ArgumentCompleter::for_set(attrs))));
        table
    }

    fn line(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn interactive_empty_request_is_silent() {
        let table = table();
        assert!(table.completion("", CompletionMode::Interactive).is_empty());
        assert_eq!(table.completion("", CompletionMode::Probe).len(), 5);
    }

    #[test]
    fn command_completion_filters_by_prefix() {
        let table = table();
        let found = table.completion("li", CompletionMode::Interactive);
        assert_eq!(candidate_texts(&found), ["list", "list-attr"]);
        assert_eq!(found[0].replace, 2);
    }

    #[test]
    fn argument_completion_delegates_after_command() {
        let table = table();
        let found = table.completion("se fec-type f", CompletionMode::Interactive);
        assert_eq!(candidate_texts(&found), ["fc"]);
        assert!(table.completion("quit x", CompletionMode::Interactive).is_empty());
        assert!(table.completion("lis x", CompletionMode::Interactive).is_empty());
    }

    #[test]
    fn exact_match_breaks_ties() {
        let table = table();
        assert_eq!(table.complete_input(line(&["list"])).unwrap(), ["list"]);
        let err = table.complete_input(line(&["lis"])).unwrap_err();
        assert_eq!(err.kind(), InvalidInputKind::AmbiguousCommand);
        assert_eq!(err.candidates(), ["list", "list-attr"]);
    }

    #[test]
    fn prefixes_expand_to_full_tokens() {
        let table = table();
        assert_eq!(
            table.complete_input(line(&["se", "fec", "f"])).unwrap(),
            ["set", "fec-type", "fc"]
        );
    }

    #[test]
    fn empty_line_is_an_invalid_command() {
        let err = table().complete_input(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), InvalidInputKind::InvalidCommand);
        assert_eq!(err.candidates().len(), 5);
    }

    #[test]
    fn enumerable_slot_rejects_unknown_values() {
        let err = table()
            .complete_input(line(&["set", "fec-type", "bogus"]))
            .unwrap_err();
        assert_eq!(err.kind(), InvalidInputKind::InvalidArgument);
        assert_eq!(err.candidates(), ["rs", "fc", "none"]);
    }

    #[test]
    fn read_only_attribute_is_rejected_for_set() {
        let err = table()
            .complete_input(line(&["set", "oper-status", "ready"]))
            .unwrap_err();
        assert_eq!(err.kind(), InvalidInputKind::InvalidArgument);
        assert_eq!(err.candidates(), ["fec-type"]);
    }

    #[test]
    fn help_reports_next_candidates() {
        let table = table();
        assert_eq!(table.help("set fec-type "), "rs, fc, none");
        assert_eq!(table.help("set fec"), "fec-type");
        assert_eq!(table.help("li"), "list, list-attr");
        assert_eq!(table.help(""), "quit, list, list-attr, get, set");
    }

    #[test]
    fn re_adding_a_command_keeps_its_position() {
        let mut table = table();
        table.add_command("list", 9, None);
        assert_eq!(table.commands()[1], "list");
        assert_eq!(*table.get("list").unwrap().handler(), 9);
        assert_eq!(table.get("list").unwrap().name(), "list");
        assert_eq!(table.len(), 5);
        assert_eq!(table.remove_command("list"), Some(9));
        assert!(table.get("list").is_none());
        assert_eq!(table.len(), 4);
        assert!(!table.is_empty());
        assert!(CommandTable::<u8>::new().is_empty());
    }

    #[test]
    fn resolve_splits_command_from_arguments() {
        let table = table();
        let resolved = table.resolve("  get   oper ").unwrap();
        assert_eq!(*resolved.handler, 3);
        assert_eq!(resolved.command, "get");
        assert_eq!(resolved.args, ["oper-status"]);
    }
}
