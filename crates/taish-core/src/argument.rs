// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Two-slot name/value argument completion for attribute commands.
// Author: Lukas Bower

//! Two-slot name/value argument completion for attribute commands.
//!
//! The first slot is a name drawn from a [`SlotSource`], the second a value
//! whose domain depends on the resolved name. Commands of this shape accept
//! at most two arguments.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::attribute::AttributeDescriptor;
use crate::candidate::Candidate;
use crate::completer::Completer;
use crate::value::value_candidates;

/// Supplies the names for the first slot and the values for the second.
pub trait SlotSource {
    /// Names valid in the first slot, in source order.
    fn names(&self) -> Vec<String>;

    /// Values valid in the second slot once the first resolved to `name`.
    fn values(&self, name: &str) -> Vec<String>;
}

/// Attribute names as first slot, usage-derived values as second.
#[derive(Clone)]
pub struct AttributeSlots {
    attributes: Rc<[AttributeDescriptor]>,
    filter: Option<fn(&AttributeDescriptor) -> bool>,
}

impl AttributeSlots {
    /// Offer every attribute.
    #[must_use]
    pub fn all(attributes: Rc<[AttributeDescriptor]>) -> Self {
        Self {
            attributes,
            filter: None,
        }
    }

    /// Offer only attributes that accept writes.
    #[must_use]
    pub fn writable(attributes: Rc<[AttributeDescriptor]>) -> Self {
        Self::filtered(attributes, |attr| !attr.read_only)
    }

    /// Offer only attributes accepted by `filter`.
    #[must_use]
    pub fn filtered(
        attributes: Rc<[AttributeDescriptor]>,
        filter: fn(&AttributeDescriptor) -> bool,
    ) -> Self {
        Self {
            attributes,
            filter: Some(filter),
        }
    }
}

impl SlotSource for AttributeSlots {
    fn names(&self) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|attr| self.filter.map_or(true, |keep| keep(attr)))
            .map(|attr| attr.name.clone())
            .collect()
    }

    fn values(&self, name: &str) -> Vec<String> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| value_candidates(&attr.usage))
            .unwrap_or_default()
    }
}

/// Fixed name list and a value list shared by every name.
#[derive(Clone, Debug, Default)]
pub struct FixedSlots {
    names: Vec<String>,
    values: Vec<String>,
}

impl FixedSlots {
    /// Build from a name list and a value list.
    pub fn new<N, V>(names: N, values: V) -> Self
    where
        N: IntoIterator,
        N::Item: ToString,
        V: IntoIterator,
        V::Item: ToString,
    {
        Self {
            names: names.into_iter().map(|n| n.to_string()).collect(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl SlotSource for FixedSlots {
    fn names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn values(&self, _name: &str) -> Vec<String> {
        self.values.clone()
    }
}

/// Completes `<name> <value>` argument pairs.
pub struct ArgumentCompleter<S> {
    source: S,
    suppress_values: bool,
}

impl<S: SlotSource> ArgumentCompleter<S> {
    /// Complete both slots from `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            suppress_values: false,
        }
    }

    /// Stop offering second-slot values; any value text stays accepted.
    #[must_use]
    pub fn suppress_values(mut self, suppress: bool) -> Self {
        self.suppress_values = suppress;
        self
    }

    fn names_matching(&self, partial: &str) -> Vec<Candidate> {
        self.source
            .names()
            .into_iter()
            .filter(|name| name.starts_with(partial))
            .map(|name| Candidate::new(name, partial.len()))
            .collect()
    }

    /// Resolve a typed first-slot token to exactly one name.
    ///
    /// A unique prefix match wins; among several matches only an exact one
    /// does.
    #[must_use]
    pub fn resolve_name(&self, token: &str) -> Option<String> {
        let mut matches = self.names_matching(token);
        match matches.len() {
            0 => None,
            1 => matches.pop().map(|c| c.text),
            _ => matches
                .into_iter()
                .find(|c| c.text == token)
                .map(|c| c.text),
        }
    }
}

impl ArgumentCompleter<AttributeSlots> {
    /// Completer for read-style commands: every attribute, values left free.
    #[must_use]
    pub fn for_get(attributes: Rc<[AttributeDescriptor]>) -> Self {
        Self::new(AttributeSlots::all(attributes)).suppress_values(true)
    }

    /// Completer for `set`: writable attributes and their value domains.
    #[must_use]
    pub fn for_set(attributes: Rc<[AttributeDescriptor]>) -> Self {
        Self::new(AttributeSlots::writable(attributes))
    }
}

impl<S: SlotSource> Completer for ArgumentCompleter<S> {
    fn complete(&self, text: &str) -> Vec<Candidate> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let trailing = text.ends_with(char::is_whitespace);

        if tokens.is_empty() || (tokens.len() == 1 && !trailing) {
            return self.names_matching(tokens.first().copied().unwrap_or(""));
        }
        if tokens.len() > 2 || (tokens.len() == 2 && trailing) {
            return Vec::new();
        }
        if self.suppress_values {
            return Vec::new();
        }
        let Some(name) = self.resolve_name(tokens[0]) else {
            return Vec::new();
        };
        let partial = tokens.get(1).copied().unwrap_or("");
        self.source
            .values(&name)
            .into_iter()
            .filter(|value| value.starts_with(partial))
            .map(|value| Candidate::new(value, partial.len()))
            .collect()
    }
}
