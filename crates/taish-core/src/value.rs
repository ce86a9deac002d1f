// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Derive legal attribute values from a usage descriptor.
// Author: Lukas Bower

//! Derive legal attribute values from a usage descriptor.

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

/// Enumerate every legal value for an attribute with the given `usage`.
///
/// `bool` (or the daemon's `<bool>` rendering) yields `true`/`false`, a
/// bracketed `[a|b|c]` list yields its members in declaration order, and any
/// other usage is free-form and yields nothing. Members are split on `|`
/// verbatim, so `[a||b]` keeps its empty member.
#[must_use]
pub fn value_candidates(usage: &str) -> Vec<String> {
    if usage == "bool" || usage == "<bool>" {
        return vec!["true".to_string(), "false".to_string()];
    }
    if let Some(inner) = usage
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        return inner.split('|').map(ToString::to_string).collect();
    }
    Vec::new()
}

/// Legal values for `usage` that start with `partial`.
#[must_use]
pub fn complete_value(usage: &str, partial: &str) -> Vec<String> {
    value_candidates(usage)
        .into_iter()
        .filter(|value| value.starts_with(partial))
        .collect()
}
