// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Attribute metadata consumed by the argument completers.
// Author: Lukas Bower

//! Attribute metadata consumed by the argument completers.

use alloc::string::String;

/// The subset of attribute metadata the completion engine needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// Short attribute name, unique within one object type.
    pub name: String,
    /// Whether the attribute rejects writes.
    pub read_only: bool,
    /// Value domain hint: `bool`, `[a|b|c]` or free-form text.
    pub usage: String,
}

impl AttributeDescriptor {
    /// Construct a descriptor.
    pub fn new(name: impl Into<String>, read_only: bool, usage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            read_only,
            usage: usage.into(),
        }
    }
}
