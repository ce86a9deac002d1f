// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Shared taish command completion and input validation engine.
// Author: Lukas Bower
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![no_std]

//! Shared taish command completion and input validation engine.
//!
//! A [`CommandTable`] owns the commands valid inside one navigation scope of
//! the shell. It answers "what could come next" for partially typed input and
//! expands a whitespace-delimited line into its fully resolved form, reporting
//! [`InvalidInput`] with the valid candidates when a token cannot be resolved.

extern crate alloc;

pub mod argument;
pub mod attribute;
pub mod candidate;
pub mod completer;
pub mod error;
pub mod table;
pub mod value;

pub use argument::{ArgumentCompleter, AttributeSlots, FixedSlots, SlotSource};
pub use attribute::AttributeDescriptor;
pub use candidate::{candidate_texts, Candidate};
pub use completer::{word_before_cursor, Completer, CompletionMode, NestedCompleter, WordCompleter};
pub use error::{InvalidInput, InvalidInputKind};
pub use table::{CommandEntry, CommandTable, Resolved};
pub use value::{complete_value, value_candidates};
