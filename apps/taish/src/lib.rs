// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Library surface of the TAI shell: client boundary, contexts and driver.
// Author: Lukas Bower
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Interactive shell for TAI attribute-management daemons.
//!
//! The shell walks the daemon's object tree (modules and their network and
//! host interfaces) as a stack of contexts. Every line is expanded and
//! validated by the `taish-core` engine before a handler issues the matching
//! client call.

pub mod client;
pub mod config;
pub mod context;
pub mod mock;
pub mod repl;
pub mod shell;

pub use client::{
    ApiScope, AttributeMetadata, Client, LogLevel, ModuleSummary, Notification, NotifiedAttribute,
    ObjectHandle, ObjectSummary, ObjectType, TaiError, TaiResult,
};
pub use config::{load_config, resolve_config_path, ConfigOverrides, TaishConfig};
pub use context::{handler, CommandHandler, Console, Outcome, Scope, ShellContext};
pub use mock::MockClient;
pub use shell::{CommandStatus, Shell};
