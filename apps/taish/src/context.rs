// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Shell contexts for the TAI object tree and their command sets.
// Author: Lukas Bower

//! Shell contexts for the TAI object tree.
//!
//! Each [`ShellContext`] owns a [`CommandTable`] of boxed handlers. The root
//! context manages modules, object contexts read and write attributes, and a
//! module context can additionally descend into its interfaces.

use std::fmt;
use std::io::Write;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde_json::{json, Value};
use taish_core::{
    ArgumentCompleter, AttributeDescriptor, AttributeSlots, Candidate, CommandTable, Completer,
    CompletionMode, FixedSlots, InvalidInput, NestedCompleter, WordCompleter,
};

use crate::client::{
    find_module, parse_oid, ApiScope, AttributeMetadata, Client, LogLevel, Notification,
    ObjectHandle, ObjectType, NOTIFICATION_USAGE,
};

const CREATE_USAGE: &str = "invalid input: create [module | netif <module-oid> | hostif <module-oid>] [<attr-name>:<attr-value> ]...";

/// Output sink and session flags handed to a running command.
pub struct Console<'a> {
    out: &'a mut dyn Write,
    json: bool,
    interrupt: &'a AtomicBool,
}

impl<'a> Console<'a> {
    /// Wrap a writer for one command invocation.
    pub fn new(out: &'a mut dyn Write, json: bool, interrupt: &'a AtomicBool) -> Self {
        Self {
            out,
            json,
            interrupt,
        }
    }

    /// Write one line of command output.
    pub fn line(&mut self, text: impl fmt::Display) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    /// Whether values are rendered as JSON.
    pub fn json(&self) -> bool {
        self.json
    }

    /// Flag raised when the operator interrupts a long-running command.
    pub fn interrupt(&self) -> &AtomicBool {
        self.interrupt
    }
}

/// What the shell does after a command completes.
pub enum Outcome {
    /// Remain in the current context.
    Stay,
    /// Push a child context.
    Enter(ShellContext),
    /// Return to the parent context, or end the session at the root.
    Leave,
}

/// Command implementation bound into a [`ShellContext`].
pub trait CommandHandler {
    /// Run the command with its already expanded arguments.
    fn execute(&self, console: &mut Console<'_>, args: &[String]) -> Result<Outcome>;
}

impl<F> CommandHandler for F
where
    F: Fn(&mut Console<'_>, &[String]) -> Result<Outcome>,
{
    fn execute(&self, console: &mut Console<'_>, args: &[String]) -> Result<Outcome> {
        self(console, args)
    }
}

/// Box a closure as a [`CommandHandler`].
pub fn handler<F>(f: F) -> Box<dyn CommandHandler>
where
    F: Fn(&mut Console<'_>, &[String]) -> Result<Outcome> + 'static,
{
    Box::new(f)
}

/// Position of a context in the object tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Top level.
    Root,
    /// A created module.
    Module {
        /// Slot location.
        location: String,
        /// Object id.
        oid: u64,
    },
    /// A network interface.
    NetIf {
        /// Index within the module.
        index: u32,
        /// Object id.
        oid: u64,
    },
    /// A host interface.
    HostIf {
        /// Index within the module.
        index: u32,
        /// Object id.
        oid: u64,
    },
}

impl Scope {
    /// Handle of the object this scope addresses; `None` at the root.
    pub fn handle(&self) -> Option<ObjectHandle> {
        match self {
            Self::Root => None,
            Self::Module { oid, .. } => Some(ObjectHandle::new(ObjectType::Module, *oid)),
            Self::NetIf { oid, .. } => Some(ObjectHandle::new(ObjectType::NetIf, *oid)),
            Self::HostIf { oid, .. } => Some(ObjectHandle::new(ObjectType::HostIf, *oid)),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => Ok(()),
            Self::Module { location, .. } => write!(f, "module({location})"),
            Self::NetIf { index, .. } => write!(f, "netif({index})"),
            Self::HostIf { index, .. } => write!(f, "hostif({index})"),
        }
    }
}

/// A command context: a scope and the commands valid inside it.
pub struct ShellContext {
    scope: Scope,
    table: CommandTable<Box<dyn CommandHandler>>,
}

impl ShellContext {
    /// Create a context holding only `quit`.
    pub fn new(scope: Scope) -> Self {
        let mut table = CommandTable::new();
        table.add_command("quit", handler(|_, _| Ok(Outcome::Leave)), None);
        Self { scope, table }
    }

    /// Build the root context.
    pub fn root(client: Rc<dyn Client>) -> Self {
        let mut context = Self::new(Scope::Root);
        register_root(&mut context, client);
        context
    }

    /// Build the context of the created module at `location`.
    pub fn module(client: Rc<dyn Client>, location: &str) -> Result<Self> {
        let summary = find_module(client.as_ref(), location)?;
        let scope = Scope::Module {
            location: summary.location,
            oid: summary.oid,
        };
        let mut context = Self::object(Rc::clone(&client), scope)?;
        register_interfaces(&mut context, client, location);
        Ok(context)
    }

    /// Build an attribute context for an interface or module scope.
    pub fn object(client: Rc<dyn Client>, scope: Scope) -> Result<Self> {
        let handle = scope
            .handle()
            .ok_or_else(|| anyhow!("the root context has no attributes"))?;
        let metadata = client
            .list_attribute_metadata(handle.object_type)
            .with_context(|| format!("failed to list {} attribute metadata", handle.object_type))?;
        debug!(
            "{} 0x{:x}: {} attributes",
            handle.object_type,
            handle.oid,
            metadata.len()
        );
        let mut context = Self::new(scope);
        register_attributes(&mut context, client, handle, Rc::new(metadata));
        Ok(context)
    }

    /// Scope this context addresses.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Registered commands.
    pub fn table(&self) -> &CommandTable<Box<dyn CommandHandler>> {
        &self.table
    }

    /// Register or replace a command.
    pub fn add_command(
        &mut self,
        name: &str,
        handler: Box<dyn CommandHandler>,
        completer: Option<Box<dyn Completer>>,
    ) {
        self.table.add_command(name, handler, completer);
    }

    /// Remove a command. `quit` cannot be removed.
    pub fn del_command(&mut self, name: &str) -> bool {
        if name == "quit" {
            return false;
        }
        self.table.remove_command(name).is_some()
    }

    /// Candidates for an interactive completion request.
    pub fn completion(&self, text: &str) -> Vec<Candidate> {
        self.table.completion(text, CompletionMode::Interactive)
    }

    /// Help text for a partially typed line.
    pub fn help(&self, text: &str) -> String {
        self.table.help(text)
    }
}

impl fmt::Display for ShellContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.scope, f)
    }
}

fn usage(message: &str) -> anyhow::Error {
    InvalidInput::usage(message).into()
}

fn register_root(context: &mut ShellContext, client: Rc<dyn Client>) {
    let locations = {
        let client = Rc::clone(&client);
        WordCompleter::dynamic(move || match client.list() {
            Ok(modules) => modules.into_iter().map(|m| m.location).collect(),
            Err(err) => {
                debug!("module completion unavailable: {err}");
                Vec::new()
            }
        })
    };
    let shared = Rc::clone(&client);
    context.add_command(
        "module",
        handler(move |_, args| {
            let [location] = args else {
                return Err(usage("usage: module <name>"));
            };
            let module = ShellContext::module(Rc::clone(&shared), location)?;
            Ok(Outcome::Enter(module))
        }),
        Some(Box::new(locations)),
    );

    let shared = Rc::clone(&client);
    context.add_command(
        "list",
        handler(move |console, args| {
            if !args.is_empty() {
                return Err(usage("usage: list"));
            }
            for module in shared.list()? {
                if module.oid == 0 {
                    console.line(format_args!("module: {} not present", module.location))?;
                } else {
                    console.line(format_args!("module: {} 0x{:08x}", module.location, module.oid))?;
                }
                for hostif in &module.hostifs {
                    console.line(format_args!(" hostif: {} 0x{:08x}", hostif.index, hostif.oid))?;
                }
                for netif in &module.netifs {
                    console.line(format_args!(" netif: {} 0x{:08x}", netif.index, netif.oid))?;
                }
            }
            Ok(Outcome::Stay)
        }),
        None,
    );

    let shared = Rc::clone(&client);
    context.add_command(
        "log-level",
        handler(move |_, args| {
            let (level, api) = match args {
                [level] => (level.parse::<LogLevel>()?, ApiScope::Unspecified),
                [level, api] => (level.parse::<LogLevel>()?, api.parse::<ApiScope>()?),
                _ => return Err(usage("usage: log-level <level> [api]")),
            };
            shared.set_log_level(level, api)?;
            Ok(Outcome::Stay)
        }),
        Some(Box::new(ArgumentCompleter::new(FixedSlots::new(
            LogLevel::LABELS,
            ApiScope::LABELS,
        )))),
    );

    let shared = Rc::clone(&client);
    context.add_command(
        "create",
        handler(move |console, args| {
            let Some((kind, rest)) = args.split_first() else {
                return Err(usage(CREATE_USAGE));
            };
            let object_type = kind.parse::<ObjectType>()?;
            let (module_oid, rest) = match object_type {
                ObjectType::Module => (0, rest),
                ObjectType::NetIf | ObjectType::HostIf => {
                    let Some((oid, rest)) = rest.split_first() else {
                        return Err(usage(CREATE_USAGE));
                    };
                    let oid = parse_oid(oid)
                        .map_err(|err| usage(&format!("invalid module oid: {err}")))?;
                    (oid, rest)
                }
            };
            let attrs = rest
                .iter()
                .map(|pair| {
                    pair.split_once(':')
                        .map(|(name, value)| (name.to_owned(), value.to_owned()))
                        .ok_or_else(|| usage(&format!("invalid attribute {pair}: expected <name>:<value>")))
                })
                .collect::<Result<Vec<_>>>()?;
            let oid = shared.create(object_type, &attrs, module_oid)?;
            console.line(format_args!("oid: 0x{oid:x}"))?;
            Ok(Outcome::Stay)
        }),
        Some(Box::new(
            NestedCompleter::new()
                .word("module")
                .word("netif")
                .word("hostif"),
        )),
    );

    let oids = {
        let client = Rc::clone(&client);
        WordCompleter::dynamic(move || match client.list() {
            Ok(modules) => modules
                .iter()
                .filter(|m| m.oid > 0)
                .flat_map(|m| m.oids())
                .map(|oid| format!("0x{oid:x}"))
                .collect(),
            Err(err) => {
                debug!("oid completion unavailable: {err}");
                Vec::new()
            }
        })
    };
    context.add_command(
        "remove",
        handler(move |_, args| {
            let [oid] = args else {
                return Err(usage("usage: remove <oid>"));
            };
            let oid = parse_oid(oid).map_err(|err| usage(&format!("invalid oid {oid}: {err}")))?;
            client.remove(oid)?;
            Ok(Outcome::Stay)
        }),
        Some(Box::new(oids)),
    );
}

fn register_interfaces(context: &mut ShellContext, client: Rc<dyn Client>, location: &str) {
    for object_type in [ObjectType::NetIf, ObjectType::HostIf] {
        let indices = {
            let client = Rc::clone(&client);
            let location = location.to_owned();
            WordCompleter::dynamic(move || match find_module(client.as_ref(), &location) {
                Ok(module) => {
                    let list = match object_type {
                        ObjectType::NetIf => module.netifs,
                        _ => module.hostifs,
                    };
                    list.iter().map(|i| i.index.to_string()).collect()
                }
                Err(err) => {
                    debug!("{object_type} completion unavailable: {err}");
                    Vec::new()
                }
            })
        };
        let shared = Rc::clone(&client);
        let location = location.to_owned();
        let usage_text = format!("usage: {object_type} <index>");
        context.add_command(
            object_type.label(),
            handler(move |_, args| {
                let [index] = args else {
                    return Err(usage(&usage_text));
                };
                let index: u32 = index
                    .parse()
                    .map_err(|_| usage(&format!("invalid {object_type} index {index}")))?;
                let module = find_module(shared.as_ref(), &location)?;
                let list = match object_type {
                    ObjectType::NetIf => &module.netifs,
                    _ => &module.hostifs,
                };
                let found = list
                    .iter()
                    .find(|i| i.index == index)
                    .ok_or_else(|| anyhow!("{object_type} {index} not found"))?;
                let scope = match object_type {
                    ObjectType::NetIf => Scope::NetIf {
                        index,
                        oid: found.oid,
                    },
                    _ => Scope::HostIf {
                        index,
                        oid: found.oid,
                    },
                };
                Ok(Outcome::Enter(ShellContext::object(Rc::clone(&shared), scope)?))
            }),
            Some(Box::new(indices)),
        );
    }
}

fn register_attributes(
    context: &mut ShellContext,
    client: Rc<dyn Client>,
    handle: ObjectHandle,
    metadata: Rc<Vec<AttributeMetadata>>,
) {
    let descriptors: Rc<[AttributeDescriptor]> =
        metadata.iter().map(AttributeMetadata::descriptor).collect();

    let shared = Rc::clone(&client);
    context.add_command(
        "get",
        handler(move |console, args| {
            let [name] = args else {
                return Err(usage("usage: get <name>"));
            };
            let value = shared.get(handle, name, console.json())?;
            console.line(value)?;
            Ok(Outcome::Stay)
        }),
        Some(Box::new(ArgumentCompleter::for_get(Rc::clone(&descriptors)))),
    );

    let shared = Rc::clone(&client);
    context.add_command(
        "set",
        handler(move |_, args| {
            let Some((name, value)) = args.split_first() else {
                return Err(usage("usage: set <name> <value>"));
            };
            shared.set(handle, name, &value.join(" "))?;
            Ok(Outcome::Stay)
        }),
        Some(Box::new(ArgumentCompleter::for_set(Rc::clone(&descriptors)))),
    );

    let shared = Rc::clone(&client);
    context.add_command(
        "capability",
        handler(move |console, args| {
            let [name] = args else {
                return Err(usage("usage: capability <name>"));
            };
            console.line(shared.get_attribute_capability(handle, name)?)?;
            Ok(Outcome::Stay)
        }),
        Some(Box::new(ArgumentCompleter::for_get(Rc::clone(&descriptors)))),
    );

    let shared = Rc::clone(&client);
    let names = Rc::clone(&metadata);
    context.add_command(
        "monitor",
        handler(move |console, args| {
            let attr = match args {
                [] => "notify",
                [name] => name.as_str(),
                _ => return Err(usage("usage: monitor <name>")),
            };
            monitor(console, shared.as_ref(), handle, attr, &names)?;
            Ok(Outcome::Stay)
        }),
        Some(Box::new(
            ArgumentCompleter::new(AttributeSlots::filtered(Rc::clone(&descriptors), |attr| {
                attr.usage == NOTIFICATION_USAGE
            }))
            .suppress_values(true),
        )),
    );

    context.add_command(
        "list-attr",
        handler(move |console, args| {
            let simple = match args {
                [] => false,
                [mode] if mode == "simple" => true,
                _ => return Err(usage("usage: list-attr [simple]")),
            };
            if simple {
                for meta in metadata.iter() {
                    console.line(&meta.short_name)?;
                }
                return Ok(Outcome::Stay);
            }
            let rows: Vec<[String; 4]> = metadata
                .iter()
                .map(|meta| {
                    [
                        meta.short_name.clone(),
                        if meta.is_readonly { "ro" } else { "r/w" }.to_owned(),
                        meta.usage.clone(),
                        if meta.is_custom() { "custom" } else { "official" }.to_owned(),
                    ]
                })
                .collect();
            for line in render_table(["name", "type", "value", "range"], &rows) {
                console.line(line)?;
            }
            Ok(Outcome::Stay)
        }),
        Some(Box::new(WordCompleter::new(["simple"]))),
    );
}

fn monitor(
    console: &mut Console<'_>,
    client: &dyn Client,
    handle: ObjectHandle,
    attr: &str,
    metadata: &[AttributeMetadata],
) -> Result<()> {
    let json = console.json;
    let interrupt = console.interrupt;
    let out = &mut *console.out;
    interrupt.store(false, Ordering::SeqCst);

    let mut failure: Option<std::io::Error> = None;
    let mut emit = |notification: &Notification| {
        for attr in &notification.attrs {
            if failure.is_some() {
                return;
            }
            let names: Vec<&str> = metadata
                .iter()
                .filter(|m| m.attr_id == attr.attr_id)
                .map(|m| m.short_name.as_str())
                .collect();
            let written = match (names.as_slice(), json) {
                ([name], false) => writeln!(out, "{name} | {}", attr.value),
                ([], false) => writeln!(out, "0x{:x} | {}", attr.attr_id, attr.value),
                ([name], true) => {
                    let record = json!({ "name": name, "value": parse_json(&attr.value) });
                    writeln!(out, "{record}")
                }
                ([], true) => {
                    let record = json!({ "name": attr.attr_id, "value": parse_json(&attr.value) });
                    writeln!(out, "{record}")
                }
                (many, _) => writeln!(
                    out,
                    "error: more than one metadata matched for id 0x{:x}: {many:?}",
                    attr.attr_id
                ),
            };
            if let Err(err) = written {
                failure = Some(err);
            }
        }
    };
    client.monitor(handle, attr, json, &mut emit, interrupt)?;
    if let Some(err) = failure {
        return Err(err.into());
    }
    writeln!(out)?;
    Ok(())
}

fn parse_json(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()))
}

/// Lay out rows under a header with a dashed rule, columns padded to width.
/// Trailing padding is dropped from every line.
fn render_table<const N: usize>(headers: [&str; N], rows: &[[String; N]]) -> Vec<String> {
    let mut widths = headers.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }
    let join = |cells: Vec<String>| cells.join("  ").trim_end().to_owned();
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(join(
        headers
            .iter()
            .zip(widths)
            .map(|(h, w)| format!("{h:<w$}"))
            .collect(),
    ));
    lines.push(join(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        lines.push(join(
            row.iter()
                .zip(widths)
                .map(|(cell, w)| format!("{cell:<w$}"))
                .collect(),
        ));
    }
    lines
}
