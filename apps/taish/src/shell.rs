// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Shell driver owning the context stack and command dispatch.
// Author: Lukas Bower

//! Shell driver owning the context stack and command dispatch.

use std::io::{BufRead, Write};
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use log::{debug, info};
use taish_core::InvalidInput;

use crate::client::{Client, TaiError};
use crate::context::{Console, Outcome, ShellContext};

/// Result of executing a single shell command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandStatus {
    /// Continue reading commands.
    Continue,
    /// Exit the shell loop.
    Quit,
}

/// Shell driver: a stack of contexts rooted at the daemon's top level.
pub struct Shell<W: Write> {
    client: Rc<dyn Client>,
    stack: Vec<Rc<ShellContext>>,
    writer: W,
    json: bool,
    interrupt: Arc<AtomicBool>,
}

impl<W: Write> Shell<W> {
    /// Create a shell positioned at the root context.
    pub fn new(client: Rc<dyn Client>, writer: W) -> Self {
        let root = Rc::new(ShellContext::root(Rc::clone(&client)));
        info!("shell started against {} daemon", client.kind());
        Self {
            client,
            stack: vec![root],
            writer,
            json: false,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Render attribute values as JSON.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Share the flag a signal handler raises to stop `monitor`.
    #[must_use]
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// The client commands are issued against.
    pub fn client(&self) -> &Rc<dyn Client> {
        &self.client
    }

    /// The active context.
    pub fn context(&self) -> Rc<ShellContext> {
        // the root is never popped
        Rc::clone(&self.stack[self.stack.len() - 1])
    }

    /// Prompt for the active context, e.g. `module(1)/netif(0)> `.
    pub fn prompt(&self) -> String {
        let labels: Vec<String> = self
            .stack
            .iter()
            .map(|context| context.to_string())
            .filter(|label| !label.is_empty())
            .collect();
        format!("{}> ", labels.join("/"))
    }

    /// Write a line directly to the shell output.
    pub fn write_line(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{message}")?;
        Ok(())
    }

    /// Help text for a partially typed line in the active context.
    pub fn help(&self, text: &str) -> String {
        self.context().help(text)
    }

    /// Execute a single command line.
    ///
    /// Command failures are printed and leave the shell in its current
    /// context; only failures to write output are returned.
    pub fn execute(&mut self, line: &str) -> Result<CommandStatus> {
        if line.trim().is_empty() {
            return Ok(CommandStatus::Continue);
        }
        let context = self.context();
        let outcome = {
            let mut console = Console::new(&mut self.writer, self.json, &self.interrupt);
            context
                .table()
                .resolve(line)
                .map_err(anyhow::Error::from)
                .and_then(|resolved| {
                    debug!("{} {:?}", resolved.command, resolved.args);
                    resolved.handler.execute(&mut console, &resolved.args)
                })
        };
        match outcome {
            Ok(Outcome::Stay) => Ok(CommandStatus::Continue),
            Ok(Outcome::Enter(child)) => {
                self.stack.push(Rc::new(child));
                Ok(CommandStatus::Continue)
            }
            Ok(Outcome::Leave) => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                    Ok(CommandStatus::Continue)
                } else {
                    Ok(CommandStatus::Quit)
                }
            }
            Err(err) => {
                self.report(&err)?;
                Ok(CommandStatus::Continue)
            }
        }
    }

    fn report(&mut self, err: &anyhow::Error) -> Result<()> {
        if let Some(invalid) = err.downcast_ref::<InvalidInput>() {
            return self.write_line(invalid.message());
        }
        if let Some(TaiError::Status { code, message }) = err.downcast_ref::<TaiError>() {
            return self.write_line(&format!("err: {message} (code {code:x})"));
        }
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if err.chain().count() == 1 {
                return Err(anyhow::anyhow!("failed to write shell output: {io}"));
            }
        }
        self.write_line(&format!("err: {err:#}"))
    }

    /// Execute commands from a buffered reader until EOF or the shell quits.
    ///
    /// Blank lines and `#` comments are skipped.
    pub fn run_script<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if self.execute(trimmed)? == CommandStatus::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Execute a `;`-separated command string.
    pub fn run_batch(&mut self, commands: &str) -> Result<()> {
        for command in commands.split(';') {
            if self.execute(command)? == CommandStatus::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Consume the shell and return owned client and writer.
    pub fn into_parts(self) -> (Rc<dyn Client>, W) {
        (self.client, self.writer)
    }
}
