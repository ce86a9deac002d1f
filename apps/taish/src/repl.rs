// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Interactive line editing with context-aware completion and `?` help.
// Author: Lukas Bower

//! Interactive line editing with context-aware completion and `?` help.

use std::io::Write;
use std::path::Path;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use log::{debug, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Editor, Event, EventContext, EventHandler, Helper, KeyEvent,
    RepeatCount,
};

use crate::context::ShellContext;
use crate::shell::{CommandStatus, Shell};

/// Line editor helper completing against the active shell context.
pub struct TaishHelper {
    context: Rc<ShellContext>,
}

impl TaishHelper {
    /// Complete against `context`.
    pub fn new(context: Rc<ShellContext>) -> Self {
        Self { context }
    }

    /// Switch to another context after navigation.
    pub fn set_context(&mut self, context: Rc<ShellContext>) {
        self.context = context;
    }
}

impl Helper for TaishHelper {}

impl Highlighter for TaishHelper {}

impl Hinter for TaishHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Validator for TaishHelper {}

impl Completer for TaishHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = self.context.completion(&line[..pos]);
        let start = pos.saturating_sub(candidates.first().map_or(0, |c| c.replace));
        let pairs = candidates
            .into_iter()
            .map(|c| Pair {
                display: c.text.clone(),
                replacement: c.text,
            })
            .collect();
        Ok((start, pairs))
    }
}

/// Accepts the line early when `?` is typed, remembering the buffer.
#[derive(Clone, Default)]
struct HelpKey {
    pending: Arc<Mutex<Option<String>>>,
}

impl HelpKey {
    fn take(&self) -> Option<String> {
        self.pending.lock().ok().and_then(|mut pending| pending.take())
    }
}

impl ConditionalEventHandler for HelpKey {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        let mut pending = self.pending.lock().ok()?;
        *pending = Some(ctx.line().to_owned());
        Some(Cmd::AcceptLine)
    }
}

/// Run the interactive loop until EOF or a root-level `quit`.
pub fn run<W: Write>(shell: &mut Shell<W>, history: Option<&Path>) -> Result<()> {
    let mut editor: Editor<TaishHelper, DefaultHistory> =
        Editor::new().map_err(|e| anyhow!("failed to init line editor: {e}"))?;
    editor.set_helper(Some(TaishHelper::new(shell.context())));
    let help = HelpKey::default();
    editor.bind_sequence(
        KeyEvent::from('?'),
        EventHandler::Conditional(Box::new(help.clone())),
    );
    if let Some(path) = history {
        if let Err(err) = editor.load_history(path) {
            debug!("no history loaded from {}: {err}", path.display());
        }
    }

    let mut initial = String::new();
    loop {
        if let Some(helper) = editor.helper_mut() {
            helper.set_context(shell.context());
        }
        let prompt = shell.prompt();
        let read = editor.readline_with_initial(&prompt, (initial.as_str(), ""));
        initial.clear();
        let line = match read {
            Ok(line) => line,
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(err) => return Err(anyhow!("readline error: {err}")),
        };

        if let Some(buffer) = help.take() {
            let text = shell.help(&buffer);
            shell.write_line(&text)?;
            initial = buffer;
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Err(err) = editor.add_history_entry(trimmed) {
            warn!("failed to record history: {err}");
        }
        if shell.execute(trimmed)? == CommandStatus::Quit {
            break;
        }
    }

    if let Some(path) = history {
        if let Err(err) = editor.save_history(path) {
            warn!("failed to save history to {}: {err}", path.display());
        }
    }
    Ok(())
}
