//! Undo/redo log for session commands.
//!
//! Two stacks plus a small state machine deciding when a fresh action
//! discards the redo chain:
//!
//! ```text
//! record(A) record(B)      undo: [A, B]   redo: []
//! undo()                   undo: [A]      redo: [B]     armed
//! record(C)                undo: [A, C]   redo: []      (B discarded)
//! ```
//!
//! After a redo empties the redo stack the override flag is disarmed; the
//! next recorded action re-arms it.

use tracing::debug;

use crate::command::Command;

#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    /// Newest at the back.
    undo_stack: Vec<Command>,
    /// Newest at the back.
    redo_stack: Vec<Command>,
    undoing: bool,
    redoing: bool,
    override_armed: bool,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a command the caller has already applied.
    pub fn record(&mut self, command: Command) {
        if !self.undoing && !self.redoing {
            if self.override_armed && !self.redo_stack.is_empty() {
                debug!(
                    discarded = self.redo_stack.len(),
                    "New action clears redo history"
                );
                self.redo_stack.clear();
            }
            self.override_armed = true;
        }
        debug!(command = command.label(), "Recording command");
        self.undo_stack.push(command);
    }

    /// Pop the newest command and hand its inverse to `apply`.
    ///
    /// Returns `None` when there is nothing to undo. If `apply` fails the
    /// command goes back onto the undo stack and the error is returned.
    pub fn undo<E>(
        &mut self,
        apply: impl FnOnce(Command) -> Result<(), E>,
    ) -> Option<Result<Command, E>> {
        let command = self.undo_stack.pop()?;
        self.undoing = true;
        let outcome = apply(command.inverse());
        self.undoing = false;

        if let Err(e) = outcome {
            self.undo_stack.push(command);
            return Some(Err(e));
        }

        debug!(command = command.label(), "Undo");
        self.redo_stack.push(command);
        self.override_armed = true;
        Some(Ok(command))
    }

    /// Pop the newest undone command and hand it to `apply` unchanged.
    ///
    /// Returns `None` when there is nothing to redo. If `apply` fails the
    /// command goes back onto the redo stack and the error is returned.
    pub fn redo<E>(
        &mut self,
        apply: impl FnOnce(Command) -> Result<(), E>,
    ) -> Option<Result<Command, E>> {
        let command = self.redo_stack.pop()?;
        self.redoing = true;
        self.override_armed = false;
        let outcome = apply(command);
        self.redoing = false;

        if let Err(e) = outcome {
            self.redo_stack.push(command);
            self.override_armed = true;
            return Some(Err(e));
        }

        debug!(command = command.label(), "Redo");
        self.undo_stack.push(command);
        self.override_armed = !self.redo_stack.is_empty();
        Some(Ok(command))
    }

    /// Forget everything. Used on session reset and after a successful load.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undoing = false;
        self.redoing = false;
        self.override_armed = false;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// The command the next `undo` would reverse.
    pub fn peek_undo(&self) -> Option<&Command> {
        self.undo_stack.last()
    }

    /// The command the next `redo` would reapply.
    pub fn peek_redo(&self) -> Option<&Command> {
        self.redo_stack.last()
    }
}
