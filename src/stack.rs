use std::fmt;

use serde::{Deserialize, Serialize};

/// Return record pushed by `CALL`: the callee's label and the line to resume at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEntry {
    pub label: String,
    pub line: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallStack {
    entries: Vec<StackEntry>, // top is last
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, line: usize) {
        self.entries.push(StackEntry {
            label: label.into(),
            line,
        });
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for CallStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------------------- Stack -------------------")?;
        if self.is_empty() {
            writeln!(f, "\t\t\t\tStack is empty.")?;
        }
        for e in self.entries.iter().rev() {
            writeln!(f, "\t\t\t\t{}: {}", e.label, e.line)?;
        }
        write!(f, "-------------------- END --------------------")
    }
}
