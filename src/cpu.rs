use anyhow::Error;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::console::Console;
use crate::exec::Executor;
use crate::program::Program;
use crate::registers::{Bank, RegisterFile, RegisterId};
use crate::stack::CallStack;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub max_steps: Option<u64>,      // None: run until the pc leaves the program
    pub max_call_depth: Option<usize>, // None: unbounded CALL nesting
}

/// What a loop frame binds on each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Induction {
    /// `ITER_THROUGH`: copy register `bank[index]` into `dst`.
    Through { bank: Bank, dst: RegisterId },
    /// `ITER_FOR`: store the counter itself.
    Count { reg: RegisterId },
}

/// Active `ITER_*` block; `index` runs up to and including `last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopFrame {
    pub header: usize,
    pub induction: Induction,
    pub index: i32,
    pub last: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub pc: usize,   // next line to execute, 1-based; > program length means halted
    pub line: usize, // line of the instruction currently executing
    pub regs: RegisterFile,
    pub stack: CallStack,
    pub loops: Vec<LoopFrame>,
    pub steps: u64,
    pub cfg: CpuConfig,
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("line {line}: division by zero")]
    DivisionByZero { line: usize },
    #[error("line {line}: RET with an empty call stack")]
    StackUnderflow { line: usize },
    #[error("line {line}: call depth {depth} exceeds the configured limit")]
    StackOverflow { line: usize, depth: usize },
    #[error("line {line}: ')' reached without an active loop for its block")]
    LoopFrame { line: usize },
    #[error("step limit reached after {steps} steps")]
    StepLimit { steps: u64 },
    #[error("line {line}: console error: {source}")]
    Console {
        line: usize,
        #[source]
        source: Error,
    },
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(CpuConfig::default())
    }
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            pc: 1,
            line: 0,
            regs: RegisterFile::new(),
            stack: CallStack::new(),
            loops: Vec::new(),
            steps: 0,
            cfg,
        }
    }

    /// Back to the initial state; configuration is kept.
    pub fn reset(&mut self) {
        *self = Self::new(self.cfg);
    }

    pub fn is_halted(&self, program: &Program) -> bool {
        self.pc > program.len()
    }

    /// Execute one line. The pc is advanced before dispatch so a taken jump
    /// simply overwrites it and lands exactly on its target.
    pub fn step<C: Console, X: Executor>(
        &mut self,
        program: &Program,
        console: &mut C,
        exec: &X,
    ) -> Result<(), Trap> {
        let pc = self.pc;
        let Some(line) = program.line(pc) else {
            return Ok(());
        };
        trace!(pc, text = %line.text, "step");
        self.line = pc;
        self.pc = pc + 1;
        self.steps += 1;
        exec.exec(self, program, console, line.instr)
    }

    /// Run until the pc moves past the last line. Returns the number of steps executed.
    pub fn run<C: Console, X: Executor>(
        &mut self,
        program: &Program,
        console: &mut C,
        exec: &X,
    ) -> Result<u64, Trap> {
        while !self.is_halted(program) {
            if let Some(max) = self.cfg.max_steps {
                if self.steps >= max {
                    return Err(Trap::StepLimit { steps: self.steps });
                }
            }
            self.step(program, console, exec)?;
        }
        Ok(self.steps)
    }
}
