pub mod artifact;
pub mod console;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod exec;
pub mod instructions;
pub mod linker;
pub mod program;
pub mod registers;
pub mod source;
pub mod stack;

pub mod isa {
    pub mod jasm; // whitespace-token text syntax
}

pub use console::{BufferConsole, Console, StdoutConsole};
pub use cpu::{Cpu, CpuConfig, Trap};
pub use program::{CompileError, Program};
pub use registers::{RegisterFile, RegisterId};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Trap(#[from] Trap),
}

/// Compile `source` and run it to completion on a fresh machine.
pub fn run<C: Console>(source: &str, cfg: CpuConfig, console: &mut C) -> Result<Cpu, Error> {
    let program = Program::compile(source)?;
    let mut cpu = Cpu::new(cfg);
    cpu.run(&program, console, &exec::IntExecutor)?;
    Ok(cpu)
}
