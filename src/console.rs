use std::io::Write;

use anyhow::Result;

/// Terminal clear sequence emitted by `_CLS`.
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// Sink for the output pseudo-instructions.
pub trait Console {
    fn write_str(&mut self, s: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()> {
        self.write_str(CLEAR_SCREEN)
    }
}

/// Writes straight to the process stdout, flushing after each write.
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn write_str(&mut self, s: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(s.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Captures output in memory.
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    pub out: String,
    pub clears: usize,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Console for BufferConsole {
    fn write_str(&mut self, s: &str) -> Result<()> {
        self.out.push_str(s);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.clears += 1;
        self.out.clear();
        Ok(())
    }
}
