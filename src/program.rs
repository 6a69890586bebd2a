use serde::Serialize;
use tracing::debug;

use crate::decoder::{DecodeError, Decoder, Instr};
use crate::isa::jasm::JasmDecoder;
use crate::linker::{link, Input, LabelTable, LinkError};
use crate::source::{normalize, split_line};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: DecodeError,
    },
}

/// A resolved line: its label-free text form and the decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub text: String,
    pub instr: Instr,
}

/// Normalized, label-resolved and decoded program, addressed 1..=len().
#[derive(Debug, Clone, Default, Serialize)]
pub struct Program {
    lines: Vec<Line>,
    labels: LabelTable,
}

impl Program {
    /// Normalize, resolve labels and decode `source` with the JAsm decoder.
    /// Every jump operand must name a label.
    pub fn compile(source: &str) -> Result<Self, CompileError> {
        Self::compile_with(source, Input::Source, &JasmDecoder::new())
    }

    /// Compile a resolved artifact, whose numeric jump operands are line numbers.
    pub fn compile_resolved(text: &str) -> Result<Self, CompileError> {
        Self::compile_with(text, Input::Artifact, &JasmDecoder::new())
    }

    pub fn compile_with<D: Decoder>(
        source: &str,
        input: Input,
        dec: &D,
    ) -> Result<Self, CompileError> {
        let normalized = normalize(source.lines());
        let (labels, resolved) = link(&normalized, input)?;

        let mut lines = Vec::with_capacity(resolved.len());
        let mut open_blocks: Vec<usize> = Vec::new(); // 0-based header indices
        for (i, text) in resolved.into_iter().enumerate() {
            let line = i + 1;
            let split = split_line(&text);
            let mut instr = dec
                .decode(&split.tokens)
                .map_err(|source| CompileError::Decode { line, source })?;

            match &mut instr {
                Instr::IterThrough { .. } | Instr::IterFor { .. } => open_blocks.push(i),
                Instr::EndIter { header } => {
                    let h = open_blocks.pop().ok_or(CompileError::Decode {
                        line,
                        source: DecodeError::UnmatchedBlockEnd,
                    })?;
                    *header = h + 1;
                    if let Some(Line {
                        instr: Instr::IterThrough { end, .. } | Instr::IterFor { end, .. },
                        ..
                    }) = lines.get_mut(h)
                    {
                        *end = line;
                    }
                }
                _ => {}
            }
            lines.push(Line { text, instr });
        }
        if let Some(&h) = open_blocks.last() {
            return Err(CompileError::Decode {
                line: h + 1,
                source: DecodeError::UnclosedBlock,
            });
        }

        debug!(lines = lines.len(), labels = labels.len(), "program compiled");
        Ok(Self { lines, labels })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at 1-based address `n`.
    pub fn line(&self, n: usize) -> Option<&Line> {
        n.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Resolved text, one instruction per line.
    pub fn artifact(&self) -> String {
        let mut out = String::new();
        for l in &self.lines {
            out.push_str(&l.text);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SRC: &str = "\
// count down from 3
    PUT A0 3

loop: DEC A0   // tick
    JNZ A0 loop
end:
";

    #[test]
    fn compiles_to_resolved_lines() {
        let p = Program::compile(SRC).unwrap();
        assert_eq!(p.len(), 4);
        assert_eq!(
            p.artifact(),
            "PUT A0 3\nloop: DEC A0   // tick\nJNZ A0 2\nend:\n"
        );
        assert_eq!(p.line(3).and_then(|l| l.instr.jump_target()), Some(2));
        assert_eq!(p.line(4).map(|l| l.instr), Some(Instr::Nop));
        assert!(p.line(0).is_none());
        assert!(p.line(5).is_none());
    }

    #[test]
    fn artifact_recompiles_identically() {
        let p = Program::compile(SRC).unwrap();
        let q = Program::compile_resolved(&p.artifact()).unwrap();
        assert_eq!(p.lines(), q.lines());
    }

    #[test]
    fn numeric_label_targets_its_definition() {
        let p = Program::compile("3: INC A0\nJZ B0 end\nJMP 3\nend:\n").unwrap();
        assert_eq!(p.line(3).and_then(|l| l.instr.jump_target()), Some(1));
        let q = Program::compile_resolved(&p.artifact()).unwrap();
        assert_eq!(q.line(3).and_then(|l| l.instr.jump_target()), Some(1));
    }

    #[test]
    fn bare_line_number_in_source_is_undefined() {
        assert_eq!(
            Program::compile("JMP 5\nINC A0\n").unwrap_err(),
            CompileError::Link(LinkError::UndefinedLabel { name: "5".into(), line: 1 })
        );
        assert!(Program::compile_resolved("JMP 5\nINC A0\n").is_ok());
    }

    #[test]
    fn decode_errors_carry_line() {
        let err = Program::compile("PUT A0 1\n\nPUT A0 Q9\n").unwrap_err();
        assert_eq!(
            err,
            CompileError::Decode { line: 2, source: DecodeError::InvalidRegister("Q9".into()) }
        );
        assert!(err.to_string().contains("Q9"));
    }

    #[test]
    fn blocks_are_paired() {
        let p = Program::compile(
            "ITER_FOR |A0:2| (\nITER_THROUGH |B0:B2| -> Z0 (\nADD C0 C0 Z0\n)\n)\n",
        )
        .unwrap();
        let instrs: Vec<Instr> = p.lines().iter().map(|l| l.instr).collect();
        assert!(matches!(instrs[0], Instr::IterFor { end: 5, .. }));
        assert!(matches!(instrs[1], Instr::IterThrough { end: 4, .. }));
        assert_eq!(instrs[3], Instr::EndIter { header: 2 });
        assert_eq!(instrs[4], Instr::EndIter { header: 1 });
    }

    #[test]
    fn unbalanced_blocks_fail() {
        assert_eq!(
            Program::compile("INC A0\n)\n").unwrap_err(),
            CompileError::Decode { line: 2, source: DecodeError::UnmatchedBlockEnd }
        );
        assert_eq!(
            Program::compile("ITER_FOR |A0:2| (\nINC A1\n").unwrap_err(),
            CompileError::Decode { line: 1, source: DecodeError::UnclosedBlock }
        );
    }

    #[test]
    fn link_errors_propagate() {
        assert!(matches!(
            Program::compile("JMP nowhere\n"),
            Err(CompileError::Link(LinkError::UndefinedLabel { .. }))
        ));
    }
}
