use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use jasm_rs::artifact::{is_artifact, read_source};
use jasm_rs::disasm::fmt_instr;
use jasm_rs::Program;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelKV {
    pub line: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingLine {
    pub line: usize,
    pub label: Option<String>,
    pub text: String,  // resolved source text
    pub instr: String, // canonical decoded form
}

pub fn load_program(path: &Path) -> Result<Program> {
    let text = read_source(path)?;
    let program = if is_artifact(path) {
        Program::compile_resolved(&text)
    } else {
        Program::compile(&text)
    };
    program.with_context(|| format!("compiling {}", path.display()))
}

pub fn labels(program: &Program) -> Vec<LabelKV> {
    let mut v: Vec<LabelKV> = program
        .labels()
        .iter()
        .map(|(name, line)| LabelKV { line, name: name.to_string() })
        .collect();
    v.sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.name.cmp(&b.name)));
    v
}

pub fn listing(program: &Program) -> Vec<ListingLine> {
    program
        .lines()
        .iter()
        .enumerate()
        .map(|(i, l)| ListingLine {
            line: i + 1,
            label: program.labels().label_at(i + 1).map(str::to_owned),
            text: l.text.clone(),
            instr: fmt_instr(&l.instr),
        })
        .collect()
}
