use std::collections::{BTreeMap, BTreeSet, VecDeque};
use serde::Serialize;

use jasm_rs::decoder::Instr;
use jasm_rs::instructions::describe;
use jasm_rs::Program;

use crate::model::{labels, LabelKV};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind { Fallthrough, Branch, CondBranch, Call, LoopBack }

impl EdgeKind {
    pub fn tag(self) -> &'static str {
        match self {
            EdgeKind::Fallthrough => "ft",
            EdgeKind::Branch => "br",
            EdgeKind::CondBranch => "cbr",
            EdgeKind::Call => "call",
            EdgeKind::LoopBack => "loop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge { pub from: usize, pub to: usize, pub kind: EdgeKind }

/// Reachable lines, line-level edges and `RET` sites, walked from line 1.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub reachable: BTreeSet<usize>,
    pub edges: Vec<Edge>,
    pub rets: BTreeSet<usize>,
}

fn successors(line: usize, instr: &Instr) -> Vec<(usize, EdgeKind)> {
    let ft = line + 1;
    match *instr {
        Instr::Jmp { target } => vec![(target, EdgeKind::Branch)],
        Instr::Branch { target, .. } => vec![(target, EdgeKind::CondBranch), (ft, EdgeKind::Fallthrough)],
        // The callee returns to the fallthrough line.
        Instr::Call { target } => vec![(target, EdgeKind::Call), (ft, EdgeKind::Fallthrough)],
        Instr::Ret => vec![],
        Instr::IterFor { end, .. } => vec![(ft, EdgeKind::Fallthrough), (end + 1, EdgeKind::CondBranch)],
        Instr::EndIter { header } => vec![(header + 1, EdgeKind::LoopBack), (ft, EdgeKind::Fallthrough)],
        _ => vec![(ft, EdgeKind::Fallthrough)],
    }
}

pub fn analyze(program: &Program) -> Analysis {
    let mut out = Analysis::default();
    let mut queue: VecDeque<usize> = VecDeque::new();
    if !program.is_empty() { queue.push_back(1); }
    while let Some(pc) = queue.pop_front() {
        if !out.reachable.insert(pc) { continue; }
        let Some(line) = program.line(pc) else { continue; };
        if matches!(line.instr, Instr::Ret) { out.rets.insert(pc); }
        for (to, kind) in successors(pc, &line.instr) {
            out.edges.push(Edge { from: pc, to, kind });
            // Targets past the end are program exits, not lines.
            if program.line(to).is_some() && !out.reachable.contains(&to) { queue.push_back(to); }
        }
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct Block { pub start: usize, pub end: usize }

#[derive(Debug, Clone, Serialize)]
pub struct EdgeOut { pub from: usize, pub to: usize, pub kind: String }

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub lines: usize,
    pub reachable: usize,
    pub blocks: Vec<Block>,
    pub edges: Vec<EdgeOut>,
    pub labels: Vec<LabelKV>,
    /// Reachable instruction count per family (Data, Arith, Control, Range, Output).
    pub mix: BTreeMap<String, usize>,
    pub unreachable: Vec<usize>,
}

impl Analysis {
    /// Basic blocks: split at line 1, every edge target and after every non-fallthrough transfer.
    pub fn blocks(&self, program: &Program) -> Vec<Block> {
        let mut starts: BTreeSet<usize> = BTreeSet::new();
        if !program.is_empty() { starts.insert(1); }
        for e in &self.edges {
            if e.kind != EdgeKind::Fallthrough && program.line(e.to).is_some() {
                starts.insert(e.to);
                if program.line(e.from + 1).is_some() { starts.insert(e.from + 1); }
            }
        }
        for &r in &self.rets {
            if program.line(r + 1).is_some() { starts.insert(r + 1); }
        }
        let starts: Vec<usize> = starts.into_iter().collect();
        starts.iter().enumerate()
            .map(|(i, &start)| Block { start, end: starts.get(i + 1).copied().unwrap_or(program.len() + 1) })
            .collect()
    }

    pub fn report(&self, program: &Program) -> Report {
        let mut mix: BTreeMap<String, usize> = BTreeMap::new();
        for &pc in &self.reachable {
            let Some(op) = program.line(pc).and_then(|l| l.instr.op()) else { continue };
            *mix.entry(format!("{:?}", describe(op).family)).or_default() += 1;
        }
        Report {
            lines: program.len(),
            reachable: self.reachable.len(),
            blocks: self.blocks(program),
            edges: self.edges.iter().map(|e| EdgeOut { from: e.from, to: e.to, kind: e.kind.tag().to_string() }).collect(),
            labels: labels(program),
            mix,
            unreachable: (1..=program.len()).filter(|l| !self.reachable.contains(l)).collect(),
        }
    }
}
