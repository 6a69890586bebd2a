use std::cmp::Ordering;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::registers::RegisterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Put,
    Copy,
    Swap,
    Free,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,
    Jmp,
    Jz,
    Jnz,
    Je,
    Jne,
    Jg,
    Jl,
    Jge,
    Jle,
    Call,
    Ret,
    IterThrough,
    IterFor,
    EndIter,
    Show,
    Ascii,
    Hex,
    Cls,
    Newl,
    Tab,
}

impl Op {
    pub const COUNT: usize = Op::Tab as usize + 1;
}

/// Operation of a three-operand arithmetic instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl From<ArithOp> for Op {
    fn from(op: ArithOp) -> Self {
        match op {
            ArithOp::Add => Op::Add,
            ArithOp::Sub => Op::Sub,
            ArithOp::Mul => Op::Mul,
            ArithOp::Div => Op::Div,
            ArithOp::Mod => Op::Mod,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Reg(RegisterId),
    Imm(i32),
}

bitflags! {
    /// Set of orderings on which a conditional jump is taken.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Cond: u8 {
        const LT = 1 << 0;
        const EQ = 1 << 1;
        const GT = 1 << 2;
    }
}

impl Cond {
    pub fn holds(self, lhs: i32, rhs: i32) -> bool {
        let ord = match lhs.cmp(&rhs) {
            Ordering::Less => Cond::LT,
            Ordering::Equal => Cond::EQ,
            Ordering::Greater => Cond::GT,
        };
        self.contains(ord)
    }
}

/// One decoded program line. Jump targets are absolute 1-based line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instr {
    /// Label-only line.
    Nop,
    Put { dst: RegisterId, src: Operand },
    Copy { dst: RegisterId, src: RegisterId },
    Swap { a: RegisterId, b: RegisterId },
    Free { reg: RegisterId },
    Arith { op: ArithOp, dst: RegisterId, lhs: Operand, rhs: Operand },
    Inc { reg: RegisterId },
    Dec { reg: RegisterId },
    Jmp { target: usize },
    /// JZ/JNZ compare `lhs` against literal 0.
    Branch { op: Op, cond: Cond, lhs: RegisterId, rhs: Operand, target: usize },
    Call { target: usize },
    Ret,
    /// `end` is the line of the matching `)`; filled in once the block is paired.
    IterThrough { first: RegisterId, last: RegisterId, dst: RegisterId, end: usize },
    IterFor { reg: RegisterId, count: i32, end: usize },
    EndIter { header: usize },
    Show { reg: RegisterId },
    Ascii { reg: RegisterId },
    Hex { reg: RegisterId },
    Cls,
    Newl,
    Tab,
}

impl Instr {
    /// Opcode of the instruction; `None` for a label-only line.
    pub fn op(&self) -> Option<Op> {
        Some(match *self {
            Instr::Nop => return None,
            Instr::Put { .. } => Op::Put,
            Instr::Copy { .. } => Op::Copy,
            Instr::Swap { .. } => Op::Swap,
            Instr::Free { .. } => Op::Free,
            Instr::Arith { op, .. } => op.into(),
            Instr::Branch { op, .. } => op,
            Instr::Inc { .. } => Op::Inc,
            Instr::Dec { .. } => Op::Dec,
            Instr::Jmp { .. } => Op::Jmp,
            Instr::Call { .. } => Op::Call,
            Instr::Ret => Op::Ret,
            Instr::IterThrough { .. } => Op::IterThrough,
            Instr::IterFor { .. } => Op::IterFor,
            Instr::EndIter { .. } => Op::EndIter,
            Instr::Show { .. } => Op::Show,
            Instr::Ascii { .. } => Op::Ascii,
            Instr::Hex { .. } => Op::Hex,
            Instr::Cls => Op::Cls,
            Instr::Newl => Op::Newl,
            Instr::Tab => Op::Tab,
        })
    }

    pub fn jump_target(&self) -> Option<usize> {
        match *self {
            Instr::Jmp { target } | Instr::Branch { target, .. } | Instr::Call { target } => {
                Some(target)
            }
            _ => None,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unexpected instruction value: '{0}'")]
    UnknownMnemonic(String),
    #[error("Invalid register: '{0}'")]
    InvalidRegister(String),
    #[error("Expected a register, found '{0}'")]
    ExpectedRegister(String),
    #[error("Invalid operand literal: '{0}'")]
    InvalidOperandLiteral(String),
    #[error("{mnemonic} takes {expected} operand(s), found {found}")]
    Arity {
        mnemonic: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Expected '{expected}', found '{found}'")]
    Syntax { expected: &'static str, found: String },
    #[error("Malformed range '{0}', expected |R1:R2| or |R:n|")]
    MalformedRange(String),
    #[error("Registers of different type in range: {first}, {last}")]
    RangeTypeMismatch { first: RegisterId, last: RegisterId },
    #[error("Invalid registers order in range: {first}, {last}")]
    DescendingRange { first: RegisterId, last: RegisterId },
    #[error("Iteration count must be non-negative, found {0}")]
    NegativeCount(i32),
    #[error("Invalid jump target: '{0}'")]
    InvalidJumpTarget(String),
    #[error("Block opened here is never closed with ')'")]
    UnclosedBlock,
    #[error("')' without an open ITER_THROUGH/ITER_FOR block")]
    UnmatchedBlockEnd,
}

/// Turns the tokens of one normalized, label-stripped line into an [`Instr`].
pub trait Decoder {
    fn decode(&self, tokens: &[&str]) -> Result<Instr, DecodeError>;
}
