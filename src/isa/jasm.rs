use std::str::FromStr;

use crate::decoder::{ArithOp, Cond, DecodeError, Decoder, Instr, Op, Operand};
use crate::instructions::{lookup, InstrDesc, BLOCK_OPEN, RANGE_ARROW};
use crate::registers::{are_same_type, comes_first, RegisterId};

/// Text decoder for JAsm lines.
///
/// Operands starting with an ASCII letter are register names and must be
/// valid; anything else is a decimal `i32` literal. Block headers are
/// decoded with `end: 0` and paired later by [`crate::program::Program`].
#[derive(Debug, Default, Clone, Copy)]
pub struct JasmDecoder;

impl JasmDecoder {
    pub fn new() -> Self {
        Self
    }
}

fn is_register_syntax(tok: &str) -> bool {
    tok.starts_with(|c: char| c.is_ascii_alphabetic())
}

fn reg(tok: &str) -> Result<RegisterId, DecodeError> {
    if !is_register_syntax(tok) {
        return Err(DecodeError::ExpectedRegister(tok.to_string()));
    }
    tok.parse()
        .map_err(|_| DecodeError::InvalidRegister(tok.to_string()))
}

fn operand(tok: &str) -> Result<Operand, DecodeError> {
    if is_register_syntax(tok) {
        return reg(tok).map(Operand::Reg);
    }
    tok.parse::<i32>()
        .map(Operand::Imm)
        .map_err(|_| DecodeError::InvalidOperandLiteral(tok.to_string()))
}

/// Plain decimal: an optional `-`, never a `+`.
fn decimal<T: FromStr>(tok: &str) -> Option<T> {
    if tok.starts_with('+') {
        return None;
    }
    tok.parse().ok()
}

fn target(tok: &str) -> Result<usize, DecodeError> {
    match decimal::<usize>(tok) {
        Some(n) if n >= 1 => Ok(n),
        _ => Err(DecodeError::InvalidJumpTarget(tok.to_string())),
    }
}

fn expect(tok: &str, expected: &'static str) -> Result<(), DecodeError> {
    if tok == expected {
        Ok(())
    } else {
        Err(DecodeError::Syntax {
            expected,
            found: tok.to_string(),
        })
    }
}

/// `|lhs:rhs|` -> (lhs, rhs)
fn range(tok: &str) -> Result<(&str, &str), DecodeError> {
    let malformed = || DecodeError::MalformedRange(tok.to_string());
    let inner = tok
        .strip_prefix('|')
        .and_then(|t| t.strip_suffix('|'))
        .ok_or_else(malformed)?;
    match inner.split_once(':') {
        Some((a, b)) if !a.is_empty() && !b.is_empty() && !b.contains(':') => Ok((a, b)),
        _ => Err(malformed()),
    }
}

fn arith(op: ArithOp, args: &[&str]) -> Result<Instr, DecodeError> {
    Ok(Instr::Arith {
        op,
        dst: reg(args[0])?,
        lhs: operand(args[1])?,
        rhs: operand(args[2])?,
    })
}

fn cond_for(op: Op) -> Cond {
    match op {
        Op::Jz | Op::Je => Cond::EQ,
        Op::Jnz | Op::Jne => Cond::LT | Cond::GT,
        Op::Jg => Cond::GT,
        Op::Jl => Cond::LT,
        Op::Jge => Cond::GT | Cond::EQ,
        Op::Jle => Cond::LT | Cond::EQ,
        _ => Cond::empty(),
    }
}

impl Decoder for JasmDecoder {
    fn decode(&self, tokens: &[&str]) -> Result<Instr, DecodeError> {
        let Some((&mnemonic, args)) = tokens.split_first() else {
            return Ok(Instr::Nop);
        };
        let desc: &InstrDesc =
            lookup(mnemonic).ok_or_else(|| DecodeError::UnknownMnemonic(mnemonic.to_string()))?;
        if args.len() != desc.arity {
            return Err(DecodeError::Arity {
                mnemonic: desc.mnemonic,
                expected: desc.arity,
                found: args.len(),
            });
        }

        let instr = match desc.op {
            Op::Put => Instr::Put {
                dst: reg(args[0])?,
                src: operand(args[1])?,
            },
            Op::Copy => Instr::Copy {
                dst: reg(args[0])?,
                src: reg(args[1])?,
            },
            Op::Swap => Instr::Swap {
                a: reg(args[0])?,
                b: reg(args[1])?,
            },
            Op::Free => Instr::Free { reg: reg(args[0])? },
            Op::Add => arith(ArithOp::Add, args)?,
            Op::Sub => arith(ArithOp::Sub, args)?,
            Op::Mul => arith(ArithOp::Mul, args)?,
            Op::Div => arith(ArithOp::Div, args)?,
            Op::Mod => arith(ArithOp::Mod, args)?,
            Op::Inc => Instr::Inc { reg: reg(args[0])? },
            Op::Dec => Instr::Dec { reg: reg(args[0])? },
            Op::Jmp => Instr::Jmp {
                target: target(args[0])?,
            },
            Op::Jz | Op::Jnz => Instr::Branch {
                op: desc.op,
                cond: cond_for(desc.op),
                lhs: reg(args[0])?,
                rhs: Operand::Imm(0),
                target: target(args[1])?,
            },
            Op::Je | Op::Jne | Op::Jg | Op::Jl | Op::Jge | Op::Jle => Instr::Branch {
                op: desc.op,
                cond: cond_for(desc.op),
                lhs: reg(args[0])?,
                rhs: operand(args[1])?,
                target: target(args[2])?,
            },
            Op::Call => Instr::Call {
                target: target(args[0])?,
            },
            Op::Ret => Instr::Ret,
            Op::IterThrough => {
                let (a, b) = range(args[0])?;
                expect(args[1], RANGE_ARROW)?;
                expect(args[3], BLOCK_OPEN)?;
                let first = reg(a)?;
                let last = reg(b)?;
                let dst = reg(args[2])?;
                if !are_same_type(first, last) {
                    return Err(DecodeError::RangeTypeMismatch { first, last });
                }
                if !comes_first(first, last) {
                    return Err(DecodeError::DescendingRange { first, last });
                }
                Instr::IterThrough {
                    first,
                    last,
                    dst,
                    end: 0,
                }
            }
            Op::IterFor => {
                let (r, n) = range(args[0])?;
                expect(args[1], BLOCK_OPEN)?;
                let reg = reg(r)?;
                let count = decimal::<i32>(n)
                    .ok_or_else(|| DecodeError::InvalidOperandLiteral(n.to_string()))?;
                if count < 0 {
                    return Err(DecodeError::NegativeCount(count));
                }
                Instr::IterFor { reg, count, end: 0 }
            }
            Op::EndIter => Instr::EndIter { header: 0 },
            Op::Show => Instr::Show { reg: reg(args[0])? },
            Op::Ascii => Instr::Ascii { reg: reg(args[0])? },
            Op::Hex => Instr::Hex { reg: reg(args[0])? },
            Op::Cls => Instr::Cls,
            Op::Newl => Instr::Newl,
            Op::Tab => Instr::Tab,
        };
        Ok(instr)
    }
}
