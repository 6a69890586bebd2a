use tracing::debug;

use crate::console::Console;
use crate::cpu::{Cpu, Induction, LoopFrame, Trap};
use crate::decoder::{ArithOp, Instr, Operand};
use crate::program::Program;
use crate::registers::RegisterId;

pub trait Executor {
    fn exec<C: Console>(
        &self,
        cpu: &mut Cpu,
        program: &Program,
        console: &mut C,
        instr: Instr,
    ) -> Result<(), Trap>;
}

fn value(cpu: &Cpu, op: Operand) -> i32 {
    match op {
        Operand::Reg(r) => cpu.regs.get(r),
        Operand::Imm(v) => v,
    }
}

fn emit<C: Console>(console: &mut C, line: usize, s: &str) -> Result<(), Trap> {
    console
        .write_str(s)
        .map_err(|source| Trap::Console { line, source })
}

fn bind(cpu: &mut Cpu, frame: &LoopFrame) {
    match frame.induction {
        Induction::Through { bank, dst } => {
            let src = RegisterId {
                bank,
                index: frame.index as u8,
            };
            let v = cpu.regs.get(src);
            cpu.regs.put(dst, v);
        }
        Induction::Count { reg } => cpu.regs.put(reg, frame.index),
    }
}

/// Enter an `ITER_*` block at `cpu.line`. A header executed again while its
/// frame is still active restarts that loop.
fn enter_block(cpu: &mut Cpu, frame: LoopFrame) {
    cpu.loops.retain(|f| f.header != frame.header);
    bind(cpu, &frame);
    cpu.loops.push(frame);
}

pub struct IntExecutor;
impl Executor for IntExecutor {
    fn exec<C: Console>(
        &self,
        cpu: &mut Cpu,
        program: &Program,
        console: &mut C,
        instr: Instr,
    ) -> Result<(), Trap> {
        let line = cpu.line;
        match instr {
            Instr::Nop => {}
            Instr::Put { dst, src } => {
                let v = value(cpu, src);
                cpu.regs.put(dst, v);
            }
            Instr::Copy { dst, src } => {
                let v = cpu.regs.get(src);
                cpu.regs.put(dst, v);
            }
            Instr::Swap { a, b } => cpu.regs.swap(a, b),
            Instr::Free { reg } => cpu.regs.free(reg),
            Instr::Arith { op, dst, lhs, rhs } => {
                let a = value(cpu, lhs);
                let b = value(cpu, rhs);
                let res = match op {
                    ArithOp::Add => a.wrapping_add(b),
                    ArithOp::Sub => a.wrapping_sub(b),
                    ArithOp::Mul => a.wrapping_mul(b),
                    ArithOp::Div | ArithOp::Mod if b == 0 => {
                        return Err(Trap::DivisionByZero { line })
                    }
                    ArithOp::Div => a.wrapping_div(b),
                    ArithOp::Mod => a.wrapping_rem(b),
                };
                cpu.regs.put(dst, res);
            }
            Instr::Inc { reg } => {
                let v = cpu.regs.get(reg).wrapping_add(1);
                cpu.regs.put(reg, v);
            }
            Instr::Dec { reg } => {
                let v = cpu.regs.get(reg).wrapping_sub(1);
                cpu.regs.put(reg, v);
            }
            Instr::Jmp { target } => cpu.pc = target,
            Instr::Branch {
                cond,
                lhs,
                rhs,
                target,
                ..
            } => {
                if cond.holds(cpu.regs.get(lhs), value(cpu, rhs)) {
                    cpu.pc = target;
                }
            }
            Instr::Call { target } => {
                let depth = cpu.stack.depth() + 1;
                if cpu.cfg.max_call_depth.is_some_and(|max| depth > max) {
                    return Err(Trap::StackOverflow { line, depth });
                }
                let label = program
                    .labels()
                    .label_at(target)
                    .map(str::to_owned)
                    .unwrap_or_else(|| target.to_string());
                debug!(%label, target, ret = line + 1, depth, "call");
                cpu.stack.push(label, line + 1);
                cpu.pc = target;
            }
            Instr::Ret => {
                let entry = cpu.stack.pop().ok_or(Trap::StackUnderflow { line })?;
                debug!(label = %entry.label, ret = entry.line, "return");
                cpu.pc = entry.line;
            }
            Instr::IterThrough {
                first, last, dst, ..
            } => enter_block(
                cpu,
                LoopFrame {
                    header: line,
                    induction: Induction::Through {
                        bank: first.bank,
                        dst,
                    },
                    index: first.index as i32,
                    last: last.index as i32,
                },
            ),
            Instr::IterFor { reg, count, end } => {
                if count == 0 {
                    cpu.loops.retain(|f| f.header != line);
                    cpu.pc = end + 1;
                } else {
                    enter_block(
                        cpu,
                        LoopFrame {
                            header: line,
                            induction: Induction::Count { reg },
                            index: 0,
                            last: count - 1,
                        },
                    );
                }
            }
            Instr::EndIter { header } => {
                // Frames above ours belong to inner loops left by a jump.
                let Some(pos) = cpu.loops.iter().rposition(|f| f.header == header) else {
                    return Err(Trap::LoopFrame { line });
                };
                cpu.loops.truncate(pos + 1);
                let Some(frame) = cpu.loops.last_mut() else {
                    return Err(Trap::LoopFrame { line });
                };
                if frame.index < frame.last {
                    frame.index += 1;
                    let frame = *frame;
                    bind(cpu, &frame);
                    cpu.pc = header + 1;
                } else {
                    cpu.loops.pop();
                }
            }
            Instr::Show { reg } => emit(console, line, &format!("{}\n", cpu.regs.get(reg)))?,
            Instr::Ascii { reg } => {
                let code = cpu.regs.get(reg) as u32;
                let c = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
                emit(console, line, c.encode_utf8(&mut [0; 4]))?;
            }
            Instr::Hex { reg } => emit(console, line, &format!("{:x}", cpu.regs.get(reg)))?,
            Instr::Cls => console
                .clear()
                .map_err(|source| Trap::Console { line, source })?,
            Instr::Newl => emit(console, line, "\n")?,
            Instr::Tab => emit(console, line, "\t")?,
        }
        Ok(())
    }
}
