use crate::decoder::Op;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Data,
    Arith,
    Control,
    Range,
    Output,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: Op,
    pub mnemonic: &'static str,
    pub family: Family,
    pub arity: usize,
    /// Token position (mnemonic = 0) of the label operand rewritten by the linker.
    pub label_operand: Option<usize>,
}

pub const BLOCK_OPEN: &str = "(";
pub const BLOCK_CLOSE: &str = ")";
pub const RANGE_ARROW: &str = "->";

const fn desc(op: Op, mnemonic: &'static str, family: Family, arity: usize) -> InstrDesc {
    InstrDesc {
        op,
        mnemonic,
        family,
        arity,
        label_operand: None,
    }
}

const fn jump(op: Op, mnemonic: &'static str, arity: usize) -> InstrDesc {
    InstrDesc {
        op,
        mnemonic,
        family: Family::Control,
        arity,
        label_operand: Some(arity),
    }
}

/// Indexed by `Op` discriminant.
pub const TABLE: &[InstrDesc] = &[
    desc(Op::Put, "PUT", Family::Data, 2),
    desc(Op::Copy, "COPY", Family::Data, 2),
    desc(Op::Swap, "SWAP", Family::Data, 2),
    desc(Op::Free, "FREE", Family::Data, 1),
    desc(Op::Add, "ADD", Family::Arith, 3),
    desc(Op::Sub, "SUB", Family::Arith, 3),
    desc(Op::Mul, "MUL", Family::Arith, 3),
    desc(Op::Div, "DIV", Family::Arith, 3),
    desc(Op::Mod, "MOD", Family::Arith, 3),
    desc(Op::Inc, "INC", Family::Arith, 1),
    desc(Op::Dec, "DEC", Family::Arith, 1),
    jump(Op::Jmp, "JMP", 1),
    jump(Op::Jz, "JZ", 2),
    jump(Op::Jnz, "JNZ", 2),
    jump(Op::Je, "JE", 3),
    jump(Op::Jne, "JNE", 3),
    jump(Op::Jg, "JG", 3),
    jump(Op::Jl, "JL", 3),
    jump(Op::Jge, "JGE", 3),
    jump(Op::Jle, "JLE", 3),
    jump(Op::Call, "CALL", 1),
    desc(Op::Ret, "RET", Family::Control, 0),
    // ITER_THROUGH |R1:R2| -> RD (
    desc(Op::IterThrough, "ITER_THROUGH", Family::Range, 4),
    // ITER_FOR |R:n| (
    desc(Op::IterFor, "ITER_FOR", Family::Range, 2),
    desc(Op::EndIter, BLOCK_CLOSE, Family::Range, 0),
    desc(Op::Show, "_SHOW", Family::Output, 1),
    desc(Op::Ascii, "_ASCII", Family::Output, 1),
    desc(Op::Hex, "_HEX", Family::Output, 1),
    desc(Op::Cls, "_CLS", Family::Output, 0),
    desc(Op::Newl, "_NEWL", Family::Output, 0),
    desc(Op::Tab, "_TAB", Family::Output, 0),
];

pub fn lookup(mnemonic: &str) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.mnemonic == mnemonic)
}

const _: () = {
    assert!(TABLE.len() == Op::COUNT, "instruction table is missing an Op");
    let mut i = 0;
    while i < TABLE.len() {
        assert!(TABLE[i].op as usize == i, "instruction table out of Op order");
        i += 1;
    }
};

pub fn describe(op: Op) -> &'static InstrDesc {
    &TABLE[op as usize]
}
