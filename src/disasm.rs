use crate::decoder::{Instr, Operand};
use crate::instructions::{describe, BLOCK_CLOSE, BLOCK_OPEN, RANGE_ARROW};

fn opnd(o: &Operand) -> String {
    match o {
        Operand::Reg(r) => r.to_string(),
        Operand::Imm(v) => v.to_string(),
    }
}

/// Canonical text of a decoded instruction (labels and comments are not part of it).
pub fn fmt_instr(i: &Instr) -> String {
    match i {
        Instr::Nop => String::new(),
        Instr::Put { dst, src } => format!("PUT {dst} {}", opnd(src)),
        Instr::Copy { dst, src } => format!("COPY {dst} {src}"),
        Instr::Swap { a, b } => format!("SWAP {a} {b}"),
        Instr::Free { reg } => format!("FREE {reg}"),
        Instr::Arith { op, dst, lhs, rhs } => format!(
            "{} {dst} {} {}",
            describe((*op).into()).mnemonic,
            opnd(lhs),
            opnd(rhs)
        ),
        Instr::Inc { reg } => format!("INC {reg}"),
        Instr::Dec { reg } => format!("DEC {reg}"),
        Instr::Jmp { target } => format!("JMP {target}"),
        Instr::Branch { op, lhs, rhs, target, .. } => match describe(*op).arity {
            2 => format!("{} {lhs} {target}", describe(*op).mnemonic),
            _ => format!("{} {lhs} {} {target}", describe(*op).mnemonic, opnd(rhs)),
        },
        Instr::Call { target } => format!("CALL {target}"),
        Instr::Ret => "RET".to_string(),
        Instr::IterThrough { first, last, dst, .. } => {
            format!("ITER_THROUGH |{first}:{last}| {RANGE_ARROW} {dst} {BLOCK_OPEN}")
        }
        Instr::IterFor { reg, count, .. } => format!("ITER_FOR |{reg}:{count}| {BLOCK_OPEN}"),
        Instr::EndIter { .. } => BLOCK_CLOSE.to_string(),
        Instr::Show { reg } => format!("_SHOW {reg}"),
        Instr::Ascii { reg } => format!("_ASCII {reg}"),
        Instr::Hex { reg } => format!("_HEX {reg}"),
        Instr::Cls => "_CLS".to_string(),
        Instr::Newl => "_NEWL".to_string(),
        Instr::Tab => "_TAB".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Decoder;
    use crate::isa::jasm::JasmDecoder;

    #[test]
    fn canonical_text_decodes_back() {
        let dec = JasmDecoder::new();
        for line in [
            "PUT A0 -4",
            "COPY B1 B2",
            "SWAP A0 A1",
            "MOD Z9 7 A3",
            "JZ C3 12",
            "JLE A0 B0 3",
            "CALL 8",
            "RET",
            "ITER_THROUGH |A0:A9| -> Z0 (",
            "ITER_FOR |E2:6| (",
            ")",
            "_HEX D4",
            "_TAB",
        ] {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let i = dec.decode(&tokens).unwrap();
            assert_eq!(fmt_instr(&i), line);
        }
    }
}
