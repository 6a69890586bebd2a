use jasm_rs::{BufferConsole, CpuConfig};

fn output(src: &str) -> BufferConsole {
    let mut out = BufferConsole::new();
    jasm_rs::run(src, CpuConfig::default(), &mut out).unwrap();
    out
}

#[test]
fn show_prints_value_and_newline() {
    assert_eq!(output("PUT A0 -42\n_SHOW A0\n").out, "-42\n");
}

#[test]
fn ascii_hex_newline_and_tab() {
    let src = "\
PUT A0 72
PUT A1 105
_ASCII A0
_ASCII A1
_TAB
PUT B0 255
_HEX B0
_NEWL
PUT B1 -1
_HEX B1
";
    assert_eq!(output(src).out, "Hi\tff\nffffffff");
}

#[test]
fn cls_clears_the_console() {
    let out = output("PUT A0 1\n_SHOW A0\n_CLS\n_SHOW A0\n");
    assert_eq!(out.clears, 1);
    assert_eq!(out.out, "1\n");
}

#[test]
fn output_does_not_touch_registers() {
    let mut out = BufferConsole::new();
    let cpu = jasm_rs::run("_SHOW Z9\n_HEX Z9\n_NEWL\n", CpuConfig::default(), &mut out).unwrap();
    assert_eq!(cpu.regs.nonzero().count(), 0);
    assert_eq!(out.out, "0\n0\n");
}
