use jasm_rs::exec::IntExecutor;
use jasm_rs::{BufferConsole, Cpu, CpuConfig, Program, RegisterId, Trap};

fn r(name: &str) -> RegisterId {
    name.parse().unwrap()
}

fn run(src: &str) -> Cpu {
    jasm_rs::run(src, CpuConfig::default(), &mut BufferConsole::new()).unwrap()
}

#[test]
fn jmp_lands_on_its_target_line() {
    // 1: JMP end
    // 2: PUT A0 1   [skipped]
    // 3: PUT A0 2   <- must execute, not line 4
    // 4: PUT A1 9
    let program = Program::compile("JMP end\nPUT A0 1\nend: PUT A0 2\nPUT A1 9\n").unwrap();
    let mut cpu = Cpu::new(CpuConfig::default());
    let mut out = BufferConsole::new();

    cpu.step(&program, &mut out, &IntExecutor).unwrap(); // JMP
    assert_eq!(cpu.pc, 3);
    cpu.step(&program, &mut out, &IntExecutor).unwrap(); // end: PUT A0 2
    assert_eq!(cpu.regs.get(r("A0")), 2);
    assert_eq!(cpu.regs.get(r("A1")), 0);
}

#[test]
fn forward_label_resolves_past_comments() {
    let src = "\
// jump over the first store
JMP end

A0: PUT A0 1
// trailing note
end: PUT A0 2
";
    let program = Program::compile(src).unwrap();
    assert_eq!(program.line(1).unwrap().text, "JMP 3");
    assert_eq!(run(src).regs.get(r("A0")), 2);
}

#[test]
fn countdown_loop() {
    let src = "\
    PUT A0 5
    PUT B0 0
loop:
    ADD B0 B0 A0
    DEC A0
    JNZ A0 loop
";
    let cpu = run(src);
    assert_eq!(cpu.regs.get(r("B0")), 15);
    assert_eq!(cpu.regs.get(r("A0")), 0);
}

#[test]
fn zero_test_branches() {
    let cpu = run("JZ A0 skip\nPUT B0 1\nskip: JNZ A0 end\nPUT B1 1\nend:\n");
    assert_eq!(cpu.regs.get(r("B0")), 0);
    assert_eq!(cpu.regs.get(r("B1")), 1);
}

#[test]
fn comparison_branches() {
    // Each taken branch skips the PUT that follows it.
    let src = "\
PUT A0 4
PUT A1 7
JE A0 4 t1
PUT Z0 1
t1: JNE A0 A1 t2
PUT Z1 1
t2: JG A1 A0 t3
PUT Z2 1
t3: JL A0 A1 t4
PUT Z3 1
t4: JGE A0 4 t5
PUT Z4 1
t5: JLE A0 3 t6
PUT Z5 1
t6:
";
    let cpu = run(src);
    for taken in ["Z0", "Z1", "Z2", "Z3", "Z4"] {
        assert_eq!(cpu.regs.get(r(taken)), 0, "{taken}");
    }
    // 4 <= 3 is false: fall through
    assert_eq!(cpu.regs.get(r("Z5")), 1);
}

#[test]
fn jump_past_the_end_halts() {
    let program = Program::compile_resolved("JMP 99\nPUT A0 1\n").unwrap();
    let mut cpu = Cpu::new(CpuConfig::default());
    cpu.run(&program, &mut BufferConsole::new(), &IntExecutor).unwrap();
    assert_eq!(cpu.regs.get(r("A0")), 0);
    assert_eq!(cpu.pc, 99);
}

#[test]
fn numeric_label_is_a_name_not_a_line() {
    // `3` labels line 2. Jumping to line 3 instead would never reach A0 = 0.
    let src = "\
PUT A0 2
3: DEC A0
INC A1
JNZ A0 3
";
    let cfg = CpuConfig {
        max_steps: Some(100),
        ..CpuConfig::default()
    };
    let cpu = jasm_rs::run(src, cfg, &mut BufferConsole::new()).unwrap();
    assert_eq!(cpu.regs.get(r("A0")), 0);
    assert_eq!(cpu.regs.get(r("A1")), 2);
}

#[test]
fn bare_line_number_in_source_fails_to_compile() {
    assert!(matches!(
        jasm_rs::run("JMP 2\nINC A0\n", CpuConfig::default(), &mut BufferConsole::new()),
        Err(jasm_rs::Error::Compile(_))
    ));
}

#[test]
fn infinite_loop_is_cut_by_step_limit() {
    let program = Program::compile("spin: JMP spin\n").unwrap();
    let mut cpu = Cpu::new(CpuConfig {
        max_steps: Some(1_000),
        ..CpuConfig::default()
    });
    let err = cpu
        .run(&program, &mut BufferConsole::new(), &IntExecutor)
        .unwrap_err();
    assert!(matches!(err, Trap::StepLimit { steps: 1_000 }));
}

#[test]
fn trailing_comment_on_jump_line() {
    let cpu = run("JMP end // skip it\nPUT A0 1\nend: PUT A1 1 // done\n");
    assert_eq!(cpu.regs.get(r("A0")), 0);
    assert_eq!(cpu.regs.get(r("A1")), 1);
}
