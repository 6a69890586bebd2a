use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jasm_rs::artifact::{artifact_path, is_artifact, read_source, write_artifact};
use jasm_rs::exec::IntExecutor;
use jasm_rs::{Cpu, CpuConfig, Program, StdoutConsole};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Compile and run a JAsm program on the jasm-rs register machine"
)]
struct Opts {
    /// Stop with an error after this many executed lines
    #[arg(long)]
    max_steps: Option<u64>,
    /// Maximum CALL nesting depth
    #[arg(long)]
    max_call_depth: Option<usize>,
    /// JSON machine configuration (flags override its fields)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Also write the resolved artifact next to the source (`<FILE>~`)
    #[arg(long)]
    emit: bool,
    /// Print the register table after the run
    #[arg(long)]
    dump_registers: bool,
    /// Write the final machine state as JSON
    #[arg(long, value_name = "FILE")]
    dump_state: Option<PathBuf>,
    #[arg(value_name = "JASMFILE")]
    input: PathBuf,
}

fn load_config(opts: &Opts) -> Result<CpuConfig> {
    let mut cfg: CpuConfig = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => CpuConfig::default(),
    };
    if opts.max_steps.is_some() {
        cfg.max_steps = opts.max_steps;
    }
    if opts.max_call_depth.is_some() {
        cfg.max_call_depth = opts.max_call_depth;
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let cfg = load_config(&opts)?;

    let text = read_source(&opts.input)?;
    let program = if is_artifact(&opts.input) {
        Program::compile_resolved(&text)
    } else {
        Program::compile(&text)
    }
    .with_context(|| format!("compiling {}", opts.input.display()))?;

    if opts.emit && !is_artifact(&opts.input) {
        write_artifact(&artifact_path(&opts.input), &program)?;
    }

    let mut cpu = Cpu::new(cfg);
    let mut console = StdoutConsole;
    let result = cpu.run(&program, &mut console, &IntExecutor);

    if opts.dump_registers {
        println!("{}", cpu.regs);
        println!("{}", cpu.stack);
    }
    if let Some(path) = &opts.dump_state {
        std::fs::write(path, serde_json::to_string_pretty(&cpu)?)?;
    }

    let steps = result.with_context(|| format!("running {}", opts.input.display()))?;
    tracing::info!(steps, "program finished");
    Ok(())
}
