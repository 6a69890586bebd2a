use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use jasm_rs::artifact::{artifact_path, write_artifact};

use jasm_asm::{analyze, listing, load_program, Report};

#[derive(Parser, Debug)]
#[command(author, version, about = "JAsm compiler and inspection CLI", long_about=None)]
struct Cli {
    /// Input source (.jasm) or resolved artifact (.jasm~)
    #[arg(value_name = "JASMFILE")]
    input: PathBuf,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve labels and write the artifact (fails if it already exists)
    Compile {
        /// Artifact path (default: <JASMFILE>~)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Print the resolved program with line numbers and labels
    Listing {
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Control-flow analysis from line 1: edges, blocks, unreachable lines
    Analyze {
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write analysis output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

fn emit(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{}", text),
    }
    Ok(())
}

fn render_report(r: &Report) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "Analysis summary:");
    let _ = writeln!(buf, "  lines       : {}", r.lines);
    let _ = writeln!(buf, "  reachable   : {}", r.reachable);
    let _ = writeln!(buf, "  blocks      : {}", r.blocks.len());
    let _ = writeln!(buf, "  edges       : {}", r.edges.len());
    let _ = writeln!(buf, "  unreachable : {:?}", r.unreachable);
    for (family, n) in &r.mix {
        let _ = writeln!(buf, "  {:<11} : {n}", family.to_lowercase());
    }
    let _ = writeln!(buf, "Blocks:");
    for b in &r.blocks {
        let _ = writeln!(buf, "  [{}, {})", b.start, b.end);
    }
    let _ = writeln!(buf, "Edges:");
    for e in &r.edges {
        let _ = writeln!(buf, "  {:>4} -> {:>4} ({})", e.from, e.to, e.kind);
    }
    let _ = writeln!(buf, "Labels:");
    for l in &r.labels {
        let _ = writeln!(buf, "  {:>4} {}", l.line, l.name);
    }
    buf
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let program = load_program(&cli.input)?;

    match cli.cmd {
        Command::Compile { out } => {
            let path = out.unwrap_or_else(|| artifact_path(&cli.input));
            write_artifact(&path, &program)?;
            eprintln!("wrote {} ({} lines)", path.display(), program.len());
        }
        Command::Listing { format, out } => {
            let rows = listing(&program);
            let text = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&rows)? + "\n",
                OutputFormat::Text => {
                    let mut buf = String::new();
                    for row in &rows {
                        if let Some(lbl) = &row.label {
                            let _ = writeln!(buf, "{:>4} <{lbl}>:", row.line);
                        }
                        let _ = writeln!(buf, "{:>4}: {}", row.line, row.instr);
                    }
                    buf
                }
            };
            emit(out.as_deref(), &text)?;
        }
        Command::Analyze { format, out } => {
            let report = analyze(&program).report(&program);
            let text = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
                OutputFormat::Text => render_report(&report),
            };
            emit(out.as_deref(), &text)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jasm_rs::Program;

    #[test]
    fn text_report_lists_blocks_and_labels() {
        let p = Program::compile("top: DEC A0\nJNZ A0 top\n").unwrap();
        let text = render_report(&analyze(&p).report(&p));
        assert!(text.contains("lines       : 2"));
        assert!(text.contains("(cbr)"));
        assert!(text.contains("   1 top"));
    }
}
