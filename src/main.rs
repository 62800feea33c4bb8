use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use docx_hf_compose::{Document, HeaderFooterEngine, compose_docx, config};

#[derive(Parser)]
#[command(
    name = "docx-hf-compose",
    about = "Compose Word headers and footers from a YAML, JSON or Excel layout",
    version
)]
struct Cli {
    /// Layout configuration (.yaml, .yml, .json, .xlsx, .xls, .ods)
    config: PathBuf,

    /// Document to modify; a blank A4 document when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to write the result
    #[arg(short, long, required_unless_present = "check")]
    output: Option<PathBuf>,

    /// Keep existing header/footer content and append after it
    #[arg(long)]
    merge: bool,

    /// Only resolve the configuration and report skipped elements
    #[arg(long)]
    check: bool,
}

fn run(cli: &Cli) -> Result<usize, docx_hf_compose::Error> {
    if cli.check {
        let raw = config::load(&cli.config)?;
        let mut doc = Document::new();
        let diagnostics = HeaderFooterEngine::new(&mut doc).check(&raw)?;
        for d in &diagnostics {
            println!("{d}");
        }
        return Ok(diagnostics.len());
    }

    let Some(output) = cli.output.as_deref() else {
        return Ok(0);
    };
    let report = compose_docx(&cli.config, cli.input.as_deref(), output, cli.merge)?;
    for d in &report.diagnostics {
        eprintln!("skipped {d}");
    }
    println!(
        "Composed {} part(s) into {}",
        report.parts_composed.len(),
        output.display()
    );
    Ok(0)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
