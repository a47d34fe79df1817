//! Command-line wrapper around the `itcfg` importer: read an `IT.CFG`,
//! write the converted document to stdout and every diagnostic to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;

/// Convert Impulse Tracker's IT.CFG to a Schism Tracker-style config.
///
/// The converted document goes to stdout (redirect it into your config
/// file); anything odd about the input is reported on stderr. Diagnostics
/// alone never fail the run.
#[derive(Parser)]
#[command(name = "itlift", version)]
struct Cli {
    /// Path to the IT.CFG file.
    input: PathBuf,
}

fn main() -> ExitCode {
    // Usage errors exit 1, not clap's default 2, to match the tool this
    // replaces. Help and version still exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("itlift: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let data = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let (config, diagnostics) = itcfg::import(&data)?;
    for diagnostic in &diagnostics {
        eprintln!("{diagnostic}");
    }

    print!("{}", itcfg::emit::render(&config));
    Ok(())
}
