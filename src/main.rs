use clap::Parser;
use std::process::ExitCode;
use workclean::cli::{Cli, run_cli};
use workclean::logging::{init_logging, level_for};
use workclean::output::OutputFormatter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(level_for(cli.verbose, cli.quiet));

    let report = match run_cli(&cli) {
        Ok(report) => report,
        Err(e) => {
            log::error!("event=run_failed reason=\"{}\"", e);
            OutputFormatter::error(&format!("Error: {}", e));
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        if let Err(e) = OutputFormatter::json(&report) {
            OutputFormatter::error(&format!("Could not serialize report: {}", e));
            return ExitCode::FAILURE;
        }
    } else {
        OutputFormatter::summary_table(&report);
    }

    ExitCode::SUCCESS
}
