use anyhow::Result;
use clap::Parser;
use console::style;
use log::{info, warn};
use movie_barcode::cli::{Cli, Commands};
use movie_barcode::component::{BarcodeGenerator, GradientApplier};
use movie_barcode::config::UserSettings;
use movie_barcode::init;
use movie_barcode::signal::setup_shutdown_signal;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init::init(cli.verbose);

    match run(cli.command) {
        Ok(()) => {
            info!("Program exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            warn!("Program error: {e:#}");
            eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    let settings = UserSettings::load()?;

    match command {
        Commands::Barcode(args) => {
            let shutdown_signal = setup_shutdown_signal()?;
            let config = args.into_run_config(&settings)?;
            BarcodeGenerator::new(config, shutdown_signal).run()?;
        }
        Commands::Gradient(args) => {
            let gradient = args.settings(&settings)?;
            GradientApplier::new(args.input, args.output, gradient).run()?;
        }
    }

    Ok(())
}
