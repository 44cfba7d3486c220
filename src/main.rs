use anyhow::Result;
use clap::Parser;
use log::error;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use castep_tools::{
    check_convergence, discovery, CastepError, ConvergeConfig, PlottersRenderer, SystemViewer,
};

#[derive(Parser)]
#[command(author, version, about = "Plot optimization data from a .castep file.")]
struct Cli {
    /// Specify the .castep file. Defaults to the first one in the current directory.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Show the plot in a viewer instead of saving it as a .png file.
    #[arg(short, long)]
    save: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let cwd = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            error!("Cannot determine current directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Only a missing input stops with a failure status.
    let input = match discovery::resolve_input(cli.file, &cwd) {
        Ok(path) => path,
        Err(e) => {
            match e.downcast_ref::<CastepError>() {
                Some(CastepError::NoInputFile(_)) => {
                    println!("No .castep file found in the current directory.")
                }
                _ => println!("{:#}", e),
            }
            return ExitCode::FAILURE;
        }
    };

    let config = ConvergeConfig::new(input, cli.save, env::temp_dir());
    if let Err(e) = run(&config) {
        println!("An error occurred: {:#}", e);
    }
    ExitCode::SUCCESS
}

fn run(config: &ConvergeConfig) -> Result<()> {
    let outcome = check_convergence(config, &PlottersRenderer::default(), &SystemViewer::default())?;
    println!("{}", outcome.report);
    Ok(())
}
