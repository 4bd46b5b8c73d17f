use clap::Parser;
use gdploa::cli::output::{self, OutputConfig};
use gdploa::cli::{check, info, Cli, Commands};

fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    if let Err(e) = run(cli.command) {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Check(args) => check::execute(&args.config)?,
        Commands::Defaults => info::execute_defaults()?,
        Commands::Solvers => info::execute_solvers(),
    }
    Ok(())
}
