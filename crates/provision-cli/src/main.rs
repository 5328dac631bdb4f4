//! CLI entry point - the composition root.
//!
//! Config commands run without a composed context so `config init` works
//! even when the existing file is broken. `check-gpu` uses the lenient
//! bootstrap so unrelated config problems cannot fail it. Everything else
//! goes through [`bootstrap`].

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use provision_cli::{
    Cli, CliConfig, CliError, Commands, bootstrap, bootstrap_lenient, handlers,
};

fn main() {
    // Load .env before reading PROVISION_* overrides
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cli_config = CliConfig::from_cli(&cli);

    match cli.command {
        Commands::Config { command } => handlers::config::execute(&cli_config, command),
        Commands::CheckGpu {
            expected_model,
            utility,
        } => {
            let ctx = bootstrap_lenient(&cli_config);
            handlers::check_gpu::execute(&ctx, expected_model, utility)?;
            Ok(())
        }
        Commands::CheckDeps => handlers::check_deps::execute(&bootstrap(&cli_config)?),
        Commands::Plan { json } => handlers::plan::execute(&bootstrap(&cli_config)?, json),
        Commands::Run => {
            handlers::run::execute(&bootstrap(&cli_config)?)?;
            Ok(())
        }
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}
