use clap::Parser;
use serde::Serialize;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fipa::api::{self, Cli, Command};
use fipa::state::BudgetState;

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    if let Err(msg) = run(cli.command).await {
        error!("{msg}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

async fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Serve(args) => {
            let persistence = api::open_persistence(&args).map_err(|e| e.to_string())?;
            let state = BudgetState::load(persistence).map_err(|e| e.to_string())?;
            api::run_http_server(args.port, state)
                .await
                .map_err(|e| format!("server error: {e}"))
        }
        Command::Savings(args) => {
            api::validate_savings_args(&args)?;
            print_json(&api::savings_report(args.income, &args.expenses))
        }
        Command::Projection(args) => print_json(&api::projection_report(&args)?),
        Command::Growth(args) => print_json(&api::growth_report(&args)?),
        Command::Goal(args) => print_json(&api::goal_report(&args)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let body = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{body}");
    Ok(())
}
